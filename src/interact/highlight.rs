use std::collections::{HashMap, HashSet};

use log::debug;

use crate::graph::{ElementKey, NodeId};
use crate::layout::SankeyGraph;

/// The three opacities an element can be told to show, depending on where it
/// stands relative to the current hover target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpacityLevels {
    /// Nothing is hovered.
    pub base: f64,
    /// The element belongs to the highlight set.
    pub hovered: f64,
    /// Something else is hovered.
    pub dimmed: f64,
}

impl Default for OpacityLevels {
    fn default() -> Self {
        Self {
            base: 0.8,
            hovered: 1.0,
            dimmed: 0.25,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum HoverState {
    #[default]
    Idle,
    Node(NodeId),
    Link(NodeId, NodeId),
}

/// Tracks the hover target and the set of elements lit up by it.
///
/// Bound to one positioned graph at a time: adjacency is snapshotted by
/// identity key, so hover events never need the graph itself. Events naming
/// an element the bound graph does not have reset the machine to idle.
pub struct Highlighter {
    state: HoverState,
    set: HashSet<ElementKey>,
    // per node: its own key, its incident link keys, the far endpoint of each
    neighborhoods: HashMap<NodeId, Vec<ElementKey>>,
    link_keys: HashSet<ElementKey>,
}

impl Highlighter {
    pub fn bind<N, L>(graph: &SankeyGraph<N, L>) -> Self {
        let mut machine = Self {
            state: HoverState::Idle,
            set: HashSet::new(),
            neighborhoods: HashMap::new(),
            link_keys: HashSet::new(),
        };
        machine.rebind(graph);
        machine
    }

    /// Swaps the bound graph: hover resets to idle and adjacency is rebuilt.
    pub fn rebind<N, L>(&mut self, graph: &SankeyGraph<N, L>) {
        self.state = HoverState::Idle;
        self.set.clear();

        self.neighborhoods = graph
            .nodes
            .iter()
            .map(|node| (node.id.clone(), vec![node.key()]))
            .collect();
        self.link_keys = HashSet::with_capacity(graph.links.len());
        for link in &graph.links {
            let source = graph.nodes[link.source].id.clone();
            let target = graph.nodes[link.target].id.clone();
            let key = ElementKey::Link(source.clone(), target.clone());
            self.link_keys.insert(key.clone());
            if let Some(members) = self.neighborhoods.get_mut(&source) {
                members.push(key.clone());
                members.push(ElementKey::Node(target.clone()));
            }
            if let Some(members) = self.neighborhoods.get_mut(&target) {
                members.push(key);
                members.push(ElementKey::Node(source));
            }
        }
    }

    /// Returns true when the highlight set changed.
    pub fn hover_node(&mut self, id: &NodeId) -> bool {
        let Some(members) = self.neighborhoods.get(id) else {
            debug!("hover names unknown node {id}; going idle");
            return self.clear();
        };
        if matches!(&self.state, HoverState::Node(current) if current == id) {
            return false;
        }
        self.set = members.iter().cloned().collect();
        self.state = HoverState::Node(id.clone());
        true
    }

    /// Returns true when the highlight set changed.
    pub fn hover_link(&mut self, source: &NodeId, target: &NodeId) -> bool {
        let key = ElementKey::Link(source.clone(), target.clone());
        if !self.link_keys.contains(&key) {
            debug!("hover names unknown link {key}; going idle");
            return self.clear();
        }
        if matches!(&self.state, HoverState::Link(s, t) if s == source && t == target) {
            return false;
        }
        self.set = HashSet::from([
            key,
            ElementKey::Node(source.clone()),
            ElementKey::Node(target.clone()),
        ]);
        self.state = HoverState::Link(source.clone(), target.clone());
        true
    }

    /// Returns true when the highlight set changed.
    pub fn clear(&mut self) -> bool {
        if self.state == HoverState::Idle {
            return false;
        }
        self.state = HoverState::Idle;
        self.set.clear();
        true
    }

    pub fn state(&self) -> &HoverState {
        &self.state
    }

    pub fn highlight_set(&self) -> &HashSet<ElementKey> {
        &self.set
    }

    pub fn contains(&self, key: &ElementKey) -> bool {
        match key {
            ElementKey::Node(id) => self.neighborhoods.contains_key(id),
            ElementKey::Link(..) => self.link_keys.contains(key),
        }
    }

    /// The opacity an element should head toward under the current state.
    pub fn target(&self, key: &ElementKey, levels: &OpacityLevels) -> f64 {
        if self.set.is_empty() {
            levels.base
        } else if self.set.contains(key) {
            levels.hovered
        } else {
            levels.dimmed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Graph, Link, Node};
    use crate::layout::{layout, LayoutOptions, SankeyGraph};

    fn bound_graph() -> SankeyGraph<(), ()> {
        let graph = Graph {
            nodes: vec![Node::new("a", ()), Node::new("b", ()), Node::new("c", ())],
            links: vec![
                Link::new("a", "b", 10.0, ()),
                Link::new("b", "c", 10.0, ()),
                Link::new("a", "c", 5.0, ()),
            ],
        };
        layout(graph, 300.0, 100.0, &LayoutOptions::default()).unwrap()
    }

    #[test]
    fn node_hover_lights_up_the_neighborhood() {
        let mut machine = Highlighter::bind(&bound_graph());
        assert!(machine.hover_node(&"a".into()));

        let set = machine.highlight_set();
        assert_eq!(set.len(), 5);
        assert!(set.contains(&ElementKey::node("a")));
        assert!(set.contains(&ElementKey::node("b")));
        assert!(set.contains(&ElementKey::node("c")));
        assert!(set.contains(&ElementKey::link("a", "b")));
        assert!(set.contains(&ElementKey::link("a", "c")));
    }

    #[test]
    fn link_hover_is_exactly_the_link_and_its_endpoints() {
        let mut machine = Highlighter::bind(&bound_graph());
        assert!(machine.hover_link(&"b".into(), &"c".into()));

        let set = machine.highlight_set();
        assert_eq!(set.len(), 3);
        assert!(set.contains(&ElementKey::link("b", "c")));
        assert!(set.contains(&ElementKey::node("b")));
        assert!(set.contains(&ElementKey::node("c")));
    }

    #[test]
    fn moving_between_elements_never_passes_through_idle() {
        let mut machine = Highlighter::bind(&bound_graph());
        machine.hover_node(&"a".into());
        assert!(machine.hover_node(&"b".into()));
        assert_eq!(machine.state(), &HoverState::Node("b".into()));
        assert!(machine.hover_link(&"a".into(), &"b".into()));
        assert_eq!(
            machine.state(),
            &HoverState::Link("a".into(), "b".into())
        );
    }

    #[test]
    fn re_hovering_the_same_element_changes_nothing() {
        let mut machine = Highlighter::bind(&bound_graph());
        assert!(machine.hover_node(&"a".into()));
        assert!(!machine.hover_node(&"a".into()));
        assert!(machine.hover_link(&"a".into(), &"c".into()));
        assert!(!machine.hover_link(&"a".into(), &"c".into()));
    }

    #[test]
    fn unknown_ids_reset_to_idle() {
        let mut machine = Highlighter::bind(&bound_graph());
        machine.hover_node(&"a".into());
        assert!(machine.hover_node(&"z".into()));
        assert_eq!(machine.state(), &HoverState::Idle);
        assert!(machine.highlight_set().is_empty());

        // a pair of known endpoints that no link connects
        machine.hover_node(&"a".into());
        assert!(machine.hover_link(&"c".into(), &"a".into()));
        assert_eq!(machine.state(), &HoverState::Idle);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut machine = Highlighter::bind(&bound_graph());
        machine.hover_node(&"a".into());
        assert!(machine.clear());
        assert!(!machine.clear());
        assert!(machine.highlight_set().is_empty());
    }

    #[test]
    fn targets_follow_membership() {
        let levels = OpacityLevels::default();
        let mut machine = Highlighter::bind(&bound_graph());

        let any = ElementKey::node("b");
        assert_eq!(machine.target(&any, &levels), levels.base);

        machine.hover_link(&"a".into(), &"b".into());
        assert_eq!(machine.target(&ElementKey::node("a"), &levels), levels.hovered);
        assert_eq!(
            machine.target(&ElementKey::link("a", "b"), &levels),
            levels.hovered
        );
        assert_eq!(machine.target(&ElementKey::node("c"), &levels), levels.dimmed);
        assert_eq!(
            machine.target(&ElementKey::link("b", "c"), &levels),
            levels.dimmed
        );
    }

    #[test]
    fn rebind_drops_the_old_world() {
        let mut machine = Highlighter::bind(&bound_graph());
        machine.hover_node(&"c".into());

        let smaller = layout(
            Graph::<(), ()> {
                nodes: vec![Node::new("a", ()), Node::new("b", ())],
                links: vec![Link::new("a", "b", 1.0, ())],
            },
            300.0,
            100.0,
            &LayoutOptions::default(),
        )
        .unwrap();
        machine.rebind(&smaller);

        assert_eq!(machine.state(), &HoverState::Idle);
        assert!(machine.highlight_set().is_empty());
        assert!(!machine.contains(&ElementKey::node("c")));
        assert!(machine.contains(&ElementKey::node("a")));
        assert!(!machine.hover_node(&"c".into()));
        assert_eq!(machine.state(), &HoverState::Idle);
    }
}
