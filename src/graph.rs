use std::fmt;

use serde::Deserialize;

/// Node identity: an integer or a string, unique within one graph.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(untagged)]
pub enum NodeId {
    Int(i64),
    Name(String),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<i64> for NodeId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::Name(value.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, Self::Name(name) if name == other)
    }
}

/// Input node. Everything beyond the id is an opaque payload carried through
/// the layout untouched.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Node<N> {
    pub id: NodeId,
    #[serde(flatten)]
    pub payload: N,
}

impl<N> Node<N> {
    pub fn new(id: impl Into<NodeId>, payload: N) -> Self {
        Self {
            id: id.into(),
            payload,
        }
    }
}

/// Input link: a directed flow of `value` from `source` to `target`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Link<L> {
    pub source: NodeId,
    pub target: NodeId,
    pub value: f64,
    #[serde(flatten)]
    pub payload: L,
}

impl<L> Link<L> {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, value: f64, payload: L) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            value,
            payload,
        }
    }
}

/// Raw input graph. Node order is irrelevant; link order breaks sorting ties
/// and fixes summation order.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Graph<N, L> {
    pub nodes: Vec<Node<N>>,
    pub links: Vec<Link<L>>,
}

impl<N, L> Default for Graph<N, L> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }
}

/// Identity key of a diagram element, as used by highlight sets and opacity
/// channels. Links are keyed by their ordered `(source, target)` pair, so
/// parallel links between the same nodes share one key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementKey {
    Node(NodeId),
    Link(NodeId, NodeId),
}

impl ElementKey {
    pub fn node(id: impl Into<NodeId>) -> Self {
        Self::Node(id.into())
    }

    pub fn link(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self::Link(source.into(), target.into())
    }
}

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(id) => write!(f, "{id}"),
            Self::Link(source, target) => write!(f, "{source}_{target}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_deserializes_untagged() {
        let graph: Graph<serde_json::Value, serde_json::Value> = serde_json::from_str(
            r#"{
                "nodes": [{"id": "coal"}, {"id": 7}],
                "links": [{"source": "coal", "target": 7, "value": 3.5}]
            }"#,
        )
        .unwrap();

        assert_eq!(graph.nodes[0].id, NodeId::from("coal"));
        assert_eq!(graph.nodes[1].id, NodeId::Int(7));
        assert_eq!(graph.links[0].value, 3.5);
    }

    #[test]
    fn payload_fields_pass_through() {
        #[derive(Debug, serde::Deserialize, PartialEq)]
        struct Extra {
            label: String,
        }

        let node: Node<Extra> =
            serde_json::from_str(r#"{"id": "a", "label": "Coal"}"#).unwrap();
        assert_eq!(node.id, "a");
        assert_eq!(node.payload.label, "Coal");
    }

    #[test]
    fn element_keys_format_like_their_ids() {
        assert_eq!(ElementKey::node("a").to_string(), "a");
        assert_eq!(ElementKey::link("a", "b").to_string(), "a_b");
        assert_eq!(ElementKey::Node(NodeId::Int(3)).to_string(), "3");
    }

    #[test]
    fn link_keys_are_ordered_pairs() {
        assert_ne!(ElementKey::link("a", "b"), ElementKey::link("b", "a"));
        assert_eq!(ElementKey::link("a", "b"), ElementKey::link("a", "b"));
    }
}
