mod depth;
mod place;

use std::cmp::Ordering;
use std::collections::HashMap;

use log::debug;

use crate::error::StructuralError;
use crate::graph::{ElementKey, Graph, NodeId};

pub const DEFAULT_NODE_WIDTH: f64 = 24.0;
pub const DEFAULT_NODE_PADDING: f64 = 8.0;

// Node bands stay one unit clear of the layout boundary on every side.
const EXTENT_INSET: f64 = 1.0;

/// Tie-break policy for nodes whose column is under-constrained by topology.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    /// Longest path from the sources.
    Left,
    /// Longest path to the sinks, mirrored.
    Right,
    /// Next to the nearest downstream column.
    Center,
    /// Like `Left`, but sink nodes stretch to the last column.
    #[default]
    Justify,
}

/// Orders nodes within one column. Comparators see topology and `value`
/// populated; ties keep input order.
pub type NodeSort<N> = fn(&SankeyNode<N>, &SankeyNode<N>) -> Ordering;

/// Orders the links incident on each node. Ties keep input order.
pub type LinkSort<L> = fn(&SankeyLink<L>, &SankeyLink<L>) -> Ordering;

/// Immutable layout configuration, passed once per [`layout`] call.
pub struct LayoutOptions<N, L> {
    pub align: Align,
    /// Horizontal band thickness, identical for every node.
    pub node_width: f64,
    /// Minimum vertical gap between stacked nodes in one column.
    pub node_padding: f64,
    /// `None` keeps insertion order within each column.
    pub node_sort: Option<NodeSort<N>>,
    /// `None` orders each node's links by the far endpoint's vertical
    /// position, which minimizes ribbon crossings next to the node.
    pub link_sort: Option<LinkSort<L>>,
}

impl<N, L> Default for LayoutOptions<N, L> {
    fn default() -> Self {
        Self {
            align: Align::Justify,
            node_width: DEFAULT_NODE_WIDTH,
            node_padding: DEFAULT_NODE_PADDING,
            node_sort: None,
            link_sort: None,
        }
    }
}

impl<N, L> Clone for LayoutOptions<N, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N, L> Copy for LayoutOptions<N, L> {}

/// A node with its computed geometry. The input payload rides along
/// untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct SankeyNode<N> {
    pub id: NodeId,
    /// Position in [`SankeyGraph::nodes`].
    pub index: usize,
    /// Zero-based topological column, from the longest path reaching this
    /// node.
    pub depth: usize,
    /// Longest path from this node to a sink.
    pub height: usize,
    /// Throughput: the larger of summed incoming and summed outgoing flow.
    pub value: f64,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    /// Indices into [`SankeyGraph::links`] of links leaving this node,
    /// ordered by their band position along the node edge.
    pub source_links: Vec<usize>,
    /// Indices of links arriving at this node, same ordering rule.
    pub target_links: Vec<usize>,
    pub payload: N,
}

impl<N> SankeyNode<N> {
    pub fn key(&self) -> ElementKey {
        ElementKey::Node(self.id.clone())
    }
}

/// A link with its computed ribbon geometry. `y0`/`y1` are the band centers
/// where the ribbon meets its source and target node edges.
#[derive(Clone, Debug, PartialEq)]
pub struct SankeyLink<L> {
    /// Index of the source node in [`SankeyGraph::nodes`].
    pub source: usize,
    /// Index of the target node.
    pub target: usize,
    /// Position in [`SankeyGraph::links`].
    pub index: usize,
    pub value: f64,
    /// Ribbon thickness, proportional to `value` with the same scale as node
    /// heights.
    pub width: f64,
    pub y0: f64,
    pub y1: f64,
    pub payload: L,
}

/// The positioned diagram. Immutable once computed; recompute on any change
/// to the input graph, the drawable size, or the options.
#[derive(Clone, Debug, PartialEq)]
pub struct SankeyGraph<N, L> {
    pub nodes: Vec<SankeyNode<N>>,
    pub links: Vec<SankeyLink<L>>,
    index_by_id: HashMap<NodeId, usize>,
}

impl<N, L> Default for SankeyGraph<N, L> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            index_by_id: HashMap::new(),
        }
    }
}

impl<N, L> SankeyGraph<N, L> {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_index(&self, id: &NodeId) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node_by_id(&self, id: &NodeId) -> Option<&SankeyNode<N>> {
        self.node_index(id).map(|index| &self.nodes[index])
    }

    /// Identity key of a link that belongs to this graph.
    pub fn link_key(&self, link: &SankeyLink<L>) -> ElementKey {
        ElementKey::Link(
            self.nodes[link.source].id.clone(),
            self.nodes[link.target].id.clone(),
        )
    }
}

#[derive(Clone, Copy)]
struct Extent {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

/// Computes the positioned diagram for `graph` inside a `width` x `height`
/// surface. Pure: identical inputs give bit-identical output.
///
/// A non-positive drawable area yields an empty graph; a malformed input
/// graph fails with a [`StructuralError`] and no partial geometry.
pub fn layout<N, L>(
    graph: Graph<N, L>,
    width: f64,
    height: f64,
    options: &LayoutOptions<N, L>,
) -> Result<SankeyGraph<N, L>, StructuralError> {
    let extent = Extent {
        x0: EXTENT_INSET,
        y0: EXTENT_INSET,
        x1: width - EXTENT_INSET,
        y1: height - EXTENT_INSET,
    };
    if width <= 0.0 || height <= 0.0 || extent.x1 <= extent.x0 || extent.y1 <= extent.y0 {
        debug!("no drawable area at {width}x{height}; yielding an empty layout");
        return Ok(SankeyGraph::default());
    }

    let (mut nodes, mut links, index_by_id) = resolve(graph)?;
    compute_values(&mut nodes, &links);
    depth::assign_depths(&mut nodes, &links)?;
    depth::assign_heights(&mut nodes, &links)?;
    let columns = place::position(&mut nodes, &mut links, options, extent);
    debug!(
        "positioned {} nodes and {} links across {columns} columns",
        nodes.len(),
        links.len()
    );

    Ok(SankeyGraph {
        nodes,
        links,
        index_by_id,
    })
}

fn resolve<N, L>(
    graph: Graph<N, L>,
) -> Result<
    (
        Vec<SankeyNode<N>>,
        Vec<SankeyLink<L>>,
        HashMap<NodeId, usize>,
    ),
    StructuralError,
> {
    let mut index_by_id = HashMap::with_capacity(graph.nodes.len());
    let mut nodes = Vec::with_capacity(graph.nodes.len());
    for (index, node) in graph.nodes.into_iter().enumerate() {
        if index_by_id.insert(node.id.clone(), index).is_some() {
            return Err(StructuralError::DuplicateNodeId(node.id));
        }

        nodes.push(SankeyNode {
            id: node.id,
            index,
            depth: 0,
            height: 0,
            value: 0.0,
            x0: 0.0,
            x1: 0.0,
            y0: 0.0,
            y1: 0.0,
            source_links: Vec::new(),
            target_links: Vec::new(),
            payload: node.payload,
        });
    }

    let mut links = Vec::with_capacity(graph.links.len());
    for (index, link) in graph.links.into_iter().enumerate() {
        let Some(&source) = index_by_id.get(&link.source) else {
            return Err(StructuralError::UnknownEndpoint {
                link: index,
                id: link.source,
            });
        };
        let Some(&target) = index_by_id.get(&link.target) else {
            return Err(StructuralError::UnknownEndpoint {
                link: index,
                id: link.target,
            });
        };
        if !link.value.is_finite() || link.value < 0.0 {
            return Err(StructuralError::InvalidValue {
                link: index,
                value: link.value,
            });
        }

        nodes[source].source_links.push(index);
        nodes[target].target_links.push(index);
        links.push(SankeyLink {
            source,
            target,
            index,
            value: link.value,
            width: 0.0,
            y0: 0.0,
            y1: 0.0,
            payload: link.payload,
        });
    }

    Ok((nodes, links, index_by_id))
}

fn compute_values<N, L>(nodes: &mut [SankeyNode<N>], links: &[SankeyLink<L>]) {
    // Summation stays in link input order so results are reproducible.
    for node in nodes {
        let outgoing: f64 = node.source_links.iter().map(|&link| links[link].value).sum();
        let incoming: f64 = node.target_links.iter().map(|&link| links[link].value).sum();
        node.value = outgoing.max(incoming);
    }
}
