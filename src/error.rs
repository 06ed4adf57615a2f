use thiserror::Error;

use crate::graph::NodeId;

/// Defects in the input graph itself. Layout fails atomically on the first
/// one found; no partial geometry is ever returned.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum StructuralError {
    #[error("duplicate node id {0}")]
    DuplicateNodeId(NodeId),
    #[error("link {link} references unknown node id {id}")]
    UnknownEndpoint { link: usize, id: NodeId },
    #[error("link {link} has invalid value {value}; flow values must be finite and non-negative")]
    InvalidValue { link: usize, value: f64 },
    #[error("circular flow through node {0}")]
    CircularFlow(NodeId),
}
