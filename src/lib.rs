//! Sankey flow-diagram core: a pure layout engine for directed weighted
//! graphs, plus the interaction state (hover highlighting, opacity
//! transitions, tooltip timing) that drives an interactive rendering of the
//! result.
//!
//! [`layout`] turns an input [`Graph`] into a [`SankeyGraph`] of positioned
//! node bands and link ribbons. [`interact::Session`] consumes pointer events
//! and frame times for one such graph and answers, per frame, with a
//! highlight set, per-element opacities and a tooltip state. Painting is the
//! caller's business; `src/main.rs` ships an `eframe` viewer doing exactly
//! that.

pub mod color;
pub mod error;
pub mod graph;
pub mod interact;
pub mod layout;

pub use error::StructuralError;
pub use graph::{ElementKey, Graph, Link, Node, NodeId};
pub use layout::{layout, Align, LayoutOptions, SankeyGraph, SankeyLink, SankeyNode};
