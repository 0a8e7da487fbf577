//! Error types for the `followflee-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type alias.

use followflee_types::NodeId;

/// Errors that can occur during graph and attribute operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A node id is outside the graph.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// An edge from a node to itself was requested.
    #[error("self loop on node {0}")]
    SelfLoop(NodeId),

    /// The same directed edge was inserted twice.
    #[error("duplicate edge from {from} to {to}")]
    DuplicateEdge {
        /// Source node.
        from: NodeId,
        /// Target node.
        to: NodeId,
    },

    /// Lattice dimensions are zero or too large to number.
    #[error("invalid lattice dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// A graph would hold more nodes than a [`NodeId`] can address.
    #[error("too many nodes: {0}")]
    TooManyNodes(usize),

    /// A `strategy` attribute outside {0, 1, 2}.
    #[error("node {node} has invalid strategy code {code}")]
    InvalidStrategyCode {
        /// The offending node.
        node: NodeId,
        /// The raw attribute value.
        code: i64,
    },

    /// An `actions` attribute outside 0-255.
    #[error("node {node} has invalid actions value {value}")]
    InvalidActions {
        /// The offending node.
        node: NodeId,
        /// The raw attribute value.
        value: i64,
    },

    /// A `score` attribute that does not fit the score range.
    #[error("node {node} has out-of-range score {value}")]
    InvalidScore {
        /// The offending node.
        node: NodeId,
        /// The raw attribute value.
        value: i64,
    },

    /// Attribute storage does not cover every node of the graph.
    #[error("attribute store holds {actual} cells but the graph has {expected} nodes")]
    SizeMismatch {
        /// Node count of the graph.
        expected: usize,
        /// Cell count of the store.
        actual: usize,
    },

    /// Arithmetic overflow during a checked operation.
    #[error("arithmetic overflow in world calculation")]
    ArithmeticOverflow,
}
