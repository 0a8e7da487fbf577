//! Error types for the decision core.
//!
//! Every [`ModelError`] is an invariant violation: corrupted state or a data
//! contract broken upstream. None of them is recovered from inside the core;
//! [`Simulation::step`] propagates them and the host aborts the run.
//!
//! Ordinary situations (no agents this generation, no free cell to move to,
//! homogeneous or mixed neighbourhoods) are control flow, not errors.
//!
//! [`Simulation::step`]: crate::generation::Simulation::step

use followflee_types::NodeId;
use followflee_world::WorldError;

/// Invariant violations raised by the decision core.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A random empty cell was requested but none remain.
    #[error("no empty cell left to select")]
    EmptyCellsExhausted,

    /// A node treated as an agent holds no strategy.
    #[error("node {node} does not hold a live agent")]
    NotAnAgent {
        /// The offending node.
        node: NodeId,
    },

    /// An agent was about to be placed on a cell outside the empty set.
    #[error("target cell {node} is not empty")]
    OccupiedTarget {
        /// The offending cell.
        node: NodeId,
    },

    /// An agent slot outside the agent collection was addressed.
    #[error("agent slot {slot} out of range ({len} agents)")]
    SlotOutOfRange {
        /// The requested slot.
        slot: usize,
        /// Number of agents.
        len: usize,
    },

    /// The agent and empty-cell collections no longer partition the graph.
    #[error("partition violated: {reason}")]
    PartitionViolated {
        /// What was found to be inconsistent.
        reason: String,
    },

    /// An integer conversion or counter overflowed.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// A graph or attribute lookup failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}
