//! Graph topology and per-node attribute storage for the `FollowFlee` simulation.
//!
//! This crate holds the host-side collaborators the decision core reads and
//! mutates: the graph the agents live on, and the integer attributes stored
//! on each of its nodes.
//!
//! # Modules
//!
//! - [`attributes`] -- [`AttributeStore`], one [`CellAttributes`] per node,
//!   plus validation of the raw integer encoding.
//! - [`error`] -- Error types for graph and attribute operations.
//! - [`lattice`] -- Square lattice builder (von Neumann or Moore,
//!   bounded or periodic).
//! - [`topology`] -- The [`Topology`] graph: dense node ids with ordered
//!   outgoing neighbour lists.
//!
//! [`CellAttributes`]: followflee_types::CellAttributes

pub mod attributes;
pub mod error;
pub mod lattice;
pub mod topology;

// Re-export primary types at crate root.
pub use attributes::{AttributeStore, RawCell};
pub use error::WorldError;
pub use lattice::{Neighbourhood, square_lattice};
pub use topology::Topology;
