//! Shared type definitions for the `FollowFlee` simulation.
//!
//! This crate is the single source of truth for the vocabulary shared by the
//! world, the decision core, and the engine binary. It carries no logic
//! beyond encoding and decoding the per-node attribute values.
//!
//! # Modules
//!
//! - [`ids`] -- The [`NodeId`] wrapper for graph node identifiers
//! - [`enums`] -- Strategies, action codes, genome slots, replacement modes
//! - [`structs`] -- The [`Genome`], per-node [`CellAttributes`], and the
//!   per-generation [`GenerationSummary`]

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ActionCode, GenomeSlot, ReplacementMode, Strategy};
pub use ids::NodeId;
pub use structs::{CellAttributes, GenerationSummary, Genome};
