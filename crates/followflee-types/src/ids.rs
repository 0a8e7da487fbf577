//! Type-safe identifier wrapper for graph nodes.
//!
//! Agents have no identity of their own: an agent *is* the node it currently
//! occupies, so the only identifier in the simulation is [`NodeId`]. Node ids
//! are dense, starting at 0, which lets attribute storage index by id.

use serde::{Deserialize, Serialize};

/// Identifier of a node (cell) in the simulation graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Wrap a raw node number.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Return the inner node number.
    pub const fn into_inner(self) -> u32 {
        self.0
    }

    /// Return the node number as a storage index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<NodeId> for u32 {
    fn from(id: NodeId) -> Self {
        id.0
    }
}
