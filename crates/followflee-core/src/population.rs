//! The population ledger.
//!
//! [`Population`] owns the node attributes together with the two collections
//! that partition the graph: the agent list and the empty-cell set. Every
//! node id is in exactly one of them at all times. Each mutating operation
//! validates its inputs before touching anything, so a failed call leaves
//! the partition as it was.
//!
//! The agent list is ordered (the driver shuffles it, replacement ranks it);
//! the empty-cell set is kept sorted by id so a uniform draw over it depends
//! only on the seed.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use followflee_types::{CellAttributes, NodeId, Strategy};
use followflee_world::AttributeStore;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{info, trace};

use crate::error::ModelError;

/// Agents, empty cells, and the attributes behind them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Population {
    /// Per-node attributes.
    attributes: AttributeStore,
    /// Cells occupied by an agent.
    agents: Vec<NodeId>,
    /// Cells holding no agent, in id order.
    empty: BTreeSet<NodeId>,
}

impl Population {
    /// Partition every node by its strategy attribute.
    ///
    /// Agents are listed in ascending id order.
    pub fn partition(attributes: AttributeStore) -> Self {
        let mut agents = Vec::new();
        let mut empty = BTreeSet::new();
        for (id, cell) in attributes.iter() {
            if cell.is_empty() {
                empty.insert(id);
            } else {
                agents.push(id);
            }
        }
        info!(
            agents = agents.len(),
            empty_cells = empty.len(),
            "Population partitioned"
        );
        Self {
            attributes,
            agents,
            empty,
        }
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Node attributes, read only.
    pub const fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    /// Node attributes, for score accumulation.
    pub(crate) const fn attributes_mut(&mut self) -> &mut AttributeStore {
        &mut self.attributes
    }

    /// Give the attributes back to the host.
    pub fn into_attributes(self) -> AttributeStore {
        self.attributes
    }

    /// Agent cells in their current order.
    pub fn agents(&self) -> &[NodeId] {
        &self.agents
    }

    /// Number of agents.
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Empty cells in ascending id order.
    pub fn empty_cells(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.empty.iter().copied()
    }

    /// Number of empty cells.
    pub fn empty_count(&self) -> usize {
        self.empty.len()
    }

    /// Whether `id` is in the empty-cell set.
    pub fn is_empty_cell(&self, id: NodeId) -> bool {
        self.empty.contains(&id)
    }

    /// Number of agents playing `strategy`.
    pub fn count_strategy(&self, strategy: Strategy) -> usize {
        self.attributes.count_strategy(strategy)
    }

    /// The agent at position `slot` of the agent list.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::SlotOutOfRange`] if `slot` is past the end.
    pub fn agent_at(&self, slot: usize) -> Result<NodeId, ModelError> {
        self.agents
            .get(slot)
            .copied()
            .ok_or(ModelError::SlotOutOfRange {
                slot,
                len: self.agents.len(),
            })
    }

    /// Current score of agent `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::World`] if `id` is not a node.
    pub fn score(&self, id: NodeId) -> Result<i32, ModelError> {
        Ok(self.attributes.get(id)?.score)
    }

    // -------------------------------------------------------------------
    // Ordering
    // -------------------------------------------------------------------

    /// Sort the agent list by ascending id.
    pub fn sort_agents_by_id(&mut self) {
        self.agents.sort_unstable();
    }

    /// Shuffle the agent list with `rng`.
    pub fn shuffle_agents(&mut self, rng: &mut impl Rng) {
        self.agents.shuffle(rng);
    }

    /// Rank the agent list in place: highest score first, ties by ascending
    /// id.
    pub fn rank_by_score(&mut self) {
        let attributes = &self.attributes;
        self.agents.sort_by_cached_key(|&id| {
            let score = attributes.get(id).map_or(i32::MIN, |cell| cell.score);
            (Reverse(score), id)
        });
    }

    // -------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------

    /// Zero the score of agent `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::World`] if `id` is not a node.
    pub fn reset_score(&mut self, id: NodeId) -> Result<(), ModelError> {
        self.attributes.get_mut(id)?.score = 0;
        Ok(())
    }

    /// Move the agent at `slot` onto `target`.
    ///
    /// The agent's attributes travel with it and its former cell becomes
    /// empty. Moving onto its own cell does nothing. Returns whether the
    /// agent actually moved.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::SlotOutOfRange`] for a bad slot,
    /// [`ModelError::OccupiedTarget`] if `target` is not an empty cell, or
    /// [`ModelError::World`] if either cell is not a node.
    pub fn move_agent(&mut self, slot: usize, target: NodeId) -> Result<bool, ModelError> {
        let from = self.agent_at(slot)?;
        if target == from {
            return Ok(false);
        }
        if !self.empty.contains(&target) {
            return Err(ModelError::OccupiedTarget { node: target });
        }
        let attrs = *self.attributes.get(from)?;

        self.attributes.set(target, attrs)?;
        self.attributes.clear(from)?;
        self.empty.remove(&target);
        self.empty.insert(from);
        if let Some(entry) = self.agents.get_mut(slot) {
            *entry = target;
        }
        trace!(%from, to = %target, "Agent moved");
        Ok(true)
    }

    /// Remove agent `id`: zero its cell and mark it empty.
    ///
    /// Returns the attributes the agent held.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotAnAgent`] if `id` is not in the agent list.
    pub fn evict(&mut self, id: NodeId) -> Result<CellAttributes, ModelError> {
        let slot = self
            .agents
            .iter()
            .rposition(|&agent| agent == id)
            .ok_or(ModelError::NotAnAgent { node: id })?;
        let attrs = *self.attributes.get(id)?;

        self.attributes.clear(id)?;
        self.agents.remove(slot);
        self.empty.insert(id);
        trace!(node = %id, score = attrs.score, "Agent evicted");
        Ok(attrs)
    }

    /// Place a new agent carrying `attrs` on the empty cell `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotAnAgent`] if `attrs` describe an empty cell,
    /// [`ModelError::OccupiedTarget`] if `target` is not empty, or
    /// [`ModelError::World`] if `target` is not a node.
    pub fn spawn(&mut self, attrs: CellAttributes, target: NodeId) -> Result<NodeId, ModelError> {
        if attrs.is_empty() {
            return Err(ModelError::NotAnAgent { node: target });
        }
        if !self.empty.contains(&target) {
            return Err(ModelError::OccupiedTarget { node: target });
        }

        self.attributes.set(target, attrs)?;
        self.empty.remove(&target);
        self.agents.push(target);
        trace!(node = %target, "Agent spawned");
        Ok(target)
    }

    /// Draw an empty cell uniformly at random.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EmptyCellsExhausted`] if no empty cell is left.
    pub fn select_random_empty_cell(&self, rng: &mut impl Rng) -> Result<NodeId, ModelError> {
        if self.empty.is_empty() {
            return Err(ModelError::EmptyCellsExhausted);
        }
        let idx = rng.random_range(0..self.empty.len());
        self.empty
            .iter()
            .nth(idx)
            .copied()
            .ok_or(ModelError::EmptyCellsExhausted)
    }

    // -------------------------------------------------------------------
    // Invariants
    // -------------------------------------------------------------------

    /// Check that agents and empty cells partition the `node_count` nodes.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::PartitionViolated`] describing the first
    /// inconsistency found.
    pub fn verify_partition(&self, node_count: usize) -> Result<(), ModelError> {
        let violated = |reason: String| Err(ModelError::PartitionViolated { reason });

        if self.attributes.len() != node_count {
            return violated(format!(
                "{} attribute cells for {node_count} nodes",
                self.attributes.len()
            ));
        }
        let total = self
            .agents
            .len()
            .checked_add(self.empty.len())
            .ok_or_else(|| ModelError::ArithmeticOverflow {
                context: "partition size".to_owned(),
            })?;
        if total != node_count {
            return violated(format!(
                "{} agents + {} empty cells != {node_count} nodes",
                self.agents.len(),
                self.empty.len()
            ));
        }

        let mut seen = BTreeSet::new();
        for &id in &self.agents {
            if !seen.insert(id) {
                return violated(format!("agent {id} listed twice"));
            }
            if self.empty.contains(&id) {
                return violated(format!("{id} is both an agent and empty"));
            }
            if self.attributes.get(id)?.is_empty() {
                return violated(format!("agent {id} holds no strategy"));
            }
        }
        for &id in &self.empty {
            if !self.attributes.is_empty_cell(id) {
                return violated(format!("empty cell {id} holds an agent"));
            }
        }
        Ok(())
    }
}
