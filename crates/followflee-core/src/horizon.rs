//! Per-agent neighbourhood scan.
//!
//! A [`Horizon`] is the snapshot an agent takes of its surroundings once per
//! micro-step: which neighbours cooperate, which defect, and which cells it
//! could move into. The agent's own cell is always the first free cell, so
//! "staying put" competes with every real move.
//!
//! The same buffers are reused for every agent of a generation; they are
//! sized once from the graph's neighbour count and cleared before each scan.

use followflee_types::{NodeId, Strategy};
use followflee_world::{AttributeStore, Topology};

use crate::error::ModelError;
use crate::payoff::payoff;

/// A cell the agent could occupy next, with its desirability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeCell {
    /// The candidate cell.
    pub id: NodeId,
    /// Score accumulated during a single movement decision.
    pub score: i32,
}

impl FreeCell {
    /// A candidate cell with a zero score.
    pub const fn new(id: NodeId) -> Self {
        Self { id, score: 0 }
    }
}

/// The neighbourhood state of one agent.
#[derive(Debug, Clone, Default)]
pub struct Horizon {
    /// Occupied neighbours playing Cooperate, in scan order.
    cooperators: Vec<NodeId>,
    /// Occupied neighbours playing Defect, in scan order.
    defectors: Vec<NodeId>,
    /// The agent's own cell first, then its empty neighbours.
    free_cells: Vec<FreeCell>,
    /// Total outgoing degree of the scanned agent's cell.
    degree: usize,
}

impl Horizon {
    /// Allocate buffers for agents with up to `neighbours` neighbours.
    pub fn with_capacity(neighbours: usize) -> Self {
        Self {
            cooperators: Vec::with_capacity(neighbours),
            defectors: Vec::with_capacity(neighbours),
            // +1 for the agent's own cell.
            free_cells: Vec::with_capacity(neighbours.saturating_add(1)),
            degree: 0,
        }
    }

    /// Forget the previous scan, keeping the allocations.
    pub fn clear(&mut self) {
        self.cooperators.clear();
        self.defectors.clear();
        self.free_cells.clear();
        self.degree = 0;
    }

    /// Occupied neighbours playing Cooperate.
    pub fn cooperators(&self) -> &[NodeId] {
        &self.cooperators
    }

    /// Occupied neighbours playing Defect.
    pub fn defectors(&self) -> &[NodeId] {
        &self.defectors
    }

    /// Candidate cells, the agent's own cell first.
    pub fn free_cells(&self) -> &[FreeCell] {
        &self.free_cells
    }

    /// Mutable access to the candidate cells and both neighbour lists at
    /// once, for scoring the candidates against the lists.
    pub fn split_mut(&mut self) -> (&mut [FreeCell], &[NodeId], &[NodeId]) {
        (&mut self.free_cells, &self.cooperators, &self.defectors)
    }

    /// Outgoing degree of the scanned agent's cell.
    pub const fn degree(&self) -> usize {
        self.degree
    }

    /// Number of neighbours occupied by another agent.
    ///
    /// This is the degree minus the empty neighbours (every free cell but
    /// the agent's own).
    pub fn occupied_neighbours(&self) -> usize {
        let empty_neighbours = self.free_cells.len().saturating_sub(1);
        self.degree.saturating_sub(empty_neighbours)
    }

    /// Build a horizon from explicit neighbour lists instead of a graph scan.
    ///
    /// `agent` becomes the first free cell, followed by `empty_neighbours`.
    pub fn from_parts(
        agent: NodeId,
        degree: usize,
        cooperators: Vec<NodeId>,
        defectors: Vec<NodeId>,
        empty_neighbours: &[NodeId],
    ) -> Self {
        let mut free_cells = Vec::with_capacity(empty_neighbours.len().saturating_add(1));
        free_cells.push(FreeCell::new(agent));
        free_cells.extend(empty_neighbours.iter().copied().map(FreeCell::new));
        Self {
            cooperators,
            defectors,
            free_cells,
            degree,
        }
    }
}

/// Scan the neighbourhood of `agent`, fill `horizon`, and add the payoff of
/// this scan to the agent's score.
///
/// Payoff accumulates over the whole generation; only the driver resets it.
/// Returns the payoff earned by this scan.
///
/// # Errors
///
/// Returns [`ModelError::NotAnAgent`] if `agent` holds no strategy, or a
/// [`ModelError::World`] error if a node is missing.
pub fn build_horizon(
    agent: NodeId,
    topology: &Topology,
    attributes: &mut AttributeStore,
    horizon: &mut Horizon,
) -> Result<i32, ModelError> {
    horizon.clear();

    // The agent can stay still, so its own cell is always a candidate.
    horizon.free_cells.push(FreeCell::new(agent));

    let own = attributes
        .get(agent)?
        .strategy
        .ok_or(ModelError::NotAnAgent { node: agent })?;

    let neighbours = topology.neighbours(agent)?;
    horizon.degree = neighbours.len();

    let mut earned: i32 = 0;
    for &neighbour in neighbours {
        match attributes.get(neighbour)?.strategy {
            None => horizon.free_cells.push(FreeCell::new(neighbour)),
            Some(other) => {
                earned = earned.saturating_add(payoff(own, other));
                match other {
                    Strategy::Cooperator => horizon.cooperators.push(neighbour),
                    Strategy::Defector => horizon.defectors.push(neighbour),
                }
            }
        }
    }

    let cell = attributes.get_mut(agent)?;
    cell.score = cell.score.saturating_add(earned);
    Ok(earned)
}
