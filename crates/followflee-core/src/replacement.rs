//! Generational replacement: the worst agents die, the best reproduce.
//!
//! Both modes rank the agents in place (highest score first, ties by
//! ascending id), snapshot the attributes of the top `count` agents, evict
//! the bottom `count`, and then place one clone of each snapshot:
//!
//! - [`ReplacementMode::Simple`] puts every clone on a uniformly random empty
//!   cell anywhere in the graph.
//! - [`ReplacementMode::NeighbourPreferring`] puts a clone on a uniformly
//!   random empty neighbour of its parent's cell, and only falls back to a
//!   random empty cell when the parent has no empty neighbour.
//!
//! Evicting first guarantees at least `count` empty cells exist when the
//! clones are placed, so the agent count is unchanged afterwards.

use followflee_types::{CellAttributes, NodeId, ReplacementMode};
use followflee_world::Topology;
use rand::Rng;
use tracing::debug;

use crate::error::ModelError;
use crate::population::Population;

/// What one replacement phase did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementOutcome {
    /// Cells whose agents were evicted, worst first.
    pub evicted: Vec<NodeId>,
    /// Cells that received a clone, in parent rank order.
    pub spawned: Vec<NodeId>,
}

/// Number of agents replaced in a population of `population_size`:
/// `floor(population_size * rate)`, capped at the population size.
///
/// `rate` is expected in `[0, 1]`; anything else is clamped.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn agents_to_replace(population_size: usize, rate: f64) -> usize {
    let rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
    let raw = (population_size as f64 * rate).floor() as usize;
    raw.min(population_size)
}

/// Replace the `count` worst agents by clones of the `count` best.
///
/// Does nothing when `count` is zero. Leaves the agent list ranked, with the
/// clones appended at the end.
///
/// # Errors
///
/// Returns [`ModelError::SlotOutOfRange`] if `count` exceeds the number of
/// agents, or any ledger error raised while evicting or spawning.
pub fn replace(
    mode: ReplacementMode,
    population: &mut Population,
    topology: &Topology,
    count: usize,
    rng: &mut impl Rng,
) -> Result<ReplacementOutcome, ModelError> {
    if count == 0 {
        return Ok(ReplacementOutcome::default());
    }

    population.rank_by_score();
    let len = population.agent_count();
    let out_of_range = ModelError::SlotOutOfRange { slot: count, len };
    let first_victim = len.checked_sub(count).ok_or(out_of_range)?;

    // Parents are fixed before anyone is evicted, so a parent that also
    // ranks among the worst still passes on its attributes.
    let mut parents: Vec<(NodeId, CellAttributes)> = Vec::with_capacity(count);
    for &id in population.agents().iter().take(count) {
        parents.push((id, *population.attributes().get(id)?));
    }
    let victims: Vec<NodeId> = population
        .agents()
        .iter()
        .skip(first_victim)
        .rev()
        .copied()
        .collect();

    for &victim in &victims {
        population.evict(victim)?;
    }

    let mut spawned = Vec::with_capacity(count);
    let mut nearby: Vec<NodeId> = Vec::with_capacity(topology.neighbours_hint());
    for (parent, attrs) in parents {
        let target = match mode {
            ReplacementMode::Simple => population.select_random_empty_cell(rng)?,
            ReplacementMode::NeighbourPreferring => {
                nearby.clear();
                nearby.extend(
                    topology
                        .neighbours(parent)?
                        .iter()
                        .copied()
                        .filter(|&cell| population.is_empty_cell(cell)),
                );
                if nearby.is_empty() {
                    debug!(%parent, "No empty neighbour, placing clone at random");
                    population.select_random_empty_cell(rng)?
                } else {
                    let idx = rng.random_range(0..nearby.len());
                    nearby
                        .get(idx)
                        .copied()
                        .ok_or(ModelError::EmptyCellsExhausted)?
                }
            }
        };
        spawned.push(population.spawn(attrs, target)?);
    }

    debug!(
        mode = mode.config_name(),
        replaced = count,
        "Replacement applied"
    );
    Ok(ReplacementOutcome {
        evicted: victims,
        spawned,
    })
}
