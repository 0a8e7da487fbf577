//! Initial population seeding.
//!
//! Before the first generation the host fills every lattice cell with its
//! starting attributes. Either the configuration lists the cells explicitly
//! (`population.initial_cells`), or each cell is drawn independently: first
//! whether it is occupied (`density`), then whether its agent cooperates
//! (`cooperator_fraction`), then its genome (fixed, or uniform over 0-255).

use followflee_core::config::PopulationConfig;
use followflee_types::{CellAttributes, Genome, Strategy};
use followflee_world::{AttributeStore, WorldError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::error::EngineError;

/// Build the starting attributes for `node_count` cells.
///
/// Random seeding draws from its own generator seeded with `seed`, so the
/// same configuration always produces the same starting population.
///
/// # Errors
///
/// Returns [`EngineError::Config`] if a probability is outside `[0, 1]`,
/// or [`EngineError::World`] if explicit cells do not decode or do not
/// cover exactly `node_count` nodes.
pub fn seed_population(
    config: &PopulationConfig,
    node_count: usize,
    seed: u64,
) -> Result<AttributeStore, EngineError> {
    config.validate()?;

    let store = match &config.initial_cells {
        Some(cells) => {
            let store = AttributeStore::from_raw(cells)?;
            if store.len() != node_count {
                return Err(WorldError::SizeMismatch {
                    expected: node_count,
                    actual: store.len(),
                }
                .into());
            }
            store
        }
        None => random_population(config, node_count, seed),
    };

    info!(
        cells = store.len(),
        cooperators = store.count_strategy(Strategy::Cooperator),
        defectors = store.count_strategy(Strategy::Defector),
        explicit = config.initial_cells.is_some(),
        "Initial population seeded"
    );
    Ok(store)
}

/// Draw every cell independently from the configured probabilities.
fn random_population(config: &PopulationConfig, node_count: usize, seed: u64) -> AttributeStore {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut cells = Vec::with_capacity(node_count);
    for _ in 0..node_count {
        if rng.random::<f64>() >= config.density {
            cells.push(CellAttributes::EMPTY);
            continue;
        }
        let strategy = if rng.random::<f64>() < config.cooperator_fraction {
            Strategy::Cooperator
        } else {
            Strategy::Defector
        };
        let genome = config.genome.unwrap_or_else(|| rng.random());
        cells.push(CellAttributes::agent(strategy, Genome::new(genome)));
    }
    AttributeStore::from_cells(cells)
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
