//! The generation driver.
//!
//! [`Simulation`] is a two-state machine driven by the host, one
//! [`Simulation::step`] call per tick:
//!
//! 1. **Idle** -- the node attributes are held as handed over. The first
//!    step partitions every node into agents and empty cells, moves to
//!    Running, and immediately runs the first generation.
//!
//! 2. **Running** -- each step runs one generation:
//!    - sort agents by id, then shuffle them with the seeded generator;
//!    - for each agent in that order: reset its score, then repeat
//!      `steps_per_generation` times {scan horizon and collect payoff,
//!      decide the target cell, move};
//!    - apply the configured replacement to the ranked population;
//!    - verify the agent / empty-cell partition.
//!
//! A step with no agents does nothing and is not counted as a generation.
//! The core never asks to stop; ending the run is the host's decision.
//!
//! The whole run draws from a single generator, so the same seed and the
//! same initial attributes reproduce the same trajectory.

use followflee_types::{GenerationSummary, Strategy};
use followflee_world::{AttributeStore, Topology, WorldError};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::config::ValidatedModelConfig;
use crate::error::ModelError;
use crate::horizon::{Horizon, build_horizon};
use crate::movement::decide_move;
use crate::population::Population;
use crate::replacement::{agents_to_replace, replace};

/// Lifecycle state of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Not stepped yet; the population is not partitioned.
    Idle,
    /// Initialized; every step runs a generation.
    Running,
}

/// Signal returned to the host after each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSignal {
    /// Keep stepping.
    Continue,
    /// Stop the run. Never produced by the core itself.
    Stop,
}

/// Node attributes before and after the initial partition.
#[derive(Debug, Clone)]
enum Ledger {
    Unpartitioned(AttributeStore),
    Partitioned(Population),
}

/// One simulation run over a fixed graph.
#[derive(Debug, Clone)]
pub struct Simulation {
    /// The graph the agents live on.
    topology: Topology,
    /// Attributes, partitioned on the first step.
    ledger: Ledger,
    /// Validated model parameters.
    config: ValidatedModelConfig,
    /// The single random stream of the run.
    rng: StdRng,
    /// Generations completed so far.
    generation: u64,
    /// Summary of the most recent generation.
    last_summary: Option<GenerationSummary>,
}

impl Simulation {
    /// Create a simulation over `topology` with one attribute cell per node.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::World`] wrapping [`WorldError::SizeMismatch`]
    /// if `attributes` does not cover exactly the graph's nodes.
    pub fn new(
        topology: Topology,
        attributes: AttributeStore,
        config: ValidatedModelConfig,
        seed: u64,
    ) -> Result<Self, ModelError> {
        if attributes.len() != topology.node_count() {
            return Err(WorldError::SizeMismatch {
                expected: topology.node_count(),
                actual: attributes.len(),
            }
            .into());
        }
        Ok(Self {
            topology,
            ledger: Ledger::Unpartitioned(attributes),
            config,
            rng: StdRng::seed_from_u64(seed),
            generation: 0,
            last_summary: None,
        })
    }

    /// Advance the simulation by one tick.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] on any invariant violation; the run cannot
    /// continue after one.
    pub fn step(&mut self) -> Result<StepSignal, ModelError> {
        if let Ledger::Unpartitioned(attributes) = &mut self.ledger {
            let attributes = std::mem::replace(attributes, AttributeStore::new(0));
            let population = Population::partition(attributes);
            population.verify_partition(self.topology.node_count())?;
            info!(
                nodes = self.topology.node_count(),
                agents = population.agent_count(),
                mode = self.config.mode.config_name(),
                rep_rate = self.config.rep_rate,
                steps_per_generation = self.config.steps_per_generation,
                "Simulation initialized"
            );
            self.ledger = Ledger::Partitioned(population);
        }

        let Ledger::Partitioned(population) = &mut self.ledger else {
            return Err(ModelError::PartitionViolated {
                reason: "population was never partitioned".to_owned(),
            });
        };

        if population.agent_count() == 0 {
            debug!(generation = self.generation, "No agents, nothing to do");
            return Ok(StepSignal::Continue);
        }

        let generation = self
            .generation
            .checked_add(1)
            .ok_or_else(|| ModelError::ArithmeticOverflow {
                context: "generation counter".to_owned(),
            })?;

        let moves = run_micro_steps(
            population,
            &self.topology,
            self.config.steps_per_generation,
            &mut self.rng,
        )?;

        let (best_score, worst_score, total_score) = score_stats(population)?;

        let count = agents_to_replace(population.agent_count(), self.config.rep_rate);
        let outcome = replace(
            self.config.mode,
            population,
            &self.topology,
            count,
            &mut self.rng,
        )?;

        population.verify_partition(self.topology.node_count())?;

        let summary = GenerationSummary {
            generation,
            agents: population.agent_count(),
            cooperators: population.count_strategy(Strategy::Cooperator),
            defectors: population.count_strategy(Strategy::Defector),
            empty_cells: population.empty_count(),
            moves,
            replaced: outcome.evicted.len(),
            best_score,
            worst_score,
            total_score,
        };
        debug!(
            generation,
            agents = summary.agents,
            moves,
            replaced = summary.replaced,
            "Generation completed"
        );

        self.generation = generation;
        self.last_summary = Some(summary);
        Ok(StepSignal::Continue)
    }

    // -------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------

    /// Current lifecycle state.
    pub const fn state(&self) -> DriverState {
        match self.ledger {
            Ledger::Unpartitioned(_) => DriverState::Idle,
            Ledger::Partitioned(_) => DriverState::Running,
        }
    }

    /// The graph.
    pub const fn topology(&self) -> &Topology {
        &self.topology
    }

    /// The population ledger, once initialized.
    pub const fn population(&self) -> Option<&Population> {
        match &self.ledger {
            Ledger::Unpartitioned(_) => None,
            Ledger::Partitioned(population) => Some(population),
        }
    }

    /// Current node attributes.
    pub const fn attributes(&self) -> &AttributeStore {
        match &self.ledger {
            Ledger::Unpartitioned(attributes) => attributes,
            Ledger::Partitioned(population) => population.attributes(),
        }
    }

    /// Give the node attributes back to the host.
    pub fn into_attributes(self) -> AttributeStore {
        match self.ledger {
            Ledger::Unpartitioned(attributes) => attributes,
            Ledger::Partitioned(population) => population.into_attributes(),
        }
    }

    /// The model parameters in use.
    pub const fn config(&self) -> &ValidatedModelConfig {
        &self.config
    }

    /// Number of generations completed.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Summary of the most recent generation, if any ran.
    pub const fn last_summary(&self) -> Option<&GenerationSummary> {
        self.last_summary.as_ref()
    }
}

/// Let every agent, in list order, take its movement micro-steps.
///
/// Returns how many micro-steps relocated an agent.
fn run_micro_steps(
    population: &mut Population,
    topology: &Topology,
    steps_per_generation: u32,
    rng: &mut StdRng,
) -> Result<u64, ModelError> {
    population.sort_agents_by_id();
    population.shuffle_agents(rng);

    let mut horizon = Horizon::with_capacity(topology.neighbours_hint());
    let mut moves: u64 = 0;

    for slot in 0..population.agent_count() {
        let mut agent = population.agent_at(slot)?;
        population.reset_score(agent)?;

        for _ in 0..steps_per_generation {
            build_horizon(agent, topology, population.attributes_mut(), &mut horizon)?;
            let genome = population.attributes().get(agent)?.actions;
            let target = decide_move(agent, genome, &mut horizon, topology, rng)?;
            if population.move_agent(slot, target)? {
                agent = target;
                moves = moves.saturating_add(1);
            }
        }
    }
    Ok(moves)
}

/// Best, worst, and total agent score.
fn score_stats(population: &Population) -> Result<(Option<i32>, Option<i32>, i64), ModelError> {
    let mut best: Option<i32> = None;
    let mut worst: Option<i32> = None;
    let mut total: i64 = 0;
    for &id in population.agents() {
        let score = population.score(id)?;
        best = Some(best.map_or(score, |b| b.max(score)));
        worst = Some(worst.map_or(score, |w| w.min(score)));
        total = total.saturating_add(i64::from(score));
    }
    Ok((best, worst, total))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use followflee_types::{CellAttributes, Genome, NodeId, ReplacementMode};
    use followflee_world::{Neighbourhood, square_lattice};

    use super::*;

    fn n(raw: u32) -> NodeId {
        NodeId::new(raw)
    }

    fn model(mode: ReplacementMode, rep_rate: f64, steps: u32) -> ValidatedModelConfig {
        ValidatedModelConfig {
            mode,
            rep_rate,
            steps_per_generation: steps,
        }
    }

    fn seeded_store(cells: &[(u32, Strategy, u8)], node_count: usize) -> AttributeStore {
        let mut store = AttributeStore::new(node_count);
        for &(id, strategy, genome) in cells {
            store
                .set(n(id), CellAttributes::agent(strategy, Genome::new(genome)))
                .unwrap();
        }
        store
    }

    #[test]
    fn first_step_initializes_and_runs_a_generation() {
        let topo = square_lattice(4, 4, Neighbourhood::Moore, true).unwrap();
        let store = seeded_store(
            &[
                (0, Strategy::Cooperator, 0b0101_0101),
                (5, Strategy::Defector, 0b1010_1010),
                (10, Strategy::Cooperator, 0xFF),
            ],
            16,
        );
        let mut sim =
            Simulation::new(topo, store, model(ReplacementMode::Simple, 0.0, 2), 42).unwrap();
        assert_eq!(sim.state(), DriverState::Idle);
        assert!(sim.population().is_none());

        assert_eq!(sim.step().unwrap(), StepSignal::Continue);

        assert_eq!(sim.state(), DriverState::Running);
        assert_eq!(sim.generation(), 1);
        let summary = sim.last_summary().unwrap();
        assert_eq!(summary.generation, 1);
        assert_eq!(summary.agents, 3);
        assert_eq!(summary.cooperators, 2);
        assert_eq!(summary.empty_cells, 13);
        assert_eq!(summary.replaced, 0);
    }

    #[test]
    fn no_agents_is_not_a_generation() {
        let topo = square_lattice(3, 3, Neighbourhood::VonNeumann, true).unwrap();
        let mut sim = Simulation::new(
            topo,
            AttributeStore::new(9),
            model(ReplacementMode::Simple, 0.5, 1),
            1,
        )
        .unwrap();
        for _ in 0..3 {
            assert_eq!(sim.step().unwrap(), StepSignal::Continue);
        }
        assert_eq!(sim.state(), DriverState::Running);
        assert_eq!(sim.generation(), 0);
        assert!(sim.last_summary().is_none());
    }

    #[test]
    fn mismatched_attribute_store_rejected() {
        let topo = square_lattice(3, 3, Neighbourhood::Moore, true).unwrap();
        let result = Simulation::new(
            topo,
            AttributeStore::new(8),
            model(ReplacementMode::Simple, 0.1, 1),
            0,
        );
        assert!(matches!(
            result,
            Err(ModelError::World {
                source: WorldError::SizeMismatch {
                    expected: 9,
                    actual: 8
                }
            })
        ));
    }

    #[test]
    fn scores_are_generation_scoped() {
        // Two cooperators side by side that never move (stay-still genome):
        // each scores 3 per micro-step, reset every generation.
        let topo = Topology::from_edges(3, &[(n(0), n(1)), (n(1), n(2))], true).unwrap();
        let store = seeded_store(
            &[(0, Strategy::Cooperator, 0), (1, Strategy::Cooperator, 0)],
            3,
        );
        let mut sim =
            Simulation::new(topo, store, model(ReplacementMode::Simple, 0.0, 4), 9).unwrap();

        for _ in 0..3 {
            sim.step().unwrap();
            let summary = sim.last_summary().unwrap();
            assert_eq!(summary.best_score, Some(12));
            assert_eq!(summary.worst_score, Some(12));
            assert_eq!(summary.total_score, 24);
            assert_eq!(summary.moves, 0);
        }
        assert_eq!(sim.attributes().get(n(0)).unwrap().score, 12);
    }

    #[test]
    fn same_seed_same_trajectory() {
        let run = |seed: u64| {
            let topo = square_lattice(6, 6, Neighbourhood::Moore, true).unwrap();
            let mut cells = Vec::new();
            for id in (0_u32..36).step_by(3) {
                let strategy = if id % 2 == 0 {
                    Strategy::Cooperator
                } else {
                    Strategy::Defector
                };
                cells.push((id, strategy, u8::try_from(id * 7 % 256).unwrap()));
            }
            let store = seeded_store(&cells, 36);
            let mut sim = Simulation::new(
                topo,
                store,
                model(ReplacementMode::NeighbourPreferring, 0.25, 2),
                seed,
            )
            .unwrap();
            let mut trajectory = Vec::new();
            for _ in 0..5 {
                sim.step().unwrap();
                trajectory.push(sim.attributes().to_raw());
            }
            trajectory
        };
        assert_eq!(run(17), run(17));
    }
}
