//! Bounded run loop.
//!
//! This module provides [`run_generations`], the host side of the driver
//! contract: it calls [`Simulation::step`] once per tick until the tick
//! budget is spent or the callback asks to stop. The core itself never
//! ends a run.

use followflee_types::GenerationSummary;
use serde::Serialize;
use tracing::info;

use crate::error::ModelError;
use crate::generation::{Simulation, StepSignal};

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunEndReason {
    /// The configured number of ticks was reached.
    MaxGenerationsReached,
    /// A step or the callback returned [`StepSignal::Stop`].
    Stopped,
}

/// Result of a bounded run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// The reason the run ended.
    pub end_reason: RunEndReason,
    /// The last generation summary, if any generation ran.
    pub final_summary: Option<GenerationSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each completed generation.
///
/// Ticks that run no generation (an empty population) do not call it.
pub trait GenerationCallback {
    /// Called with the summary of the generation that just ran. Returning
    /// [`StepSignal::Stop`] ends the run.
    fn on_generation(&mut self, summary: &GenerationSummary, simulation: &Simulation)
    -> StepSignal;
}

/// A callback that never stops the run.
pub struct NoOpCallback;

impl GenerationCallback for NoOpCallback {
    fn on_generation(
        &mut self,
        _summary: &GenerationSummary,
        _simulation: &Simulation,
    ) -> StepSignal {
        StepSignal::Continue
    }
}

/// Step `simulation` for at most `max_ticks` ticks.
///
/// # Errors
///
/// Returns the first [`ModelError`] raised by a step; the simulation must
/// not be stepped again afterwards.
pub fn run_generations(
    simulation: &mut Simulation,
    max_ticks: u64,
    callback: &mut dyn GenerationCallback,
) -> Result<RunResult, ModelError> {
    let mut total_ticks: u64 = 0;
    info!(max_ticks, "Run starting");

    let end_reason = loop {
        if total_ticks >= max_ticks {
            info!(total_ticks, "Tick limit reached");
            break RunEndReason::MaxGenerationsReached;
        }

        let before = simulation.generation();
        let signal = simulation.step()?;
        total_ticks = total_ticks.saturating_add(1);

        let mut stop = signal == StepSignal::Stop;
        let ran = simulation.generation() != before;
        if let Some(summary) = simulation.last_summary().filter(|_| ran) {
            stop |= callback.on_generation(summary, simulation) == StepSignal::Stop;
        }
        if stop {
            info!(total_ticks, "Stop requested");
            break RunEndReason::Stopped;
        }
    };

    let result = RunResult {
        end_reason,
        final_summary: simulation.last_summary().cloned(),
        total_ticks,
    };
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        generations = simulation.generation(),
        final_agents = result.final_summary.as_ref().map(|s| s.agents),
        "Run ended"
    );
    Ok(result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use followflee_types::{CellAttributes, Genome, ReplacementMode, Strategy};
    use followflee_world::{AttributeStore, Neighbourhood, square_lattice};

    use super::*;
    use crate::config::ValidatedModelConfig;

    fn make_simulation(with_agents: bool) -> Simulation {
        let topo = square_lattice(4, 4, Neighbourhood::Moore, true).unwrap();
        let mut store = AttributeStore::new(16);
        if with_agents {
            for id in [0_u32, 3, 6, 9, 12] {
                store
                    .set(
                        followflee_types::NodeId::new(id),
                        CellAttributes::agent(Strategy::Defector, Genome::new(0b0110_0110)),
                    )
                    .unwrap();
            }
        }
        let config = ValidatedModelConfig {
            mode: ReplacementMode::Simple,
            rep_rate: 0.2,
            steps_per_generation: 1,
        };
        Simulation::new(topo, store, config, 42).unwrap()
    }

    #[test]
    fn bounded_by_max_ticks() {
        let mut sim = make_simulation(true);
        let result = run_generations(&mut sim, 5, &mut NoOpCallback).unwrap();
        assert_eq!(result.end_reason, RunEndReason::MaxGenerationsReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(result.final_summary.unwrap().generation, 5);
    }

    #[test]
    fn zero_ticks_runs_nothing() {
        let mut sim = make_simulation(true);
        let result = run_generations(&mut sim, 0, &mut NoOpCallback).unwrap();
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
    }

    #[test]
    fn callback_can_stop_the_run() {
        struct StopAfter(u64);
        impl GenerationCallback for StopAfter {
            fn on_generation(
                &mut self,
                summary: &GenerationSummary,
                _simulation: &Simulation,
            ) -> StepSignal {
                if summary.generation >= self.0 {
                    StepSignal::Stop
                } else {
                    StepSignal::Continue
                }
            }
        }

        let mut sim = make_simulation(true);
        let result = run_generations(&mut sim, 100, &mut StopAfter(3)).unwrap();
        assert_eq!(result.end_reason, RunEndReason::Stopped);
        assert_eq!(result.total_ticks, 3);
    }

    #[test]
    fn empty_population_keeps_ticking_without_callbacks() {
        struct Counter(u32);
        impl GenerationCallback for Counter {
            fn on_generation(
                &mut self,
                _summary: &GenerationSummary,
                _simulation: &Simulation,
            ) -> StepSignal {
                self.0 += 1;
                StepSignal::Continue
            }
        }

        let mut sim = make_simulation(false);
        let mut counter = Counter(0);
        let result = run_generations(&mut sim, 4, &mut counter).unwrap();
        assert_eq!(result.total_ticks, 4);
        assert_eq!(counter.0, 0);
        assert!(result.final_summary.is_none());
    }
}
