//! Generation callback that logs summaries and tracks the run.
//!
//! After each generation this callback logs the [`GenerationSummary`] at
//! `info` and remembers how the cooperator share evolved, which ends up in
//! the final report.

use followflee_core::Simulation;
use followflee_core::StepSignal;
use followflee_core::runner::GenerationCallback;
use followflee_types::GenerationSummary;
use serde::Serialize;
use tracing::info;

/// Cooperator share at one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CooperationPoint {
    /// Generation index.
    pub generation: u64,
    /// Cooperators divided by agents, or 0 with no agents.
    pub cooperator_share: f64,
}

/// Callback that logs every generation summary.
#[derive(Debug, Default)]
pub struct LogCallback {
    history: Vec<CooperationPoint>,
}

impl LogCallback {
    /// Create a callback with an empty history.
    pub const fn new() -> Self {
        Self {
            history: Vec::new(),
        }
    }

    /// Cooperator share per generation, oldest first.
    pub fn history(&self) -> &[CooperationPoint] {
        &self.history
    }
}

impl GenerationCallback for LogCallback {
    fn on_generation(&mut self, summary: &GenerationSummary, simulation: &Simulation) -> StepSignal {
        let share = cooperator_share(summary);
        info!(
            generation = summary.generation,
            agents = summary.agents,
            cooperators = summary.cooperators,
            defectors = summary.defectors,
            moves = summary.moves,
            replaced = summary.replaced,
            best_score = summary.best_score,
            worst_score = summary.worst_score,
            cooperator_share = share,
            state = ?simulation.state(),
            "Generation completed"
        );
        self.history.push(CooperationPoint {
            generation: summary.generation,
            cooperator_share: share,
        });
        StepSignal::Continue
    }
}

#[allow(clippy::cast_precision_loss)]
fn cooperator_share(summary: &GenerationSummary) -> f64 {
    if summary.agents == 0 {
        0.0
    } else {
        summary.cooperators as f64 / summary.agents as f64
    }
}
