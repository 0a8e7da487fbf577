//! Final run report printed as JSON.

use followflee_core::Simulation;
use followflee_core::config::FollowFleeConfig;
use followflee_core::runner::{RunEndReason, RunResult};
use followflee_types::{GenerationSummary, Strategy};
use serde::Serialize;

use crate::log_callback::{CooperationPoint, LogCallback};

/// Everything the host reports once the run is over.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// The configuration the run used.
    pub config: FollowFleeConfig,
    /// Why the run ended.
    pub end_reason: RunEndReason,
    /// Ticks executed.
    pub total_ticks: u64,
    /// Generations completed.
    pub generations: u64,
    /// Summary of the last generation, if any ran.
    pub final_summary: Option<GenerationSummary>,
    /// Cooperators alive at the end.
    pub cooperators: usize,
    /// Defectors alive at the end.
    pub defectors: usize,
    /// Cooperator share after every generation.
    pub cooperation_history: Vec<CooperationPoint>,
}

impl RunReport {
    /// Assemble the report from a finished run.
    pub fn new(
        config: FollowFleeConfig,
        result: &RunResult,
        simulation: &Simulation,
        callback: &LogCallback,
    ) -> Self {
        let attributes = simulation.attributes();
        Self {
            config,
            end_reason: result.end_reason,
            total_ticks: result.total_ticks,
            generations: simulation.generation(),
            final_summary: result.final_summary.clone(),
            cooperators: attributes.count_strategy(Strategy::Cooperator),
            defectors: attributes.count_strategy(Strategy::Defector),
            cooperation_history: callback.history().to_vec(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use followflee_core::runner::{self, NoOpCallback};
    use followflee_world::{Neighbourhood, square_lattice};

    use super::*;
    use crate::spawner::seed_population;

    #[test]
    fn report_serializes_run_outcome() {
        let config = FollowFleeConfig::parse(
            "world:\n  width: 6\n  height: 6\nmodel:\n  rep_mode: simpleBD\n  rep_rate: 0.1\n  steps_per_generation: 1\n",
        )
        .unwrap();
        let model = config.model.validate().unwrap();
        let topo = square_lattice(6, 6, Neighbourhood::Moore, true).unwrap();
        let attrs = seed_population(&config.population, 36, 1).unwrap();
        let mut sim = Simulation::new(topo, attrs, model, 1).unwrap();
        let result = runner::run_generations(&mut sim, 3, &mut NoOpCallback).unwrap();

        let report = RunReport::new(config, &result, &sim, &LogCallback::new());
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();

        assert_eq!(json["end_reason"], "max_generations_reached");
        assert_eq!(json["total_ticks"], 3);
        assert_eq!(json["config"]["model"]["rep_mode"], "simpleBD");
        let agents = report.cooperators + report.defectors;
        if let Some(summary) = &report.final_summary {
            assert_eq!(summary.agents, agents);
        }
    }
}
