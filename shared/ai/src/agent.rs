use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::evaluator::MonteCarloTreeEvaluator;
use mts_simulator::controls::VehicleControls;
use mts_simulator::rng;
use mts_simulator::simulation::{SimulationData, SimulationState};
use mts_simulator::VehicleId;
use std::sync::Arc;

/// Drives one vehicle against one opponent with a fixed search budget per
/// decision.
pub struct MonteCarloVehicleAi {
    evaluator: MonteCarloTreeEvaluator,
    neutral: VehicleControls,
    budget: usize,
}

impl MonteCarloVehicleAi {
    /// The search generator is derived from `config.seed` and the controlled
    /// id, so agents sharing a config still explore independently.
    pub fn new(
        controlled: VehicleId,
        target: VehicleId,
        data: Arc<SimulationData>,
        dt: f64,
        config: SearchConfig,
    ) -> Result<Self, SearchError> {
        let neutral = data.prototype(controlled)?.neutral_controls();
        let budget = config.iteration_budget;
        let rng = rng::derive_rng(config.seed, controlled as u64);
        let evaluator = MonteCarloTreeEvaluator::new(controlled, target, data, dt, config, rng)?;
        Ok(Self {
            evaluator,
            neutral,
            budget,
        })
    }

    pub fn controlled(&self) -> VehicleId {
        self.evaluator.controlled()
    }

    pub fn evaluator(&self) -> &MonteCarloTreeEvaluator {
        &self.evaluator
    }

    /// Chooses this tick's control. A failed search yields the neutral
    /// control with the trigger released.
    pub fn compute_control(&mut self, snapshot: &SimulationState) -> VehicleControls {
        match self.try_compute_control(snapshot) {
            Ok(controls) => controls,
            Err(e) => {
                log::warn!(
                    "vehicle {} search failed, using neutral control: {}",
                    self.controlled(),
                    e
                );
                self.neutral
            }
        }
    }

    pub fn try_compute_control(
        &mut self,
        snapshot: &SimulationState,
    ) -> Result<VehicleControls, SearchError> {
        self.evaluator.reset_and_setup(snapshot)?;
        self.evaluator.expand(self.budget)?;
        self.evaluator.get_best_control()
    }
}
