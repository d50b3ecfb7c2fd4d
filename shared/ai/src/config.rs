use crate::error::SearchError;
use crate::policy::{PayoutPolicy, SafetyFirst, Weighted};
use serde::{Deserialize, Serialize};

/// Ceiling on rollouts per decision. Keeps worst-case search latency bounded
/// regardless of what a config file asks for.
pub const MAX_ITERATION_BUDGET: usize = 20_000;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyKind {
    SafetyFirst {
        exploration_weight: f64,
    },
    Weighted {
        hit_penalty: f64,
        hit_reward: f64,
        exploration_weight: f64,
    },
}

impl Default for PolicyKind {
    fn default() -> Self {
        PolicyKind::SafetyFirst {
            exploration_weight: 0.5,
        }
    }
}

impl PolicyKind {
    pub fn build(&self) -> Box<dyn PayoutPolicy> {
        match *self {
            PolicyKind::SafetyFirst { exploration_weight } => {
                Box::new(SafetyFirst { exploration_weight })
            }
            PolicyKind::Weighted {
                hit_penalty,
                hit_reward,
                exploration_weight,
            } => Box::new(Weighted {
                hit_penalty,
                hit_reward,
                exploration_weight,
            }),
        }
    }

    fn exploration_weight(&self) -> f64 {
        match *self {
            PolicyKind::SafetyFirst { exploration_weight } => exploration_weight,
            PolicyKind::Weighted {
                exploration_weight, ..
            } => exploration_weight,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Total rollouts per decision.
    pub iteration_budget: usize,
    /// Search tick as a multiple of the simulation tick.
    pub tick_scale: f64,
    /// Simulation steps per rollout.
    pub sub_ticks: usize,
    /// Multiplicative band each rollout step's length is drawn from.
    pub tick_jitter: (f64, f64),
    /// Seconds over which projectiles still flying after a rollout are resolved.
    pub extra_horizon: f64,
    /// Fire when more than this fraction of the winner's rollouts landed a hit.
    pub fire_threshold: f64,
    pub policy: PolicyKind,
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            iteration_budget: 300,
            tick_scale: 2.5,
            sub_ticks: 12,
            tick_jitter: (0.75, 2.2),
            extra_horizon: 1.0,
            fire_threshold: 0.1,
            policy: PolicyKind::default(),
            seed: 0,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), SearchError> {
        let invalid = |reason: String| Err(SearchError::InvalidConfig(reason));
        if self.iteration_budget == 0 || self.iteration_budget > MAX_ITERATION_BUDGET {
            return invalid(format!(
                "iteration_budget {} outside 1..={MAX_ITERATION_BUDGET}",
                self.iteration_budget
            ));
        }
        if !(self.tick_scale.is_finite() && self.tick_scale > 0.0) {
            return invalid(format!("tick_scale {} must be positive", self.tick_scale));
        }
        let (low, high) = self.tick_jitter;
        if !(low.is_finite() && high.is_finite() && low > 0.0 && low <= high) {
            return invalid(format!("tick_jitter ({low}, {high}) is not a positive band"));
        }
        if !(self.extra_horizon.is_finite() && self.extra_horizon >= 0.0) {
            return invalid(format!("extra_horizon {} is negative", self.extra_horizon));
        }
        if !(0.0..=1.0).contains(&self.fire_threshold) {
            return invalid(format!("fire_threshold {} outside [0, 1]", self.fire_threshold));
        }
        let weight = self.policy.exploration_weight();
        if !(weight.is_finite() && weight >= 0.0) {
            return invalid(format!("exploration_weight {weight} is negative"));
        }
        Ok(())
    }
}
