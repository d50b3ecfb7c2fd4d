//! Payout accumulation and the policies that rank search options.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// What one rollout observed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RolloutOutcome {
    pub hits_taken: u32,
    pub hits_landed: u32,
    /// Closest our shots came to the opponent.
    pub best_own_miss_sq: f64,
    /// Closest the opponent's shots came to us.
    pub closest_enemy_miss_sq: f64,
    /// Mean ratio of own miss distance to opponent miss distance. Lower is better.
    pub advantage: f64,
}

/// Per-option statistics across every rollout of that option.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub visits: u32,
    pub hits_taken: u32,
    pub rollouts_hit: u32,
    pub rollouts_landed: u32,
    pub advantage_sum: f64,
    pub best_own_miss_sq: f64,
    pub closest_enemy_miss_sq: f64,
}

impl Payout {
    /// The sentinel an unsampled option starts from.
    pub fn worst() -> Self {
        Self {
            visits: 0,
            hits_taken: 0,
            rollouts_hit: 0,
            rollouts_landed: 0,
            advantage_sum: 0.0,
            best_own_miss_sq: f64::INFINITY,
            closest_enemy_miss_sq: 0.0,
        }
    }

    pub fn record(&mut self, outcome: &RolloutOutcome) {
        if self.visits == 0 {
            self.closest_enemy_miss_sq = f64::INFINITY;
        }
        self.visits += 1;
        self.hits_taken += outcome.hits_taken;
        if outcome.hits_taken > 0 {
            self.rollouts_hit += 1;
        }
        if outcome.hits_landed > 0 {
            self.rollouts_landed += 1;
        }
        self.advantage_sum += outcome.advantage;
        self.best_own_miss_sq = self.best_own_miss_sq.min(outcome.best_own_miss_sq);
        self.closest_enemy_miss_sq = self
            .closest_enemy_miss_sq
            .min(outcome.closest_enemy_miss_sq);
    }

    pub fn hit_rate(&self) -> f64 {
        self.rate(self.rollouts_hit)
    }

    pub fn landed_rate(&self) -> f64 {
        self.rate(self.rollouts_landed)
    }

    pub fn mean_advantage(&self) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        self.advantage_sum / self.visits as f64
    }

    fn rate(&self, count: u32) -> f64 {
        if self.visits == 0 {
            return 0.0;
        }
        count as f64 / self.visits as f64
    }
}

/// Search-time context for the exploration bonus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exploration {
    pub total_visits: u32,
}

/// Lexicographic score: `safety` first, then `offense`. Lower is better.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Rank {
    pub safety: f64,
    pub offense: f64,
}

impl Rank {
    pub const UNVISITED: Rank = Rank {
        safety: f64::NEG_INFINITY,
        offense: f64::NEG_INFINITY,
    };
}

/// Orders options by their payouts. Passing `Some(exploration)` asks for the
/// search-time rank with the confidence bonus applied; `None` is the final
/// answer.
pub trait PayoutPolicy: Send + Sync + Debug {
    fn initial(&self) -> Payout {
        Payout::worst()
    }

    fn rank(&self, payout: &Payout, exploration: Option<Exploration>) -> Rank;
}

fn exploration_bonus(weight: f64, payout: &Payout, exploration: Option<Exploration>) -> f64 {
    match exploration {
        Some(Exploration { total_visits }) if total_visits > 1 => {
            weight * ((total_visits as f64).ln() / payout.visits as f64).sqrt()
        }
        _ => 0.0,
    }
}

/// Avoid getting hit, then improve the firing position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SafetyFirst {
    pub exploration_weight: f64,
}

impl PayoutPolicy for SafetyFirst {
    fn rank(&self, payout: &Payout, exploration: Option<Exploration>) -> Rank {
        if payout.visits == 0 {
            return Rank::UNVISITED;
        }
        let bonus = exploration_bonus(self.exploration_weight, payout, exploration);
        Rank {
            safety: payout.hit_rate() - bonus,
            offense: payout.mean_advantage() - bonus,
        }
    }
}

/// Single scalar trading hits taken against hits landed and position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Weighted {
    pub hit_penalty: f64,
    pub hit_reward: f64,
    pub exploration_weight: f64,
}

impl PayoutPolicy for Weighted {
    fn rank(&self, payout: &Payout, exploration: Option<Exploration>) -> Rank {
        if payout.visits == 0 {
            return Rank::UNVISITED;
        }
        let score = self.hit_penalty * payout.hit_rate() - self.hit_reward * payout.landed_rate()
            + payout.mean_advantage();
        // Scaled so the bonus stays comparable to the hit term.
        let bonus = exploration_bonus(self.exploration_weight, payout, exploration)
            * self.hit_penalty.max(1.0);
        Rank {
            safety: score - bonus,
            offense: 0.0,
        }
    }
}
