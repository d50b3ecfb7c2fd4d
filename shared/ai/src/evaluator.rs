use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::policy::{Exploration, Payout, PayoutPolicy, Rank, RolloutOutcome};
use mts_simulator::controls::{DriveControls, VehicleControls};
use mts_simulator::geometry::{DynamicPosition, DynamicTransform};
use mts_simulator::gun;
use mts_simulator::rng::SeededRng;
use mts_simulator::shot::miss_distance_sq;
use mts_simulator::simulation::{self, ControlInputs, SimulationData, SimulationState};
use mts_simulator::vehicle::{VehiclePrototype, VehicleState};
use mts_simulator::VehicleId;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Nothing captured, or the last answer was already taken.
    Idle,
    /// Options enumerated, no rollouts yet.
    Armed,
    /// At least one `expand` finished; `get_best_control` may be called.
    Answerable,
}

/// One candidate next-tick control and what its rollouts have shown so far.
#[derive(Clone, Debug)]
pub struct SearchOption {
    pub control: DriveControls,
    /// Controlled vehicle after one search tick under `control`.
    pub state: VehicleState,
    pub payout: Payout,
}

/// Monte-Carlo bandit over the controls one vehicle can reach next tick.
///
/// The cycle is `reset_and_setup`, then one or more `expand` calls, then a
/// single `get_best_control`. All randomness comes from the injected generator,
/// so identical inputs and seeds give identical answers.
pub struct MonteCarloTreeEvaluator {
    controlled: VehicleId,
    target: VehicleId,
    data: Arc<SimulationData>,
    dt: f64,
    config: SearchConfig,
    policy: Box<dyn PayoutPolicy>,
    rng: SeededRng,
    phase: Phase,
    options: Vec<SearchOption>,
    rollouts: usize,
    target_state: VehicleState,
    incoming: Vec<DynamicPosition>,
    scratch: Vec<DriveControls>,
}

impl MonteCarloTreeEvaluator {
    pub fn new(
        controlled: VehicleId,
        target: VehicleId,
        data: Arc<SimulationData>,
        dt: f64,
        config: SearchConfig,
        rng: SeededRng,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SearchError::InvalidConfig(format!(
                "tick length {dt} must be positive"
            )));
        }
        let branching = data.prototype(controlled)?.controls.branching_factor();
        data.prototype(target)?;
        let policy = config.policy.build();
        Ok(Self {
            controlled,
            target,
            data,
            dt,
            config,
            policy,
            rng,
            phase: Phase::Idle,
            options: Vec::with_capacity(branching),
            rollouts: 0,
            target_state: VehicleState::default(),
            incoming: vec![],
            scratch: Vec::with_capacity(branching),
        })
    }

    pub fn controlled(&self) -> VehicleId {
        self.controlled
    }

    pub fn target(&self) -> VehicleId {
        self.target
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn options(&self) -> &[SearchOption] {
        &self.options
    }

    pub fn total_rollouts(&self) -> usize {
        self.rollouts
    }

    /// Projectiles of the target that were closing on us at setup.
    pub fn incoming(&self) -> &[DynamicPosition] {
        &self.incoming
    }

    fn search_dt(&self) -> f64 {
        self.dt * self.config.tick_scale
    }

    /// Captures `snapshot` and enumerates this cycle's options. Any previous
    /// search results are discarded.
    pub fn reset_and_setup(&mut self, snapshot: &SimulationState) -> Result<(), SearchError> {
        self.phase = Phase::Idle;
        self.options.clear();
        self.rollouts = 0;

        let data = Arc::clone(&self.data);
        let prototype = data.prototype(self.controlled)?;
        let own = *snapshot.vehicle(self.controlled)?;
        self.target_state = *snapshot.vehicle(self.target)?;

        let own_body = own.transform.dynamic_position;
        self.incoming.clear();
        self.incoming.extend(
            snapshot
                .projectiles(self.target)
                .iter()
                .filter(|projectile| is_closing(projectile, &own_body)),
        );

        let search_dt = self.search_dt();
        let initial = self.policy.initial();
        for control in prototype.controls.options(&own.controls, search_dt)? {
            self.options.push(SearchOption {
                control,
                state: prototype.drive_state(&own, &control, search_dt),
                payout: initial,
            });
        }

        log::debug!(
            "vehicle {} armed with {} options, {} incoming projectiles",
            self.controlled,
            self.options.len(),
            self.incoming.len()
        );
        self.phase = Phase::Armed;
        Ok(())
    }

    /// Rolls out every unvisited option once, then keeps sampling the option
    /// the policy currently favors until `budget` rollouts have been made
    /// since setup.
    pub fn expand(&mut self, budget: usize) -> Result<(), SearchError> {
        if budget == 0 {
            return Err(SearchError::EmptyBudget);
        }
        if self.phase == Phase::Idle {
            return Err(SearchError::NotArmed(self.phase));
        }

        for index in 0..self.options.len() {
            if self.options[index].payout.visits == 0 {
                self.sample(index)?;
            }
        }
        while self.rollouts < budget {
            match self.select(true) {
                Some(index) => self.sample(index)?,
                None => break,
            }
        }

        self.phase = Phase::Answerable;
        Ok(())
    }

    /// Returns the winning control and consumes the answer. The evaluator
    /// must be set up again before the next call.
    pub fn get_best_control(&mut self) -> Result<VehicleControls, SearchError> {
        if self.phase != Phase::Answerable {
            return Err(SearchError::NotArmed(self.phase));
        }
        let index = self.select(false).ok_or(SearchError::NotArmed(self.phase))?;
        let option = &self.options[index];
        let fire = option.payout.landed_rate() > self.config.fire_threshold;
        log::debug!(
            "vehicle {} chose {:?} fire={} after {} rollouts ({} visits, hit rate {:.2}, landed rate {:.2})",
            self.controlled,
            option.control.axes(),
            fire,
            self.rollouts,
            option.payout.visits,
            option.payout.hit_rate(),
            option.payout.landed_rate(),
        );
        self.phase = Phase::Idle;
        Ok(VehicleControls::new(option.control, fire))
    }

    /// Best option by the policy. Exact ties go to the gentler control, then
    /// to enumeration order.
    fn select(&self, explore: bool) -> Option<usize> {
        let exploration = explore.then(|| Exploration {
            total_visits: self.rollouts as u32,
        });
        let mut best: Option<(usize, Rank, f64)> = None;
        for (index, option) in self.options.iter().enumerate() {
            let rank = self.policy.rank(&option.payout, exploration);
            let norm = option.control.norm_squared();
            let better = match best {
                None => true,
                Some((_, best_rank, best_norm)) => {
                    rank < best_rank || (rank == best_rank && norm < best_norm)
                }
            };
            if better {
                best = Some((index, rank, norm));
            }
        }
        best.map(|(index, _, _)| index)
    }

    fn sample(&mut self, index: usize) -> Result<(), SearchError> {
        let outcome = self.rollout(index)?;
        log::trace!("option {index}: {outcome:?}");
        self.options[index].payout.record(&outcome);
        self.rollouts += 1;
        Ok(())
    }

    fn rollout(&mut self, index: usize) -> Result<RolloutOutcome, SearchError> {
        let data = Arc::clone(&self.data);
        let own_proto = data.prototype(self.controlled)?;
        let target_proto = data.prototype(self.target)?;
        let search_dt = self.search_dt();
        let (controlled, target) = (self.controlled, self.target);

        let option_state = self.options[index].state;
        let mut state = SimulationState::new();
        state.insert_vehicle(controlled, option_state);
        state.push_projectile(
            controlled,
            own_proto
                .guns
                .spawn_projectile(&option_state.transform, option_state.gun.next_barrel),
        )?;

        let target_control = random_control(
            &mut self.rng,
            &mut self.scratch,
            target_proto,
            &self.target_state.controls,
            search_dt,
        );
        state.insert_vehicle(
            target,
            target_proto.drive_state(&self.target_state, &target_control, search_dt),
        );
        state.set_projectiles(target, self.incoming.clone())?;

        let mut outcome = RolloutOutcome {
            hits_taken: 0,
            hits_landed: 0,
            best_own_miss_sq: f64::INFINITY,
            closest_enemy_miss_sq: f64::INFINITY,
            advantage: 0.0,
        };
        let mut advantage_sum = 0.0;
        let mut samples = 0;
        let mut observe = |state: &SimulationState, outcome: &mut RolloutOutcome| {
            let own = state.vehicle(controlled)?.transform;
            let enemy = state.vehicle(target)?.transform;
            let (own_miss, enemy_miss) = shot_quality(&own, own_proto, &enemy, target_proto);
            outcome.best_own_miss_sq = outcome.best_own_miss_sq.min(own_miss);
            outcome.closest_enemy_miss_sq = outcome.closest_enemy_miss_sq.min(enemy_miss);
            advantage_sum += own_miss.sqrt() / enemy_miss.sqrt().max(1.0);
            samples += 1;
            Ok::<(), SearchError>(())
        };
        observe(&state, &mut outcome)?;

        let (low, high) = self.config.tick_jitter;
        let mut inputs = ControlInputs::new();
        for _ in 0..self.config.sub_ticks {
            let dt = search_dt * self.rng.gen_range(low..=high);
            for (id, prototype) in [(controlled, own_proto), (target, target_proto)] {
                let current = state.vehicle(id)?.controls;
                let control =
                    random_control(&mut self.rng, &mut self.scratch, prototype, &current, dt);
                inputs.insert(id, VehicleControls::drive_only(control));
            }
            state = simulation::tick(&state, &data, &inputs, dt)?;
            outcome.hits_taken += state.hits(controlled);
            outcome.hits_landed += state.hits(target);
            observe(&state, &mut outcome)?;
        }

        let horizon = self.config.extra_horizon;
        let own_body = state.vehicle(controlled)?.transform.dynamic_position;
        let enemy_body = state.vehicle(target)?.transform.dynamic_position;
        outcome.hits_landed += state
            .projectiles(controlled)
            .iter()
            .filter(|p| gun::intercept(&enemy_body, target_proto.radius, p, horizon))
            .count() as u32;
        outcome.hits_taken += state
            .projectiles(target)
            .iter()
            .filter(|p| gun::intercept(&own_body, own_proto.radius, p, horizon))
            .count() as u32;

        outcome.advantage = advantage_sum / samples as f64;
        Ok(outcome)
    }
}

/// A projectile is a threat while it is still closing on the vehicle.
fn is_closing(projectile: &DynamicPosition, vehicle: &DynamicPosition) -> bool {
    let dp = projectile.position - vehicle.position;
    let dv = projectile.velocity - vehicle.velocity;
    dp.dot(&dv) < 0.0
}

/// Squared miss distances of a shot fired now: ours at the enemy, theirs at us.
fn shot_quality(
    own: &DynamicTransform,
    own_proto: &VehiclePrototype,
    enemy: &DynamicTransform,
    enemy_proto: &VehiclePrototype,
) -> (f64, f64) {
    (
        miss_distance_sq(own, own_proto.gun(), &enemy.dynamic_position),
        miss_distance_sq(enemy, enemy_proto.gun(), &own.dynamic_position),
    )
}

fn random_control(
    rng: &mut SeededRng,
    scratch: &mut Vec<DriveControls>,
    prototype: &VehiclePrototype,
    current: &DriveControls,
    dt: f64,
) -> DriveControls {
    scratch.clear();
    prototype.controls.enumerate_into(current, dt, scratch);
    scratch.choose(rng).copied().unwrap_or(*current)
}

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn test_is_closing() {
        let vehicle = DynamicPosition::stationary(vector![0.0, 0.0]);
        let towards = DynamicPosition::new(vector![100.0, 0.0], vector![-10.0, 0.0]);
        let away = DynamicPosition::new(vector![100.0, 0.0], vector![10.0, 0.0]);
        assert!(is_closing(&towards, &vehicle));
        assert!(!is_closing(&away, &vehicle));
    }
}
