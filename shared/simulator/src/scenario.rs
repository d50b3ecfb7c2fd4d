use crate::arena::Arena;
use crate::geometry::DynamicTransform;
use crate::rng::new_rng;
use crate::simulation::{SimulationData, SimulationState};
use crate::vehicle::{fighter, VehicleId, VehiclePrototype, VehicleState};
use nalgebra::{vector, Rotation2};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::{PI, TAU};
use std::sync::Arc;

pub const DUEL_PLAYER: VehicleId = 0;
pub const DUEL_OPPONENT: VehicleId = 1;
pub const DEFAULT_HITS_TO_WIN: u32 = 5;

#[derive(PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Copy, Clone)]
pub enum Status {
    Running,
    Victory { id: VehicleId },
    Draw,
}

/// Registry and opening snapshot for a one-on-one match.
pub struct Duel {
    pub data: Arc<SimulationData>,
    pub initial: SimulationState,
}

/// Two fighters facing each other across the arena center at a seeded angle
/// and separation.
pub fn duel(seed: u64) -> Duel {
    duel_with(seed, Arc::new(fighter()), Arc::new(fighter()))
}

pub fn duel_with(
    seed: u64,
    player: Arc<VehiclePrototype>,
    opponent: Arc<VehiclePrototype>,
) -> Duel {
    let arena = Arena::default();
    let mut data = SimulationData::new(arena);
    data.register(DUEL_PLAYER, player);
    data.register(DUEL_OPPONENT, opponent);

    let mut rng = new_rng(seed);
    let angle = rng.gen_range(0.0..TAU);
    let max_distance = arena.width.min(arena.height) * 0.8;
    let distance = rng.gen_range((max_distance * 0.5)..max_distance);
    let offset = Rotation2::new(angle) * vector![distance / 2.0, 0.0];

    let mut initial = SimulationState::new();
    initial.insert_vehicle(
        DUEL_PLAYER,
        VehicleState::at_rest(DynamicTransform::at_rest(arena.center() - offset, angle)),
    );
    initial.insert_vehicle(
        DUEL_OPPONENT,
        VehicleState::at_rest(DynamicTransform::at_rest(arena.center() + offset, angle + PI)),
    );
    log::debug!("duel seed {seed}: separation {distance:.1} at angle {angle:.3}");

    Duel {
        data: Arc::new(data),
        initial,
    }
}

/// Running hit totals across the snapshots of one match.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    hits_taken: BTreeMap<VehicleId, u32>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, state: &SimulationState) {
        for (id, _) in state.vehicles() {
            *self.hits_taken.entry(id).or_default() += state.hits(id);
        }
    }

    pub fn hits_taken(&self, id: VehicleId) -> u32 {
        self.hits_taken.get(&id).copied().unwrap_or(0)
    }

    /// The last vehicle standing below `hits_to_win` hits wins. When every
    /// vehicle reaches the limit on the same tick the match is a draw.
    pub fn status(&self, hits_to_win: u32) -> Status {
        let survivors: Vec<VehicleId> = self
            .hits_taken
            .iter()
            .filter(|(_, hits)| **hits < hits_to_win)
            .map(|(id, _)| *id)
            .collect();
        match survivors.as_slice() {
            [] if !self.hits_taken.is_empty() => Status::Draw,
            [id] if self.hits_taken.len() > 1 => Status::Victory { id: *id },
            _ => Status::Running,
        }
    }
}
