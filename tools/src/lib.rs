//! Headless matches between two search agents.

use anyhow::Context;
use mts_ai::{AgentWorker, MonteCarloVehicleAi, SearchConfig};
use mts_simulator::scenario::{self, Scoreboard, Status, DUEL_OPPONENT, DUEL_PLAYER};
use mts_simulator::simulation::{self, ControlInputs, SimulationState, TICK_LENGTH};
use mts_simulator::vehicle::{self, VehiclePrototype};
use mts_simulator::VehicleId;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Archetype {
    Fighter,
    Hover,
}

impl Archetype {
    pub fn prototype(&self) -> VehiclePrototype {
        match self {
            Archetype::Fighter => vehicle::fighter(),
            Archetype::Hover => vehicle::hover(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MatchSettings {
    pub search: SearchConfig,
    pub max_ticks: u64,
    pub hits_to_win: u32,
    pub threaded: bool,
    pub player: Archetype,
    pub opponent: Archetype,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            max_ticks: 60 * 60,
            hits_to_win: scenario::DEFAULT_HITS_TO_WIN,
            threaded: false,
            player: Archetype::Fighter,
            opponent: Archetype::Fighter,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchResult {
    pub seed: u64,
    pub status: Status,
    pub ticks: u64,
    pub player_hits_taken: u32,
    pub opponent_hits_taken: u32,
    pub hash: u64,
}

enum Pilots {
    Inline(MonteCarloVehicleAi, MonteCarloVehicleAi),
    Threaded(AgentWorker, AgentWorker),
}

impl Pilots {
    fn controls(&mut self, state: &SimulationState) -> anyhow::Result<ControlInputs> {
        let (player, opponent) = match self {
            Pilots::Inline(player, opponent) => {
                (player.compute_control(state), opponent.compute_control(state))
            }
            Pilots::Threaded(player, opponent) => {
                let snapshot = Arc::new(state.clone());
                player.request(snapshot.clone())?;
                opponent.request(snapshot)?;
                (player.response()?, opponent.response()?)
            }
        };
        let mut inputs = ControlInputs::new();
        inputs.insert(DUEL_PLAYER, player);
        inputs.insert(DUEL_OPPONENT, opponent);
        Ok(inputs)
    }
}

/// Plays one duel to a result. A match still running at `max_ticks` is a draw.
pub fn run_match(seed: u64, settings: &MatchSettings) -> anyhow::Result<MatchResult> {
    let duel = scenario::duel_with(
        seed,
        Arc::new(settings.player.prototype()),
        Arc::new(settings.opponent.prototype()),
    );
    let search = SearchConfig {
        seed: settings.search.seed.wrapping_add(seed),
        ..settings.search.clone()
    };
    let agent = |controlled: VehicleId, target: VehicleId| {
        MonteCarloVehicleAi::new(
            controlled,
            target,
            duel.data.clone(),
            TICK_LENGTH,
            search.clone(),
        )
        .with_context(|| format!("creating agent for vehicle {controlled}"))
    };
    let player = agent(DUEL_PLAYER, DUEL_OPPONENT)?;
    let opponent = agent(DUEL_OPPONENT, DUEL_PLAYER)?;
    let mut pilots = if settings.threaded {
        Pilots::Threaded(AgentWorker::spawn(player), AgentWorker::spawn(opponent))
    } else {
        Pilots::Inline(player, opponent)
    };

    let mut state = duel.initial.clone();
    let mut scoreboard = Scoreboard::new();
    let mut status = Status::Running;
    let mut ticks = 0;
    while status == Status::Running && ticks < settings.max_ticks {
        let inputs = pilots.controls(&state)?;
        state = simulation::tick(&state, &duel.data, &inputs, TICK_LENGTH)
            .with_context(|| format!("seed {seed} tick {ticks}"))?;
        scoreboard.record(&state);
        status = scoreboard.status(settings.hits_to_win);
        ticks += 1;
    }
    if status == Status::Running {
        status = Status::Draw;
    }
    log::info!("seed {seed}: {status:?} after {ticks} ticks");

    Ok(MatchResult {
        seed,
        status,
        ticks,
        player_hits_taken: scoreboard.hits_taken(DUEL_PLAYER),
        opponent_hits_taken: scoreboard.hits_taken(DUEL_OPPONENT),
        hash: state.hash(),
    })
}
