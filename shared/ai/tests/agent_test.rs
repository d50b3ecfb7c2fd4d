use mts_ai::{MonteCarloVehicleAi, SearchConfig, SearchError};
use mts_simulator::scenario::{self, Scoreboard, Status, DUEL_OPPONENT, DUEL_PLAYER};
use mts_simulator::simulation::{self, ControlInputs, SimulationState, TICK_LENGTH};
use test_log::test;

fn config(seed: u64) -> SearchConfig {
    SearchConfig {
        iteration_budget: 40,
        seed,
        ..Default::default()
    }
}

#[test]
fn test_falls_back_to_neutral() {
    let duel = scenario::duel(0);
    let mut agent = MonteCarloVehicleAi::new(
        DUEL_PLAYER,
        DUEL_OPPONENT,
        duel.data.clone(),
        TICK_LENGTH,
        config(0),
    )
    .unwrap();

    let empty = SimulationState::new();
    assert!(matches!(
        agent.try_compute_control(&empty),
        Err(SearchError::Simulation(_))
    ));
    let controls = agent.compute_control(&empty);
    assert!(!controls.trigger);
    assert_eq!(
        controls,
        duel.data.prototype(DUEL_PLAYER).unwrap().neutral_controls()
    );
}

#[test]
fn test_rejects_invalid_config() {
    let duel = scenario::duel(0);
    let bad = SearchConfig {
        tick_scale: -1.0,
        ..config(0)
    };
    let agent =
        MonteCarloVehicleAi::new(DUEL_PLAYER, DUEL_OPPONENT, duel.data.clone(), TICK_LENGTH, bad);
    assert!(matches!(agent, Err(SearchError::InvalidConfig(_))));
}

#[test]
fn test_agents_play_a_duel() {
    let duel = scenario::duel(4);
    let mut player = MonteCarloVehicleAi::new(
        DUEL_PLAYER,
        DUEL_OPPONENT,
        duel.data.clone(),
        TICK_LENGTH,
        config(1),
    )
    .unwrap();
    let mut opponent = MonteCarloVehicleAi::new(
        DUEL_OPPONENT,
        DUEL_PLAYER,
        duel.data.clone(),
        TICK_LENGTH,
        config(1),
    )
    .unwrap();

    let mut state = duel.initial.clone();
    let mut scoreboard = Scoreboard::new();
    let mut fired = 0;
    for _ in 0..120 {
        let mut inputs = ControlInputs::new();
        inputs.insert(DUEL_PLAYER, player.compute_control(&state));
        inputs.insert(DUEL_OPPONENT, opponent.compute_control(&state));
        fired += inputs.values().filter(|c| c.trigger).count();
        state = simulation::tick(&state, &duel.data, &inputs, TICK_LENGTH).unwrap();
        scoreboard.record(&state);
        if scoreboard.status(scenario::DEFAULT_HITS_TO_WIN) != Status::Running {
            break;
        }
        for (_, vehicle) in state.vehicles() {
            assert!(duel.data.arena.contains(vehicle.transform.position()));
        }
    }
    assert!(fired > 0);
}
