use mts_ai::{AgentWorker, MonteCarloVehicleAi, SearchConfig, WorkerError};
use mts_simulator::scenario::{self, DUEL_OPPONENT, DUEL_PLAYER};
use mts_simulator::simulation::TICK_LENGTH;
use std::sync::Arc;
use test_log::test;

fn small_config() -> SearchConfig {
    SearchConfig {
        iteration_budget: 30,
        ..Default::default()
    }
}

#[test]
fn test_request_response() {
    let duel = scenario::duel(3);
    let agent = MonteCarloVehicleAi::new(
        DUEL_PLAYER,
        DUEL_OPPONENT,
        duel.data.clone(),
        TICK_LENGTH,
        small_config(),
    )
    .unwrap();
    let snapshot = Arc::new(duel.initial.clone());

    let mut worker = AgentWorker::spawn(agent);
    assert_eq!(worker.id(), DUEL_PLAYER);
    assert_eq!(worker.response(), Err(WorkerError::NoRequest));

    worker.request(snapshot.clone()).unwrap();
    assert!(worker.in_flight());
    assert_eq!(
        worker.request(snapshot.clone()),
        Err(WorkerError::RequestInFlight)
    );
    worker.response().unwrap();
    assert!(!worker.in_flight());

    // Same snapshot again goes through once the slot is free.
    worker.request(snapshot).unwrap();
    let mut polled = None;
    while polled.is_none() {
        polled = worker.try_response().unwrap();
        std::thread::yield_now();
    }
}

#[test]
fn test_matches_direct_agent() {
    let duel = scenario::duel(8);
    let make = || {
        MonteCarloVehicleAi::new(
            DUEL_OPPONENT,
            DUEL_PLAYER,
            duel.data.clone(),
            TICK_LENGTH,
            small_config(),
        )
        .unwrap()
    };
    let mut direct = make();
    let expected = direct.compute_control(&duel.initial);

    let mut worker = AgentWorker::spawn(make());
    worker.request(Arc::new(duel.initial.clone())).unwrap();
    assert_eq!(worker.response(), Ok(expected));
}

#[test]
fn test_drop_with_unread_response() {
    let duel = scenario::duel(1);
    let agent = MonteCarloVehicleAi::new(
        DUEL_PLAYER,
        DUEL_OPPONENT,
        duel.data.clone(),
        TICK_LENGTH,
        small_config(),
    )
    .unwrap();
    let mut worker = AgentWorker::spawn(agent);
    worker.request(Arc::new(duel.initial.clone())).unwrap();
    drop(worker);
}
