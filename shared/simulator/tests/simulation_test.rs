use approx::assert_abs_diff_eq;
use mts_simulator::arena::Arena;
use mts_simulator::controls::{DriveControls, VehicleControls};
use mts_simulator::geometry::{DynamicPosition, DynamicTransform};
use mts_simulator::simulation::{
    self, ControlInputs, SimulationData, SimulationState, TICK_LENGTH,
};
use mts_simulator::vehicle::{self, VehicleState};
use mts_simulator::{Error, VehicleId};
use nalgebra::vector;
use std::f64::consts::PI;
use std::sync::Arc;
use test_log::test;

fn two_fighters(distance: f64) -> (SimulationData, SimulationState) {
    let mut data = SimulationData::new(Arena::new(2000.0, 1000.0));
    data.register(0, Arc::new(vehicle::fighter()));
    data.register(1, Arc::new(vehicle::fighter()));

    let mut state = SimulationState::new();
    let left = DynamicTransform::at_rest(vector![1000.0 - distance / 2.0, 500.0], 0.0);
    let right = DynamicTransform::at_rest(vector![1000.0 + distance / 2.0, 500.0], PI);
    state.insert_vehicle(0, VehicleState::at_rest(left));
    state.insert_vehicle(1, VehicleState::at_rest(right));
    (data, state)
}

fn controls(trigger0: bool, trigger1: bool) -> ControlInputs {
    let mut controls = ControlInputs::new();
    controls.insert(0, VehicleControls::new(DriveControls::NEUTRAL, trigger0));
    controls.insert(1, VehicleControls::new(DriveControls::NEUTRAL, trigger1));
    controls
}

#[test]
fn test_tick_preserves_vehicles_and_lists() {
    let (data, state) = two_fighters(400.0);
    let next = simulation::tick(&state, &data, &controls(false, false), TICK_LENGTH).unwrap();
    assert_eq!(next.vehicle_count(), 2);
    assert_eq!(next.projectiles(0).len(), 0);
    assert_eq!(next.projectiles(1).len(), 0);
    assert_eq!(next.total_hits(), 0);
    // The input snapshot is untouched.
    assert_eq!(state.vehicle_count(), 2);
}

#[test]
fn test_fire_spawns_projectile() {
    let (data, state) = two_fighters(400.0);
    let next = simulation::tick(&state, &data, &controls(true, false), TICK_LENGTH).unwrap();
    assert_eq!(next.projectiles(0).len(), 1);
    assert_eq!(next.projectiles(1).len(), 0);
    assert_eq!(next.vehicle(0).unwrap().gun.next_barrel, 1);

    let projectile = next.projectiles(0)[0];
    assert!(projectile.velocity.x > 0.0);
    assert!(projectile.position.x > next.vehicle(0).unwrap().transform.position().x);
}

#[test]
fn test_projectile_hits_opponent() {
    let (data, mut state) = two_fighters(300.0);
    let mut hits = 0;
    let mut fired = false;
    for _ in 0..120 {
        state = simulation::tick(&state, &data, &controls(!fired, false), TICK_LENGTH).unwrap();
        fired = true;
        hits += state.hits(1);
        assert_eq!(state.hits(0), 0);
    }
    assert_eq!(hits, 1);
    assert_eq!(state.projectiles(0).len(), 0);
}

#[test]
fn test_projectile_leaves_arena() {
    let mut data = SimulationData::new(Arena::new(400.0, 400.0));
    data.register(0, Arc::new(vehicle::fighter()));
    let mut state = SimulationState::new();
    state.insert_vehicle(
        0,
        VehicleState::at_rest(DynamicTransform::at_rest(vector![200.0, 200.0], 0.0)),
    );
    let mut inputs = ControlInputs::new();
    inputs.insert(0, VehicleControls::new(DriveControls::NEUTRAL, true));
    state = simulation::tick(&state, &data, &inputs, TICK_LENGTH).unwrap();
    assert_eq!(state.projectiles(0).len(), 1);

    inputs.insert(0, VehicleControls::drive_only(DriveControls::NEUTRAL));
    for _ in 0..60 {
        state = simulation::tick(&state, &data, &inputs, TICK_LENGTH).unwrap();
    }
    assert_eq!(state.projectiles(0).len(), 0);
}

#[test]
fn test_own_projectiles_never_hit_owner() {
    let (data, mut state) = two_fighters(400.0);
    let owner: VehicleId = 0;
    let position = state.vehicle(owner).unwrap().transform.position();
    state
        .push_projectile(owner, DynamicPosition::new(position, vector![10.0, 0.0]))
        .unwrap();
    let next = simulation::tick(&state, &data, &controls(false, false), TICK_LENGTH).unwrap();
    assert_eq!(next.total_hits(), 0);
    assert_eq!(next.projectiles(owner).len(), 1);
}

#[test]
fn test_wall_bounce() {
    let mut data = SimulationData::new(Arena::new(400.0, 400.0));
    data.register(0, Arc::new(vehicle::fighter()));
    let mut state = SimulationState::new();
    let transform = DynamicTransform::new(
        DynamicPosition::new(vector![20.0, 200.0], vector![-150.0, 0.0]),
        0.0.into(),
        0.0,
    );
    state.insert_vehicle(0, VehicleState::at_rest(transform));
    let mut inputs = ControlInputs::new();
    inputs.insert(0, VehicleControls::default());

    for _ in 0..30 {
        state = simulation::tick(&state, &data, &inputs, TICK_LENGTH).unwrap();
    }
    let vehicle = state.vehicle(0).unwrap();
    assert_abs_diff_eq!(vehicle.transform.velocity().x, 150.0, epsilon = 1e-9);
    assert!(vehicle.transform.position().x > vehicle::FIGHTER_RADIUS);
}

#[test]
fn test_unknown_vehicle() {
    let (data, state) = two_fighters(400.0);
    let mut inputs = controls(false, false);
    inputs.remove(&1);
    assert_eq!(
        simulation::tick(&state, &data, &inputs, TICK_LENGTH),
        Err(Error::UnknownVehicleId(1))
    );

    let empty = SimulationData::new(Arena::default());
    assert_eq!(
        simulation::tick(&state, &empty, &controls(false, false), TICK_LENGTH),
        Err(Error::UnknownVehicleId(0))
    );
    assert_eq!(state.vehicle(7).err(), Some(Error::UnknownVehicleId(7)));
}

#[test]
fn test_deterministic() {
    let run = || {
        let (data, mut state) = two_fighters(500.0);
        let mut inputs = ControlInputs::new();
        inputs.insert(0, VehicleControls::new(DriveControls::new(0.0, 0.7, 0.2), true));
        inputs.insert(1, VehicleControls::new(DriveControls::new(0.0, 0.3, -0.4), true));
        for _ in 0..300 {
            state = simulation::tick(&state, &data, &inputs, TICK_LENGTH).unwrap();
        }
        state.hash()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_hash_covers_projectile_velocity() {
    let (_, mut a) = two_fighters(500.0);
    let mut b = a.clone();
    a.push_projectile(0, DynamicPosition::new(vector![10.0, 0.0], vector![450.0, 0.0]))
        .unwrap();
    b.push_projectile(0, DynamicPosition::new(vector![10.0, 0.0], vector![450.0, 30.0]))
        .unwrap();
    assert_ne!(a.hash(), b.hash());
}

#[test]
fn test_snapshot_serializes() {
    let (data, state) = two_fighters(400.0);
    let next = simulation::tick(&state, &data, &controls(true, true), TICK_LENGTH).unwrap();
    let json = serde_json::to_string(&next).unwrap();
    let back: SimulationState = serde_json::from_str(&json).unwrap();
    assert_eq!(back.vehicle_count(), 2);
    assert_eq!(back.projectile_count(), 2);
    for (id, vehicle) in next.vehicles() {
        let restored = back.vehicle(id).unwrap();
        assert_eq!(restored.gun.next_barrel, vehicle.gun.next_barrel);
        assert_abs_diff_eq!(
            restored.transform.position().x,
            vehicle.transform.position().x,
            epsilon = 1e-9
        );
    }
}
