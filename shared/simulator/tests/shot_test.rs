use approx::assert_abs_diff_eq;
use mts_simulator::geometry::{DynamicPosition, DynamicTransform};
use mts_simulator::gun::GunData;
use mts_simulator::shot::{miss_distance_sq, projectile_miss_distance_sq};
use nalgebra::vector;
use rand::Rng;
use std::f64::consts::PI;
use test_log::test;

const GUN: GunData = GunData {
    shot_speed: 500.0,
    reload_interval: 0.5,
};

#[test]
fn test_aimed_shot_at_stationary_target() {
    let shooter = DynamicTransform::at_rest(vector![0.0, 0.0], 0.0);
    let target = DynamicPosition::stationary(vector![300.0, 0.0]);
    assert_abs_diff_eq!(miss_distance_sq(&shooter, &GUN, &target), 0.0, epsilon = 1e-9);
}

#[test]
fn test_perpendicular_offset() {
    let shooter = DynamicTransform::at_rest(vector![0.0, 0.0], 0.0);
    let target = DynamicPosition::stationary(vector![300.0, 40.0]);
    assert_abs_diff_eq!(miss_distance_sq(&shooter, &GUN, &target), 1600.0, epsilon = 1e-6);
}

#[test]
fn test_shot_away_from_target() {
    // Facing directly away: closest approach is now, plus the backward penalty.
    let shooter = DynamicTransform::at_rest(vector![0.0, 0.0], PI);
    let target = DynamicPosition::stationary(vector![100.0, 0.0]);
    let miss = miss_distance_sq(&shooter, &GUN, &target);
    // t* = -0.2, |dv|^2 = 250000 -> 10000 + 0.04 * 250000
    assert_abs_diff_eq!(miss, 20000.0, epsilon = 1e-6);
}

#[test]
fn test_matched_velocity_is_current_distance() {
    let projectile = DynamicPosition::new(vector![0.0, 0.0], vector![30.0, -10.0]);
    let target = DynamicPosition::new(vector![3.0, 4.0], vector![30.0, -10.0]);
    assert_abs_diff_eq!(projectile_miss_distance_sq(&projectile, &target), 25.0);
}

#[test]
fn test_never_negative() {
    let mut rng = mts_simulator::rng::new_rng(3);
    for _ in 0..1000 {
        let mut random = || vector![rng.gen_range(-500.0..500.0), rng.gen_range(-500.0..500.0)];
        let projectile = DynamicPosition::new(random(), random());
        let target = DynamicPosition::new(random(), random());
        let miss = projectile_miss_distance_sq(&projectile, &target);
        assert!(miss >= 0.0);
        assert!(miss.is_finite());
    }
}
