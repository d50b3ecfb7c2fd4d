//! Closed-form estimate of how close a shot would pass to a moving target.

use crate::geometry::{DynamicPosition, DynamicTransform};
use crate::gun::GunData;

/// Squared miss distance of a shot fired right now along the shooter's facing
/// against a target that keeps its current velocity.
pub fn miss_distance_sq(
    shooter: &DynamicTransform,
    gun: &GunData,
    target: &DynamicPosition,
) -> f64 {
    let shot = DynamicPosition::new(
        shooter.position(),
        shooter.velocity() + shooter.facing() * gun.shot_speed,
    );
    projectile_miss_distance_sq(&shot, target)
}

/// Minimum squared distance between a projectile and a linearly extrapolated
/// target.
///
/// When closest approach lies in the past the target is outrunning the shot;
/// the result then grows with how far back the shot would have had to be fired.
pub fn projectile_miss_distance_sq(
    projectile: &DynamicPosition,
    target: &DynamicPosition,
) -> f64 {
    let dp = target.position - projectile.position;
    let dv = target.velocity - projectile.velocity;
    let distance_sq = dp.norm_squared();
    let speed_sq = dv.norm_squared();
    if speed_sq == 0.0 {
        return distance_sq;
    }
    let dot = dp.dot(&dv);
    let t = -dot / speed_sq;
    if t < 0.0 {
        return distance_sq + t * t * speed_sq;
    }
    (distance_sq + t * (2.0 * dot + t * speed_sq)).max(0.0)
}
