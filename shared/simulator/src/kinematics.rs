use crate::controls::DriveControls;
use crate::geometry::{DynamicPosition, DynamicTransform, Vec2};
use nalgebra::vector;
use serde::{Deserialize, Serialize};

/// Classic thrust-and-turn drive: axis 1 pushes along the facing, axis 2 turns.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AsteroidsDrive {
    pub acceleration: f64,
    pub max_speed: f64,
    pub angular_acceleration: f64,
    pub max_angular_speed: f64,
}

/// Asteroids drive plus strafing thrust on axis 0.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HoverDrive {
    pub forward_acceleration: f64,
    pub lateral_acceleration: f64,
    pub max_speed: f64,
    pub angular_acceleration: f64,
    pub max_angular_speed: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum DriveModel {
    Asteroids(AsteroidsDrive),
    Hover(HoverDrive),
}

impl DriveModel {
    pub fn drive(
        &self,
        transform: &DynamicTransform,
        controls: &DriveControls,
        dt: f64,
    ) -> DynamicTransform {
        if dt <= 0.0 {
            return *transform;
        }
        match self {
            DriveModel::Asteroids(data) => {
                let thrust = transform.facing() * (data.acceleration * controls.thrust());
                integrate(
                    transform,
                    thrust,
                    data.max_speed,
                    controls.rotation() * data.angular_acceleration,
                    data.max_angular_speed,
                    dt,
                )
            }
            DriveModel::Hover(data) => {
                let local = vector![
                    data.forward_acceleration * controls.thrust(),
                    data.lateral_acceleration * controls.lateral()
                ];
                let thrust = transform.orientation.rotate(local);
                integrate(
                    transform,
                    thrust,
                    data.max_speed,
                    controls.rotation() * data.angular_acceleration,
                    data.max_angular_speed,
                    dt,
                )
            }
        }
    }

    pub fn max_speed(&self) -> f64 {
        match self {
            DriveModel::Asteroids(data) => data.max_speed,
            DriveModel::Hover(data) => data.max_speed,
        }
    }

    pub fn max_angular_speed(&self) -> f64 {
        match self {
            DriveModel::Asteroids(data) => data.max_angular_speed,
            DriveModel::Hover(data) => data.max_angular_speed,
        }
    }
}

fn integrate(
    transform: &DynamicTransform,
    thrust: Vec2,
    max_speed: f64,
    angular_acceleration: f64,
    max_angular_speed: f64,
    dt: f64,
) -> DynamicTransform {
    let dynamic_position = integrate_linear(&transform.dynamic_position, thrust, max_speed, dt);

    let angular_velocity = transform.angular_velocity;
    let applied_angular_acceleration = if angular_acceleration == 0.0 {
        // No rotation input: stop the spin exactly within this tick.
        -angular_velocity / dt
    } else {
        let intended = angular_velocity + angular_acceleration * dt;
        let clamped = intended.clamp(-max_angular_speed, max_angular_speed);
        (clamped - angular_velocity) / dt
    };
    let new_angular_velocity = if angular_acceleration == 0.0 {
        0.0
    } else {
        angular_velocity + applied_angular_acceleration * dt
    };
    let rotated = angular_velocity * dt + 0.5 * applied_angular_acceleration * dt * dt;

    DynamicTransform::new(
        dynamic_position,
        transform.orientation.rotated_by(rotated),
        new_angular_velocity,
    )
}

/// Parabolic integration under constant thrust. When the speed cap kicks in the
/// thrust is re-derived from the clamped velocity so position stays consistent.
fn integrate_linear(
    state: &DynamicPosition,
    thrust: Vec2,
    max_speed: f64,
    dt: f64,
) -> DynamicPosition {
    let mut applied = thrust;
    let mut velocity = state.velocity + applied * dt;
    if velocity.norm_squared() > max_speed * max_speed {
        velocity = velocity.normalize() * max_speed;
        applied = (velocity - state.velocity) / dt;
    }
    let position = state.position + state.velocity * dt + applied * (0.5 * dt * dt);
    DynamicPosition::new(position, velocity)
}
