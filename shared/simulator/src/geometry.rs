use nalgebra::{vector, Vector2};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

pub type Vec2 = Vector2<f64>;

/// Heading angle, always normalized into `[0, TAU)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Orientation {
    angle: f64,
}

impl Orientation {
    pub fn new(angle: f64) -> Self {
        let angle = angle.rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs.
        let angle = if angle >= TAU { 0.0 } else { angle };
        Self { angle }
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn facing(&self) -> Vec2 {
        vector![self.angle.cos(), self.angle.sin()]
    }

    pub fn rotated_by(&self, angle: f64) -> Self {
        Self::new(self.angle + angle)
    }

    /// Maps a local-space vector (x forward, y left) into world space.
    pub fn rotate(&self, local: Vec2) -> Vec2 {
        let (sin, cos) = self.angle.sin_cos();
        vector![cos * local.x - sin * local.y, sin * local.x + cos * local.y]
    }

    /// Signed smallest rotation taking this heading onto `other`, in `(-PI, PI]`.
    pub fn angle_to(&self, other: Orientation) -> f64 {
        let diff = (other.angle - self.angle).rem_euclid(TAU);
        if diff > std::f64::consts::PI {
            diff - TAU
        } else {
            diff
        }
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl From<f64> for Orientation {
    fn from(angle: f64) -> Self {
        Self::new(angle)
    }
}

impl From<Orientation> for f64 {
    fn from(orientation: Orientation) -> f64 {
        orientation.angle
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicPosition {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl DynamicPosition {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self { position, velocity }
    }

    pub fn stationary(position: Vec2) -> Self {
        Self::new(position, Vec2::zeros())
    }

    pub fn advanced(&self, dt: f64) -> Self {
        Self::new(self.position + self.velocity * dt, self.velocity)
    }
}

/// Full rigid-body state of a vehicle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicTransform {
    pub dynamic_position: DynamicPosition,
    pub orientation: Orientation,
    pub angular_velocity: f64,
}

impl DynamicTransform {
    pub fn new(
        dynamic_position: DynamicPosition,
        orientation: Orientation,
        angular_velocity: f64,
    ) -> Self {
        Self {
            dynamic_position,
            orientation,
            angular_velocity,
        }
    }

    pub fn at_rest(position: Vec2, heading: f64) -> Self {
        Self::new(
            DynamicPosition::stationary(position),
            Orientation::new(heading),
            0.0,
        )
    }

    pub fn position(&self) -> Vec2 {
        self.dynamic_position.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.dynamic_position.velocity
    }

    pub fn facing(&self) -> Vec2 {
        self.orientation.facing()
    }

    /// Heading error towards `point`, in `[0, PI]`.
    pub fn bearing_error(&self, point: Vec2) -> f64 {
        let delta = point - self.position();
        if delta.norm_squared() == 0.0 {
            return 0.0;
        }
        let bearing = Orientation::new(delta.y.atan2(delta.x));
        self.orientation.angle_to(bearing).abs()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_orientation_normalized() {
        assert_abs_diff_eq!(Orientation::new(-PI / 2.0).angle(), 1.5 * PI, epsilon = 1e-12);
        assert_abs_diff_eq!(Orientation::new(5.0 * PI).angle(), PI, epsilon = 1e-12);
        assert!(Orientation::new(-1e-20).angle() < TAU);
    }

    #[test]
    fn test_rotate_local_offset() {
        let o = Orientation::new(PI / 2.0);
        let v = o.rotate(vector![10.0, 0.0]);
        assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(v.y, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(o.facing().y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_angle_to() {
        let a = Orientation::new(0.1);
        let b = Orientation::new(TAU - 0.1);
        assert_abs_diff_eq!(a.angle_to(b), -0.2, epsilon = 1e-9);
        assert_abs_diff_eq!(b.angle_to(a), 0.2, epsilon = 1e-9);
    }

    #[test]
    fn test_bearing_error() {
        let t = DynamicTransform::at_rest(vector![0.0, 0.0], 0.0);
        assert_abs_diff_eq!(t.bearing_error(vector![100.0, 0.0]), 0.0);
        assert_abs_diff_eq!(t.bearing_error(vector![0.0, 100.0]), PI / 2.0, epsilon = 1e-12);
    }
}
