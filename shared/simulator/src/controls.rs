use crate::error::Error;
use serde::{Deserialize, Serialize};

pub const AXIS_COUNT: usize = 3;
pub const AXIS_LATERAL: usize = 0;
pub const AXIS_THRUST: usize = 1;
pub const AXIS_ROTATION: usize = 2;

/// Per-axis drive input. Every axis is clamped to `[-1, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveControls {
    axes: [f64; AXIS_COUNT],
}

impl DriveControls {
    pub const NEUTRAL: DriveControls = DriveControls {
        axes: [0.0; AXIS_COUNT],
    };

    pub fn new(lateral: f64, thrust: f64, rotation: f64) -> Self {
        Self::from_axes([lateral, thrust, rotation])
    }

    pub fn from_axes(axes: [f64; AXIS_COUNT]) -> Self {
        Self {
            axes: axes.map(clamp_axis),
        }
    }

    pub fn axis(&self, index: usize) -> f64 {
        self.axes[index]
    }

    pub fn axes(&self) -> [f64; AXIS_COUNT] {
        self.axes
    }

    pub fn lateral(&self) -> f64 {
        self.axes[AXIS_LATERAL]
    }

    pub fn thrust(&self) -> f64 {
        self.axes[AXIS_THRUST]
    }

    pub fn rotation(&self) -> f64 {
        self.axes[AXIS_ROTATION]
    }

    pub fn norm_squared(&self) -> f64 {
        self.axes.iter().map(|a| a * a).sum()
    }

    fn is_finite(&self) -> bool {
        self.axes.iter().all(|a| a.is_finite())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleControls {
    pub drive: DriveControls,
    pub trigger: bool,
}

impl VehicleControls {
    pub fn new(drive: DriveControls, trigger: bool) -> Self {
        Self { drive, trigger }
    }

    pub fn drive_only(drive: DriveControls) -> Self {
        Self::new(drive, false)
    }
}

/// Continuous human input, already mapped from whatever device produced it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    pub horizontal: f64,
    pub vertical: f64,
    pub rotation: f64,
    pub trigger: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlSpaceConfig {
    /// Maximum change per second of each axis. Zero freezes the axis.
    pub rates_of_change: [f64; AXIS_COUNT],
    pub default_control: DriveControls,
}

impl ControlSpaceConfig {
    pub fn new(rates_of_change: [f64; AXIS_COUNT], default_control: DriveControls) -> Self {
        Self {
            rates_of_change,
            default_control,
        }
    }

    pub fn is_frozen(&self, axis: usize) -> bool {
        self.rates_of_change[axis] == 0.0
    }
}

/// A validated control configuration together with the axis step patterns it
/// permits. Patterns are computed once when the archetype is built.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlSpace {
    config: ControlSpaceConfig,
    steps: Vec<[i8; AXIS_COUNT]>,
}

impl ControlSpace {
    pub fn new(config: ControlSpaceConfig) -> Result<Self, Error> {
        for (axis, rate) in config.rates_of_change.iter().enumerate() {
            if !rate.is_finite() || *rate < 0.0 {
                return Err(Error::InvalidControlSpace(format!(
                    "axis {axis} has rate of change {rate}"
                )));
            }
        }
        if !config.default_control.is_finite() {
            return Err(Error::InvalidControlSpace(
                "default control is not finite".to_string(),
            ));
        }

        let mut steps = vec![[0i8; AXIS_COUNT]];
        for axis in 0..AXIS_COUNT {
            if config.is_frozen(axis) {
                continue;
            }
            steps = steps
                .into_iter()
                .flat_map(|pattern| {
                    [-1i8, 0, 1].into_iter().map(move |step| {
                        let mut pattern = pattern;
                        pattern[axis] = step;
                        pattern
                    })
                })
                .collect();
        }

        Ok(Self { config, steps })
    }

    pub fn config(&self) -> &ControlSpaceConfig {
        &self.config
    }

    pub fn default_control(&self) -> DriveControls {
        self.config.default_control
    }

    /// Upper bound on the number of options `enumerate` can produce.
    pub fn branching_factor(&self) -> usize {
        self.steps.len()
    }

    pub fn enumerate(&self, current: &DriveControls, dt: f64) -> Vec<DriveControls> {
        let mut options = Vec::with_capacity(self.steps.len());
        self.enumerate_into(current, dt, &mut options);
        options
    }

    /// Appends every control reachable from `current` within one tick.
    ///
    /// A step that clamps back onto the current axis value duplicates the
    /// "no change" branch and is skipped.
    pub fn enumerate_into(&self, current: &DriveControls, dt: f64, out: &mut Vec<DriveControls>) {
        'patterns: for pattern in self.steps.iter() {
            let mut axes = current.axes;
            for axis in 0..AXIS_COUNT {
                let step = pattern[axis];
                if step == 0 {
                    continue;
                }
                let rate = self.config.rates_of_change[axis];
                let value = clamp_axis(current.axes[axis] + step as f64 * rate * dt);
                if value == current.axes[axis] {
                    continue 'patterns;
                }
                axes[axis] = value;
            }
            let candidate = DriveControls { axes };
            if candidate.is_finite() {
                out.push(candidate);
            }
        }
    }

    /// Like `enumerate`, but an empty result is a configuration error.
    pub fn options(&self, current: &DriveControls, dt: f64) -> Result<Vec<DriveControls>, Error> {
        let options = self.enumerate(current, dt);
        if options.is_empty() {
            return Err(Error::EmptyControlSpace);
        }
        Ok(options)
    }

    pub fn from_player_input(
        &self,
        current: &DriveControls,
        input: &PlayerInput,
        dt: f64,
    ) -> DriveControls {
        let rates = self.config.rates_of_change;
        DriveControls::new(
            current.lateral() + dt * rates[AXIS_LATERAL] * input.horizontal,
            current.thrust() + dt * rates[AXIS_THRUST] * input.vertical,
            current.rotation() + dt * rates[AXIS_ROTATION] * input.rotation,
        )
    }
}

fn clamp_axis(value: f64) -> f64 {
    value.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_axes_clamped() {
        let c = DriveControls::new(2.0, -3.0, 0.5);
        assert_eq!(c.axes(), [1.0, -1.0, 0.5]);
    }

    #[test]
    fn test_negative_rate_rejected() {
        let config = ControlSpaceConfig::new([0.0, -1.0, 1.0], DriveControls::NEUTRAL);
        assert!(matches!(
            ControlSpace::new(config),
            Err(Error::InvalidControlSpace(_))
        ));
    }

    #[test]
    fn test_step_patterns() {
        let config = ControlSpaceConfig::new([0.0, 1.0, 1.0], DriveControls::NEUTRAL);
        let space = ControlSpace::new(config).unwrap();
        assert_eq!(space.branching_factor(), 9);
        assert!(space.steps.iter().all(|p| p[AXIS_LATERAL] == 0));
    }
}
