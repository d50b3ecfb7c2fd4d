use crate::controls::{ControlSpace, ControlSpaceConfig, DriveControls, VehicleControls};
use crate::error::Error;
use crate::geometry::DynamicTransform;
use crate::gun::{GunData, GunMount, GunState};
use crate::kinematics::{AsteroidsDrive, DriveModel, HoverDrive};
use nalgebra::vector;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::sync::Arc;

pub type VehicleId = u32;

/// Immutable archetype shared by every vehicle built from it.
#[derive(Clone, Debug)]
pub struct VehiclePrototype {
    pub radius: f64,
    pub drive: DriveModel,
    pub controls: ControlSpace,
    pub guns: Arc<GunMount>,
}

impl VehiclePrototype {
    pub fn new(
        radius: f64,
        drive: DriveModel,
        controls: ControlSpaceConfig,
        guns: Arc<GunMount>,
    ) -> Result<Self, Error> {
        Ok(Self {
            radius,
            drive,
            controls: ControlSpace::new(controls)?,
            guns,
        })
    }

    pub fn gun(&self) -> &GunData {
        self.guns.gun()
    }

    /// Applies one tick of drive input and returns the resulting vehicle state.
    /// The gun only cools down; the trigger is not considered.
    pub fn drive_state(
        &self,
        state: &VehicleState,
        controls: &DriveControls,
        dt: f64,
    ) -> VehicleState {
        let transform = self.drive.drive(&state.transform, controls, dt);
        let (gun, _) = self.guns.advance(&state.gun, false, dt);
        VehicleState::new(transform, *controls, gun)
    }

    pub fn neutral_controls(&self) -> VehicleControls {
        VehicleControls::drive_only(self.controls.default_control())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub transform: DynamicTransform,
    pub controls: DriveControls,
    pub gun: GunState,
}

impl VehicleState {
    pub fn new(transform: DynamicTransform, controls: DriveControls, gun: GunState) -> Self {
        Self {
            transform,
            controls,
            gun,
        }
    }

    pub fn at_rest(transform: DynamicTransform) -> Self {
        Self::new(transform, DriveControls::NEUTRAL, GunState::default())
    }
}

pub const FIGHTER_RADIUS: f64 = 15.0;

pub fn twin_cannon() -> GunMount {
    GunMount::new(
        GunData {
            shot_speed: 450.0,
            reload_interval: 0.5,
        },
        vec![vector![FIGHTER_RADIUS + 2.0, 5.0], vector![FIGHTER_RADIUS + 2.0, -5.0]],
    )
    .expect("twin cannon has barrels")
}

pub fn fighter() -> VehiclePrototype {
    VehiclePrototype::new(
        FIGHTER_RADIUS,
        DriveModel::Asteroids(AsteroidsDrive {
            acceleration: 120.0,
            max_speed: 200.0,
            angular_acceleration: 8.0,
            max_angular_speed: TAU / 2.0,
        }),
        ControlSpaceConfig::new([0.0, 4.0, 6.0], DriveControls::NEUTRAL),
        Arc::new(twin_cannon()),
    )
    .expect("fighter control space is valid")
}

pub fn hover() -> VehiclePrototype {
    VehiclePrototype::new(
        FIGHTER_RADIUS,
        DriveModel::Hover(HoverDrive {
            forward_acceleration: 100.0,
            lateral_acceleration: 60.0,
            max_speed: 160.0,
            angular_acceleration: 6.0,
            max_angular_speed: TAU / 3.0,
        }),
        ControlSpaceConfig::new([3.0, 3.0, 5.0], DriveControls::NEUTRAL),
        Arc::new(twin_cannon()),
    )
    .expect("hover control space is valid")
}
