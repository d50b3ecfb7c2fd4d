use crate::error::Error;
use crate::geometry::{DynamicPosition, DynamicTransform, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GunData {
    pub shot_speed: f64,
    /// Time for the whole mount to cycle once through every barrel.
    pub reload_interval: f64,
}

/// A gun with one or more barrels. Deserialization goes through
/// [`GunMount::new`], so a mount always has at least one barrel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGunMount")]
pub struct GunMount {
    gun: GunData,
    barrel_offsets: Vec<Vec2>,
}

#[derive(Deserialize)]
struct RawGunMount {
    gun: GunData,
    barrel_offsets: Vec<Vec2>,
}

impl TryFrom<RawGunMount> for GunMount {
    type Error = Error;

    fn try_from(raw: RawGunMount) -> Result<Self, Error> {
        GunMount::new(raw.gun, raw.barrel_offsets)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GunState {
    pub next_barrel: usize,
    pub time_to_next_shot: f64,
}

impl GunMount {
    pub fn new(gun: GunData, barrel_offsets: Vec<Vec2>) -> Result<Self, Error> {
        if barrel_offsets.is_empty() {
            return Err(Error::InvalidGunMount("no barrels".to_string()));
        }
        let reload_ok = gun.reload_interval.is_finite() && gun.reload_interval >= 0.0;
        if !reload_ok || !gun.shot_speed.is_finite() {
            return Err(Error::InvalidGunMount(format!("bad gun data {gun:?}")));
        }
        Ok(Self {
            gun,
            barrel_offsets,
        })
    }

    pub fn gun(&self) -> &GunData {
        &self.gun
    }

    pub fn barrel_count(&self) -> usize {
        self.barrel_offsets.len()
    }

    pub fn barrel_offset(&self, barrel: usize) -> Vec2 {
        self.barrel_offsets[barrel % self.barrel_offsets.len()]
    }

    /// Cooldown between consecutive shots of the mount.
    pub fn cooldown(&self) -> f64 {
        self.gun.reload_interval / self.barrel_count() as f64
    }

    /// Advances the cooldown by `dt`. Returns the new state and the barrel that
    /// fired, if any.
    pub fn advance(&self, state: &GunState, trigger: bool, dt: f64) -> (GunState, Option<usize>) {
        let mut time_to_next_shot = (state.time_to_next_shot - dt).max(0.0);
        // Rounding residue from repeated subtraction must not cost a tick.
        if time_to_next_shot <= dt * 1e-9 {
            time_to_next_shot = 0.0;
        }
        if trigger && time_to_next_shot == 0.0 {
            let fired = state.next_barrel % self.barrel_count();
            let next = GunState {
                next_barrel: (fired + 1) % self.barrel_count(),
                time_to_next_shot: self.cooldown(),
            };
            (next, Some(fired))
        } else {
            let next = GunState {
                next_barrel: state.next_barrel,
                time_to_next_shot,
            };
            (next, None)
        }
    }

    pub fn spawn_projectile(
        &self,
        transform: &DynamicTransform,
        barrel: usize,
    ) -> DynamicPosition {
        let offset = transform.orientation.rotate(self.barrel_offset(barrel));
        DynamicPosition::new(
            transform.position() + offset,
            transform.velocity() + transform.facing() * self.gun.shot_speed,
        )
    }
}

/// Whether `projectile` passes within `radius` of the vehicle during the next
/// `dt` seconds, assuming both keep their current velocities.
///
/// Testing the closest approach rather than the end positions stops fast
/// projectiles from tunnelling through a vehicle within one tick.
pub fn intercept(
    vehicle: &DynamicPosition,
    radius: f64,
    projectile: &DynamicPosition,
    dt: f64,
) -> bool {
    let dp = projectile.position - vehicle.position;
    let dv = projectile.velocity - vehicle.velocity;
    let radius_sq = radius * radius;
    let closing = dp.dot(&dv);
    let speed_sq = dv.norm_squared();
    if closing >= 0.0 || speed_sq == 0.0 {
        return dp.norm_squared() <= radius_sq;
    }
    let t = (-closing / speed_sq).clamp(0.0, dt.max(0.0));
    (dp + dv * t).norm_squared() <= radius_sq
}
