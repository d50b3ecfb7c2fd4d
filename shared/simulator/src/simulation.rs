use crate::arena::{Arena, DEFAULT_BOUNCE_FACTOR};
use crate::controls::VehicleControls;
use crate::error::Error;
use crate::geometry::DynamicPosition;
use crate::gun;
use crate::vehicle::{VehicleId, VehiclePrototype, VehicleState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const TICK_LENGTH: f64 = 1.0 / 60.0;

pub type ControlInputs = BTreeMap<VehicleId, VehicleControls>;

/// Read-only world setup: arena bounds and the archetype of every vehicle id.
#[derive(Clone, Debug)]
pub struct SimulationData {
    pub arena: Arena,
    pub bounce_factor: f64,
    prototypes: BTreeMap<VehicleId, Arc<VehiclePrototype>>,
}

impl SimulationData {
    pub fn new(arena: Arena) -> Self {
        Self {
            arena,
            bounce_factor: DEFAULT_BOUNCE_FACTOR,
            prototypes: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, id: VehicleId, prototype: Arc<VehiclePrototype>) {
        if self.prototypes.insert(id, prototype).is_some() {
            log::warn!("vehicle {id} re-registered, replacing its prototype");
        }
    }

    pub fn prototype(&self, id: VehicleId) -> Result<&VehiclePrototype, Error> {
        self.prototypes
            .get(&id)
            .map(|p| p.as_ref())
            .ok_or(Error::UnknownVehicleId(id))
    }

    pub fn vehicle_ids(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.prototypes.keys().copied()
    }
}

/// Immutable point-in-time record of every vehicle and projectile.
///
/// Every vehicle always owns a projectile list, possibly empty. Hit counters
/// hold the hits each vehicle took during the tick that produced the snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    vehicles: BTreeMap<VehicleId, VehicleState>,
    projectiles: BTreeMap<VehicleId, Vec<DynamicPosition>>,
    hits: BTreeMap<VehicleId, u32>,
}

impl SimulationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_vehicle(&mut self, id: VehicleId, state: VehicleState) {
        self.vehicles.insert(id, state);
        self.projectiles.entry(id).or_default();
    }

    pub fn set_projectiles(
        &mut self,
        id: VehicleId,
        projectiles: Vec<DynamicPosition>,
    ) -> Result<(), Error> {
        if !self.vehicles.contains_key(&id) {
            return Err(Error::UnknownVehicleId(id));
        }
        self.projectiles.insert(id, projectiles);
        Ok(())
    }

    pub fn push_projectile(
        &mut self,
        id: VehicleId,
        projectile: DynamicPosition,
    ) -> Result<(), Error> {
        match self.projectiles.get_mut(&id) {
            Some(list) if self.vehicles.contains_key(&id) => {
                list.push(projectile);
                Ok(())
            }
            _ => Err(Error::UnknownVehicleId(id)),
        }
    }

    pub fn vehicle(&self, id: VehicleId) -> Result<&VehicleState, Error> {
        self.vehicles.get(&id).ok_or(Error::UnknownVehicleId(id))
    }

    pub fn vehicles(&self) -> impl Iterator<Item = (VehicleId, &VehicleState)> {
        self.vehicles.iter().map(|(id, state)| (*id, state))
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    pub fn projectiles(&self, owner: VehicleId) -> &[DynamicPosition] {
        self.projectiles
            .get(&owner)
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }

    pub fn projectile_count(&self) -> usize {
        self.projectiles.values().map(|list| list.len()).sum()
    }

    pub fn hits(&self, id: VehicleId) -> u32 {
        self.hits.get(&id).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> u32 {
        self.hits.values().sum()
    }

    pub fn hash(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::Hasher;
        let fixedpoint = |v: f64| (v * 1e9) as i64;
        let mut s = DefaultHasher::new();
        for (id, vehicle) in self.vehicles.iter() {
            let transform = &vehicle.transform;
            s.write_u32(*id);
            s.write_i64(fixedpoint(transform.position().x));
            s.write_i64(fixedpoint(transform.position().y));
            s.write_i64(fixedpoint(transform.velocity().x));
            s.write_i64(fixedpoint(transform.velocity().y));
            s.write_i64(fixedpoint(transform.orientation.angle()));
            s.write_i64(fixedpoint(transform.angular_velocity));
            for axis in vehicle.controls.axes() {
                s.write_i64(fixedpoint(axis));
            }
            s.write_usize(vehicle.gun.next_barrel);
            s.write_i64(fixedpoint(vehicle.gun.time_to_next_shot));
        }
        for (owner, list) in self.projectiles.iter() {
            s.write_u32(*owner);
            for projectile in list {
                s.write_i64(fixedpoint(projectile.position.x));
                s.write_i64(fixedpoint(projectile.position.y));
                s.write_i64(fixedpoint(projectile.velocity.x));
                s.write_i64(fixedpoint(projectile.velocity.y));
            }
        }
        for (id, hits) in self.hits.iter() {
            s.write_u32(*id);
            s.write_u32(*hits);
        }
        s.finish()
    }
}

/// Advances `state` by `dt` and returns the next snapshot.
///
/// Every vehicle in `state` needs a prototype in `data` and an entry in
/// `controls`.
pub fn tick(
    state: &SimulationState,
    data: &SimulationData,
    controls: &ControlInputs,
    dt: f64,
) -> Result<SimulationState, Error> {
    let mut next = SimulationState {
        vehicles: BTreeMap::new(),
        projectiles: state.projectiles.clone(),
        hits: BTreeMap::new(),
    };
    let mut bodies = Vec::with_capacity(state.vehicles.len());

    for (&id, vehicle) in state.vehicles.iter() {
        let prototype = data.prototype(id)?;
        let input = controls.get(&id).ok_or(Error::UnknownVehicleId(id))?;

        let transform = prototype.drive.drive(&vehicle.transform, &input.drive, dt);
        let transform = data
            .arena
            .resolve_collision(&transform, prototype.radius, data.bounce_factor);

        let (gun_state, fired) = prototype.guns.advance(&vehicle.gun, input.trigger, dt);
        let projectiles = next.projectiles.entry(id).or_default();
        if let Some(barrel) = fired {
            projectiles.push(prototype.guns.spawn_projectile(&transform, barrel));
        }

        next.vehicles.insert(id, VehicleState::new(transform, input.drive, gun_state));
        next.hits.insert(id, 0);
        bodies.push((id, transform.dynamic_position, prototype.radius));
    }

    let arena = &data.arena;
    let hits = &mut next.hits;
    for (&owner, projectiles) in next.projectiles.iter_mut() {
        projectiles.retain_mut(|projectile| {
            let current = *projectile;
            let target = bodies.iter().find(|(id, body, radius)| {
                *id != owner && gun::intercept(body, *radius, &current, dt)
            });
            if let Some((id, _, _)) = target {
                log::trace!("projectile from {owner} hit {id}");
                *hits.entry(*id).or_default() += 1;
                return false;
            }
            *projectile = current.advanced(dt);
            arena.contains(projectile.position)
        });
    }

    Ok(next)
}
