pub mod arena;
pub mod controls;
pub mod error;
pub mod geometry;
pub mod gun;
pub mod kinematics;
pub mod rng;
pub mod scenario;
pub mod shot;
pub mod simulation;
pub mod vehicle;

pub use error::Error;
pub use vehicle::VehicleId;
