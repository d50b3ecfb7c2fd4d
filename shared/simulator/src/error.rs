use crate::vehicle::VehicleId;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown vehicle id {0}")]
    UnknownVehicleId(VehicleId),

    #[error("control space has no reachable options")]
    EmptyControlSpace,

    #[error("invalid control space: {0}")]
    InvalidControlSpace(String),

    #[error("invalid gun mount: {0}")]
    InvalidGunMount(String),
}
