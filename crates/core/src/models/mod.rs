//! Vehicle domain model.

pub mod capability;
mod vehicle;

pub use capability::{
    Capability, CapabilitySet, CargoHold, FuelTank, PassengerCabin, ServiceRecord,
    MAINTENANCE_INTERVAL_KM,
};
pub use vehicle::{Family, Journey, Vehicle, VehicleType};
