//! Optional capability components attached to a vehicle.
//!
//! A vehicle type fixes which of these it carries when it is constructed; the
//! fleet layer asks [`CapabilitySet`] (or the `Option` accessors on
//! [`Vehicle`](super::Vehicle)) before dispatching an operation.

use std::fmt;

use crate::error::{FleetError, FleetResult};

/// Kilometres driven since the last service after which maintenance is due.
pub const MAINTENANCE_INTERVAL_KM: f64 = 10_000.0;

/// A single optional behavioural facet of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Burns fuel while moving and can be refuelled.
    Fuel,
    /// Carries passengers up to a fixed capacity.
    Passengers,
    /// Carries cargo up to a fixed weight.
    Cargo,
    /// Tracks service intervals.
    Maintenance,
}

impl Capability {
    /// All capabilities in a stable order.
    pub const ALL: [Capability; 4] = [
        Capability::Fuel,
        Capability::Passengers,
        Capability::Cargo,
        Capability::Maintenance,
    ];

    /// Short label used in listings.
    pub fn label(self) -> &'static str {
        match self {
            Capability::Fuel => "fuel",
            Capability::Passengers => "passengers",
            Capability::Cargo => "cargo",
            Capability::Maintenance => "maintenance",
        }
    }
}

/// The static set of capabilities supported by a vehicle type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilitySet {
    fuel: bool,
    passengers: bool,
    cargo: bool,
    maintenance: bool,
}

impl CapabilitySet {
    /// Build a set from individual flags.
    pub const fn new(fuel: bool, passengers: bool, cargo: bool, maintenance: bool) -> Self {
        Self {
            fuel,
            passengers,
            cargo,
            maintenance,
        }
    }

    /// Whether the set contains `capability`.
    pub fn contains(&self, capability: Capability) -> bool {
        match capability {
            Capability::Fuel => self.fuel,
            Capability::Passengers => self.passengers,
            Capability::Cargo => self.cargo,
            Capability::Maintenance => self.maintenance,
        }
    }

    /// Iterate the contained capabilities in [`Capability::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL
            .into_iter()
            .filter(move |capability| self.contains(*capability))
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.iter().map(Capability::label).collect();
        if labels.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", labels.join(", "))
        }
    }
}

/// Fuel on board, in litres.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FuelTank {
    level: f64,
}

impl FuelTank {
    /// Current fuel level.
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Add `amount` litres. The amount must be a positive number.
    pub fn refuel(&mut self, amount: f64) -> FleetResult<()> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(FleetError::invalid("refuel amount must be positive"));
        }
        self.level += amount;
        Ok(())
    }

    /// Burn the fuel needed to cover `distance` at `efficiency` km/l and
    /// return the amount consumed.
    pub fn consume(&mut self, distance: f64, efficiency: f64) -> FleetResult<f64> {
        if !distance.is_finite() || distance <= 0.0 {
            return Err(FleetError::invalid(format!(
                "distance must be positive, got {distance}"
            )));
        }
        if efficiency.is_nan() || efficiency <= 0.0 {
            return Err(FleetError::invalid("vehicle has no fuel efficiency rating"));
        }
        let needed = distance / efficiency;
        if needed > self.level {
            return Err(FleetError::InsufficientFuel(format!(
                "needs {needed:.2} L but only {:.2} L on board",
                self.level
            )));
        }
        self.level -= needed;
        Ok(needed)
    }

    pub(crate) fn set_level(&mut self, level: f64) -> FleetResult<()> {
        if !level.is_finite() || level < 0.0 {
            return Err(FleetError::invalid(format!("invalid fuel level {level}")));
        }
        self.level = level;
        Ok(())
    }
}

/// Seats and the passengers currently occupying them.
#[derive(Debug, Clone, PartialEq)]
pub struct PassengerCabin {
    capacity: u32,
    current: u32,
}

impl PassengerCabin {
    /// Empty cabin with the given number of seats.
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            current: 0,
        }
    }

    /// Number of seats.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Passengers currently on board.
    pub fn current(&self) -> u32 {
        self.current
    }

    /// Board `count` passengers.
    pub fn board(&mut self, count: u32) -> FleetResult<()> {
        match self.current.checked_add(count) {
            Some(total) if total <= self.capacity => {
                self.current = total;
                Ok(())
            }
            _ => Err(FleetError::overload(format!(
                "passenger capacity of {} exceeded",
                self.capacity
            ))),
        }
    }

    /// Let `count` passengers off.
    pub fn disembark(&mut self, count: u32) -> FleetResult<()> {
        if count > self.current {
            return Err(FleetError::invalid(format!(
                "cannot disembark {count} passengers, only {} on board",
                self.current
            )));
        }
        self.current -= count;
        Ok(())
    }

    pub(crate) fn set_current(&mut self, count: u32) -> FleetResult<()> {
        if count > self.capacity {
            return Err(FleetError::overload(format!(
                "invalid passenger count {count} for capacity {}",
                self.capacity
            )));
        }
        self.current = count;
        Ok(())
    }
}

/// Cargo space measured in kilograms.
#[derive(Debug, Clone, PartialEq)]
pub struct CargoHold {
    capacity: f64,
    current: f64,
}

impl CargoHold {
    /// Empty hold of the given capacity.
    pub fn new(capacity: f64) -> Self {
        Self {
            capacity,
            current: 0.0,
        }
    }

    /// Maximum cargo weight.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Cargo weight currently loaded.
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Load `weight` kilograms.
    pub fn load(&mut self, weight: f64) -> FleetResult<()> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(FleetError::invalid("cargo weight must not be negative"));
        }
        if self.current + weight > self.capacity {
            return Err(FleetError::overload(format!(
                "cargo capacity of {} kg exceeded",
                self.capacity
            )));
        }
        self.current += weight;
        Ok(())
    }

    /// Unload `weight` kilograms.
    pub fn unload(&mut self, weight: f64) -> FleetResult<()> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(FleetError::invalid("cargo weight must not be negative"));
        }
        if weight > self.current {
            return Err(FleetError::invalid(format!(
                "cannot unload {weight} kg, only {} kg loaded",
                self.current
            )));
        }
        self.current -= weight;
        Ok(())
    }

    /// Whether more than half of the hold is in use.
    pub fn is_heavily_loaded(&self) -> bool {
        self.current > self.capacity * 0.5
    }

    pub(crate) fn set_current(&mut self, weight: f64) -> FleetResult<()> {
        if !weight.is_finite() || weight < 0.0 || weight > self.capacity {
            return Err(FleetError::overload(format!(
                "invalid cargo weight {weight} for capacity {}",
                self.capacity
            )));
        }
        self.current = weight;
        Ok(())
    }
}

/// Service history used to decide when maintenance is due.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServiceRecord {
    maintenance_needed: bool,
    mileage_at_last_service: f64,
}

impl ServiceRecord {
    /// Whether maintenance was requested manually.
    pub fn maintenance_needed(&self) -> bool {
        self.maintenance_needed
    }

    /// Odometer reading at the last service.
    pub fn mileage_at_last_service(&self) -> f64 {
        self.mileage_at_last_service
    }

    /// Flag the vehicle for maintenance regardless of mileage.
    pub fn schedule(&mut self) {
        self.maintenance_needed = true;
    }

    /// Due when flagged or when more than [`MAINTENANCE_INTERVAL_KM`] have
    /// been driven since the last service.
    pub fn is_due(&self, current_mileage: f64) -> bool {
        self.maintenance_needed
            || current_mileage - self.mileage_at_last_service > MAINTENANCE_INTERVAL_KM
    }

    /// Clear the flag and restart the interval at `current_mileage`.
    pub fn perform(&mut self, current_mileage: f64) {
        self.maintenance_needed = false;
        self.mileage_at_last_service = current_mileage;
    }

    pub(crate) fn set_maintenance_needed(&mut self, needed: bool) {
        self.maintenance_needed = needed;
    }

    pub(crate) fn set_mileage_at_last_service(&mut self, mileage: f64) -> FleetResult<()> {
        if !mileage.is_finite() || mileage < 0.0 {
            return Err(FleetError::invalid(format!(
                "invalid service mileage {mileage}"
            )));
        }
        self.mileage_at_last_service = mileage;
        Ok(())
    }
}
