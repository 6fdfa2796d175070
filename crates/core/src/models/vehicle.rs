//! The vehicle entity and its closed type taxonomy.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{FleetError, FleetResult};

use super::capability::{
    Capability, CapabilitySet, CargoHold, FuelTank, PassengerCabin, ServiceRecord,
};

/// Concrete vehicle types known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VehicleType {
    /// Passenger car.
    Car,
    /// Cargo truck.
    Truck,
    /// Passenger bus with a small luggage hold.
    Bus,
    /// Passenger and freight airplane.
    Airplane,
    /// Freight ship, optionally sail powered.
    CargoShip,
}

impl VehicleType {
    /// Every vehicle type in declaration order.
    pub const ALL: [VehicleType; 5] = [
        VehicleType::Car,
        VehicleType::Truck,
        VehicleType::Bus,
        VehicleType::Airplane,
        VehicleType::CargoShip,
    ];

    /// Canonical type name, as written to fleet files.
    pub fn name(self) -> &'static str {
        match self {
            VehicleType::Car => "Car",
            VehicleType::Truck => "Truck",
            VehicleType::Bus => "Bus",
            VehicleType::Airplane => "Airplane",
            VehicleType::CargoShip => "CargoShip",
        }
    }

    /// Look up a type by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.name().eq_ignore_ascii_case(name))
    }

    /// Capabilities every vehicle of this type carries.
    pub fn capabilities(self) -> CapabilitySet {
        match self {
            VehicleType::Car => CapabilitySet::new(true, true, false, true),
            VehicleType::Truck => CapabilitySet::new(true, false, true, true),
            VehicleType::Bus => CapabilitySet::new(true, true, true, true),
            VehicleType::Airplane => CapabilitySet::new(true, true, true, true),
            VehicleType::CargoShip => CapabilitySet::new(true, false, true, true),
        }
    }

    /// Seats available, for passenger-carrying types.
    pub fn passenger_capacity(self) -> Option<u32> {
        match self {
            VehicleType::Car => Some(5),
            VehicleType::Bus => Some(50),
            VehicleType::Airplane => Some(200),
            VehicleType::Truck | VehicleType::CargoShip => None,
        }
    }

    /// Cargo capacity in kilograms, for cargo-carrying types.
    pub fn cargo_capacity(self) -> Option<f64> {
        match self {
            VehicleType::Truck => Some(5_000.0),
            VehicleType::Bus => Some(500.0),
            VehicleType::Airplane => Some(10_000.0),
            VehicleType::CargoShip => Some(50_000.0),
            VehicleType::Car => None,
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VehicleType {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
            .ok_or_else(|| FleetError::invalid(format!("unknown vehicle type '{}'", s.trim())))
    }
}

/// Locomotion family, carrying the attribute specific to that medium.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Family {
    /// Road vehicles.
    Land {
        /// Number of wheels.
        wheels: u8,
    },
    /// Aircraft.
    Air {
        /// Service ceiling in feet.
        max_altitude: f64,
    },
    /// Watercraft.
    Water {
        /// Whether the vessel is sail powered.
        has_sail: bool,
    },
}

impl Family {
    /// Factor applied to the ideal `distance / max_speed` journey time.
    pub fn journey_multiplier(&self) -> f64 {
        match self {
            // traffic
            Family::Land { .. } => 1.10,
            // direct flight paths
            Family::Air { .. } => 0.95,
            // currents
            Family::Water { .. } => 1.15,
        }
    }

    /// Family name.
    pub fn label(&self) -> &'static str {
        match self {
            Family::Land { .. } => "Land",
            Family::Air { .. } => "Air",
            Family::Water { .. } => "Water",
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            Family::Land { .. } => "drove",
            Family::Air { .. } => "flew",
            Family::Water { .. } => "sailed",
        }
    }
}

/// Result of a journey that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Journey {
    /// The vehicle covered the distance.
    Completed {
        /// Kilometres travelled.
        distance: f64,
        /// Litres of fuel burned.
        fuel_used: f64,
    },
    /// The vehicle could not set off; mileage and fuel are unchanged.
    Stranded {
        /// Why the journey did not happen.
        reason: FleetError,
    },
}

impl Journey {
    /// Whether the vehicle actually moved.
    pub fn is_completed(&self) -> bool {
        matches!(self, Journey::Completed { .. })
    }
}

/// A vehicle in the fleet.
///
/// The `id` is fixed at construction; surrounding whitespace is dropped from
/// both the id and the model. Capability state lives in optional
/// components whose presence is decided by the [`VehicleType`]; operations on
/// a missing capability fail with [`FleetError::InvalidOperation`].
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    id: String,
    model: String,
    max_speed: f64,
    current_mileage: f64,
    vehicle_type: VehicleType,
    family: Family,
    fuel: Option<FuelTank>,
    cabin: Option<PassengerCabin>,
    hold: Option<CargoHold>,
    service: Option<ServiceRecord>,
}

impl Vehicle {
    /// New car: four wheels, five seats.
    pub fn car(id: impl Into<String>, model: impl Into<String>, max_speed: f64) -> FleetResult<Self> {
        Self::build(VehicleType::Car, Family::Land { wheels: 4 }, id, model, max_speed)
    }

    /// New truck: six wheels, 5000 kg hold.
    pub fn truck(
        id: impl Into<String>,
        model: impl Into<String>,
        max_speed: f64,
    ) -> FleetResult<Self> {
        Self::build(VehicleType::Truck, Family::Land { wheels: 6 }, id, model, max_speed)
    }

    /// New bus: six wheels, fifty seats, 500 kg hold.
    pub fn bus(id: impl Into<String>, model: impl Into<String>, max_speed: f64) -> FleetResult<Self> {
        Self::build(VehicleType::Bus, Family::Land { wheels: 6 }, id, model, max_speed)
    }

    /// New airplane with the given ceiling in feet.
    pub fn airplane(
        id: impl Into<String>,
        model: impl Into<String>,
        max_speed: f64,
        max_altitude: f64,
    ) -> FleetResult<Self> {
        if !max_altitude.is_finite() || max_altitude < 0.0 {
            return Err(FleetError::invalid(format!(
                "invalid max altitude {max_altitude}"
            )));
        }
        Self::build(
            VehicleType::Airplane,
            Family::Air { max_altitude },
            id,
            model,
            max_speed,
        )
    }

    /// New cargo ship, sail powered or not.
    pub fn cargo_ship(
        id: impl Into<String>,
        model: impl Into<String>,
        max_speed: f64,
        has_sail: bool,
    ) -> FleetResult<Self> {
        Self::build(
            VehicleType::CargoShip,
            Family::Water { has_sail },
            id,
            model,
            max_speed,
        )
    }

    fn build(
        vehicle_type: VehicleType,
        family: Family,
        id: impl Into<String>,
        model: impl Into<String>,
        max_speed: f64,
    ) -> FleetResult<Self> {
        let id = id.into().trim().to_string();
        let model = model.into().trim().to_string();
        if id.is_empty() {
            return Err(FleetError::invalid("id cannot be empty"));
        }
        if !max_speed.is_finite() || max_speed <= 0.0 {
            return Err(FleetError::invalid(format!(
                "max speed must be positive, got {max_speed}"
            )));
        }

        let capabilities = vehicle_type.capabilities();
        Ok(Self {
            id,
            model,
            max_speed,
            current_mileage: 0.0,
            vehicle_type,
            family,
            fuel: capabilities
                .contains(Capability::Fuel)
                .then(FuelTank::default),
            cabin: vehicle_type.passenger_capacity().map(PassengerCabin::new),
            hold: vehicle_type.cargo_capacity().map(CargoHold::new),
            service: capabilities
                .contains(Capability::Maintenance)
                .then(ServiceRecord::default),
        })
    }

    /// Unique identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Model display name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Top speed in km/h.
    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    /// Odometer reading in km.
    pub fn current_mileage(&self) -> f64 {
        self.current_mileage
    }

    /// Concrete type.
    pub fn vehicle_type(&self) -> VehicleType {
        self.vehicle_type
    }

    /// Concrete type name (`"Car"`, `"CargoShip"`, ...).
    pub fn type_name(&self) -> &'static str {
        self.vehicle_type.name()
    }

    /// Locomotion family.
    pub fn family(&self) -> Family {
        self.family
    }

    /// Capabilities carried by this vehicle.
    pub fn capabilities(&self) -> CapabilitySet {
        self.vehicle_type.capabilities()
    }

    /// Shorthand for `capabilities().contains(capability)`.
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(capability)
    }

    /// Wheel count for land vehicles.
    pub fn wheels(&self) -> Option<u8> {
        match self.family {
            Family::Land { wheels } => Some(wheels),
            _ => None,
        }
    }

    /// Ceiling for aircraft.
    pub fn max_altitude(&self) -> Option<f64> {
        match self.family {
            Family::Air { max_altitude } => Some(max_altitude),
            _ => None,
        }
    }

    /// Whether this is a sail-powered vessel.
    pub fn has_sail(&self) -> bool {
        matches!(self.family, Family::Water { has_sail: true })
    }

    /// Kilometres per litre.
    ///
    /// Trucks lose 10% when more than half loaded; sailing ships report zero
    /// since they burn no fuel.
    pub fn fuel_efficiency(&self) -> f64 {
        match self.vehicle_type {
            VehicleType::Car => 15.0,
            VehicleType::Bus => 10.0,
            VehicleType::Airplane => 5.0,
            VehicleType::Truck => {
                let base = 8.0;
                if self.hold.as_ref().is_some_and(CargoHold::is_heavily_loaded) {
                    base * 0.9
                } else {
                    base
                }
            }
            VehicleType::CargoShip => {
                if self.has_sail() {
                    0.0
                } else {
                    4.0
                }
            }
        }
    }

    /// Estimated hours to cover `distance` km.
    pub fn estimate_journey_time(&self, distance: f64) -> f64 {
        distance / self.max_speed * self.family.journey_multiplier()
    }

    /// Travel `distance` km.
    ///
    /// A non-positive distance is rejected outright. Running short of fuel is
    /// not an error: the vehicle stays put and a [`Journey::Stranded`] is
    /// returned.
    pub fn move_by(&mut self, distance: f64) -> FleetResult<Journey> {
        if !distance.is_finite() || distance <= 0.0 {
            return Err(FleetError::invalid("distance must be positive"));
        }

        let fuel_used = if self.fuel.is_some() {
            match self.consume_fuel(distance) {
                Ok(used) => used,
                Err(reason) => {
                    warn!(id = %self.id, %reason, "{} could not start journey", self.type_name());
                    return Ok(Journey::Stranded { reason });
                }
            }
        } else {
            0.0
        };

        self.current_mileage += distance;
        debug!(
            id = %self.id,
            distance,
            fuel_used,
            "{} {} {distance} km",
            self.type_name(),
            self.family.verb()
        );
        Ok(Journey::Completed {
            distance,
            fuel_used,
        })
    }

    /// Burn the fuel needed for `distance` km and return the amount used.
    ///
    /// Sail-powered vessels always consume nothing.
    pub fn consume_fuel(&mut self, distance: f64) -> FleetResult<f64> {
        if !distance.is_finite() || distance <= 0.0 {
            return Err(FleetError::invalid("distance must be positive"));
        }
        if self.has_sail() {
            return Ok(0.0);
        }
        let efficiency = self.fuel_efficiency();
        let tank = self.fuel.as_mut().ok_or_else(|| missing(&self.id, "fuel"))?;
        tank.consume(distance, efficiency)
    }

    /// Fuel on board, for fuel-capable vehicles. Sailing ships report zero.
    pub fn fuel_level(&self) -> Option<f64> {
        let tank = self.fuel.as_ref()?;
        Some(if self.has_sail() { 0.0 } else { tank.level() })
    }

    /// Add fuel.
    pub fn refuel(&mut self, amount: f64) -> FleetResult<()> {
        if self.has_sail() {
            return Err(FleetError::invalid("sailing ships do not consume fuel"));
        }
        let tank = self.fuel.as_mut().ok_or_else(|| missing(&self.id, "fuel"))?;
        tank.refuel(amount)
    }

    /// Restore a persisted fuel level.
    pub fn set_fuel_level(&mut self, level: f64) -> FleetResult<()> {
        let tank = self.fuel.as_mut().ok_or_else(|| missing(&self.id, "fuel"))?;
        tank.set_level(level)
    }

    /// Seat count, for passenger carriers.
    pub fn passenger_capacity(&self) -> Option<u32> {
        self.cabin.as_ref().map(PassengerCabin::capacity)
    }

    /// Passengers on board, for passenger carriers.
    pub fn current_passengers(&self) -> Option<u32> {
        self.cabin.as_ref().map(PassengerCabin::current)
    }

    /// Board passengers.
    pub fn board_passengers(&mut self, count: u32) -> FleetResult<()> {
        self.cabin_mut()?.board(count)
    }

    /// Let passengers off.
    pub fn disembark_passengers(&mut self, count: u32) -> FleetResult<()> {
        self.cabin_mut()?.disembark(count)
    }

    /// Set the passenger count directly, as when restoring a saved fleet.
    pub fn set_current_passengers(&mut self, count: u32) -> FleetResult<()> {
        self.cabin_mut()?.set_current(count)
    }

    /// Hold capacity in kg, for cargo carriers.
    pub fn cargo_capacity(&self) -> Option<f64> {
        self.hold.as_ref().map(CargoHold::capacity)
    }

    /// Cargo loaded in kg, for cargo carriers.
    pub fn current_cargo(&self) -> Option<f64> {
        self.hold.as_ref().map(CargoHold::current)
    }

    /// Load cargo.
    pub fn load_cargo(&mut self, weight: f64) -> FleetResult<()> {
        self.hold_mut()?.load(weight)
    }

    /// Unload cargo.
    pub fn unload_cargo(&mut self, weight: f64) -> FleetResult<()> {
        self.hold_mut()?.unload(weight)
    }

    /// Set the cargo weight directly, as when restoring a saved fleet.
    pub fn set_current_cargo(&mut self, weight: f64) -> FleetResult<()> {
        self.hold_mut()?.set_current(weight)
    }

    /// Whether maintenance is due. Always false for vehicles without service
    /// tracking.
    pub fn needs_maintenance(&self) -> bool {
        self.service
            .as_ref()
            .is_some_and(|record| record.is_due(self.current_mileage))
    }

    /// Manual maintenance flag, for maintainable vehicles.
    pub fn maintenance_flag(&self) -> Option<bool> {
        self.service.as_ref().map(ServiceRecord::maintenance_needed)
    }

    /// Odometer at last service, for maintainable vehicles.
    pub fn mileage_at_last_service(&self) -> Option<f64> {
        self.service
            .as_ref()
            .map(ServiceRecord::mileage_at_last_service)
    }

    /// Flag the vehicle for maintenance.
    pub fn schedule_maintenance(&mut self) -> FleetResult<()> {
        self.service_mut()?.schedule();
        Ok(())
    }

    /// Service the vehicle now.
    pub fn perform_maintenance(&mut self) -> FleetResult<()> {
        let mileage = self.current_mileage;
        self.service_mut()?.perform(mileage);
        debug!(id = %self.id, mileage, "maintenance performed");
        Ok(())
    }

    /// Restore the manual maintenance flag.
    pub fn set_maintenance_needed(&mut self, needed: bool) -> FleetResult<()> {
        self.service_mut()?.set_maintenance_needed(needed);
        Ok(())
    }

    /// Restore the odometer reading at last service.
    pub fn set_mileage_at_last_service(&mut self, mileage: f64) -> FleetResult<()> {
        self.service_mut()?.set_mileage_at_last_service(mileage)
    }

    /// Restore a persisted odometer reading.
    pub fn set_mileage(&mut self, mileage: f64) -> FleetResult<()> {
        if !mileage.is_finite() || mileage < 0.0 {
            return Err(FleetError::invalid(format!("invalid mileage {mileage}")));
        }
        self.current_mileage = mileage;
        Ok(())
    }

    fn cabin_mut(&mut self) -> FleetResult<&mut PassengerCabin> {
        self.cabin
            .as_mut()
            .ok_or_else(|| missing(&self.id, "passengers"))
    }

    fn hold_mut(&mut self) -> FleetResult<&mut CargoHold> {
        self.hold.as_mut().ok_or_else(|| missing(&self.id, "cargo"))
    }

    fn service_mut(&mut self) -> FleetResult<&mut ServiceRecord> {
        self.service
            .as_mut()
            .ok_or_else(|| missing(&self.id, "maintenance"))
    }
}

fn missing(id: &str, capability: &str) -> FleetError {
    FleetError::invalid(format!("vehicle {id} does not support {capability}"))
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}) · {} km/h · {:.1} km",
            self.type_name(),
            self.id,
            self.model,
            self.max_speed,
            self.current_mileage
        )?;
        match self.family {
            Family::Land { wheels } => write!(f, " · {wheels} wheels")?,
            Family::Air { max_altitude } => write!(f, " · ceiling {max_altitude} ft")?,
            Family::Water { has_sail: true } => write!(f, " · sail")?,
            Family::Water { has_sail: false } => {}
        }
        if let Some(level) = self.fuel_level() {
            write!(f, " · fuel {level:.1} L")?;
        }
        if let (Some(current), Some(capacity)) =
            (self.current_passengers(), self.passenger_capacity())
        {
            write!(f, " · {current}/{capacity} pax")?;
        }
        if let (Some(current), Some(capacity)) = (self.current_cargo(), self.cargo_capacity()) {
            write!(f, " · {current}/{capacity} kg")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_vehicles() -> Vec<Vehicle> {
        vec![
            Vehicle::car("C1", "Toyota", 220.0).unwrap(),
            Vehicle::truck("T1", "Volvo", 140.0).unwrap(),
            Vehicle::bus("B1", "Setra", 120.0).unwrap(),
            Vehicle::airplane("A1", "Boeing 747", 900.0, 41_000.0).unwrap(),
            Vehicle::cargo_ship("S1", "Maersk", 45.0, false).unwrap(),
            Vehicle::cargo_ship("S2", "Clipper", 30.0, true).unwrap(),
        ]
    }

    #[test]
    fn vehicle_type_serializes_by_name() {
        let json = serde_json::to_string(&VehicleType::CargoShip).unwrap();
        assert_eq!(json, "\"CargoShip\"");
        let parsed: VehicleType = serde_json::from_str("\"Airplane\"").unwrap();
        assert_eq!(parsed, VehicleType::Airplane);
        assert!(serde_json::from_str::<VehicleType>("\"Boat\"").is_err());
    }

    #[test]
    fn empty_id_is_rejected() {
        assert!(matches!(
            Vehicle::car("", "Toyota", 200.0),
            Err(FleetError::InvalidOperation(_))
        ));
        assert!(matches!(
            Vehicle::bus("   ", "Setra", 100.0),
            Err(FleetError::InvalidOperation(_))
        ));
    }

    #[test]
    fn non_positive_speed_is_rejected() {
        assert!(Vehicle::truck("T1", "Volvo", 0.0).is_err());
        assert!(Vehicle::truck("T1", "Volvo", f64::NAN).is_err());
    }

    #[test]
    fn non_positive_distance_changes_nothing() {
        for mut vehicle in all_vehicles() {
            let _ = vehicle.refuel(100.0);
            let before = vehicle.clone();
            for distance in [0.0, -5.0] {
                let err = vehicle.move_by(distance).unwrap_err();
                assert!(matches!(err, FleetError::InvalidOperation(_)));
                assert_eq!(vehicle, before);
            }
        }
    }

    #[test]
    fn successful_move_burns_distance_over_efficiency() {
        for mut vehicle in all_vehicles() {
            if vehicle.has_sail() {
                continue;
            }
            vehicle.refuel(1_000.0).unwrap();
            let efficiency = vehicle.fuel_efficiency();
            let journey = vehicle.move_by(120.0).unwrap();
            assert_eq!(
                journey,
                Journey::Completed {
                    distance: 120.0,
                    fuel_used: 120.0 / efficiency
                }
            );
            assert_eq!(vehicle.fuel_level(), Some(1_000.0 - 120.0 / efficiency));
            assert_eq!(vehicle.current_mileage(), 120.0);
        }
    }

    #[test]
    fn stranded_vehicle_keeps_mileage() {
        let mut car = Vehicle::car("C1", "Toyota", 220.0).unwrap();
        car.refuel(1.0).unwrap();
        let journey = car.move_by(100.0).unwrap();
        assert!(matches!(
            journey,
            Journey::Stranded {
                reason: FleetError::InsufficientFuel(_)
            }
        ));
        assert_eq!(car.current_mileage(), 0.0);
        assert_eq!(car.fuel_level(), Some(1.0));
    }

    #[test]
    fn truck_efficiency_depends_on_load() {
        let mut truck = Vehicle::truck("T1", "Volvo", 140.0).unwrap();
        assert_eq!(truck.fuel_efficiency(), 8.0);
        truck.load_cargo(2_500.0).unwrap();
        assert_eq!(truck.fuel_efficiency(), 8.0);
        truck.load_cargo(1.0).unwrap();
        assert!((truck.fuel_efficiency() - 7.2).abs() < 1e-12);
    }

    #[test]
    fn sailing_ship_never_burns_fuel() {
        let mut ship = Vehicle::cargo_ship("S1", "Clipper", 30.0, true).unwrap();
        assert_eq!(ship.fuel_efficiency(), 0.0);
        assert!(matches!(
            ship.refuel(10.0),
            Err(FleetError::InvalidOperation(_))
        ));
        let journey = ship.move_by(5_000.0).unwrap();
        assert!(journey.is_completed());
        assert_eq!(ship.fuel_level(), Some(0.0));
        assert_eq!(ship.current_mileage(), 5_000.0);
    }

    #[test]
    fn consume_fuel_rejects_bad_distance_without_side_effects() {
        for mut vehicle in all_vehicles() {
            if !vehicle.has_sail() {
                vehicle.refuel(10.0).unwrap();
            }
            let before = vehicle.fuel_level();
            for distance in [-150.0, 0.0, f64::NAN] {
                assert!(matches!(
                    vehicle.consume_fuel(distance),
                    Err(FleetError::InvalidOperation(_))
                ));
            }
            assert_eq!(vehicle.fuel_level(), before, "{}", vehicle.id());
        }
    }

    #[test]
    fn id_and_model_are_trimmed() {
        let car = Vehicle::car("  C1 ", " Toyota Camry  ", 220.0).unwrap();
        assert_eq!(car.id(), "C1");
        assert_eq!(car.model(), "Toyota Camry");
    }

    #[test]
    fn journey_time_uses_family_multiplier() {
        let car = Vehicle::car("C1", "Toyota", 100.0).unwrap();
        let plane = Vehicle::airplane("A1", "Airbus", 800.0, 39_000.0).unwrap();
        let ship = Vehicle::cargo_ship("S1", "Maersk", 40.0, false).unwrap();
        assert!((car.estimate_journey_time(200.0) - 2.2).abs() < 1e-12);
        assert!((plane.estimate_journey_time(1_600.0) - 1.9).abs() < 1e-12);
        assert!((ship.estimate_journey_time(400.0) - 11.5).abs() < 1e-12);
    }

    #[test]
    fn capability_sets_follow_type() {
        let car = Vehicle::car("C1", "Toyota", 220.0).unwrap();
        assert!(car.supports(Capability::Passengers));
        assert!(!car.supports(Capability::Cargo));
        assert_eq!(car.current_cargo(), None);
        let mut car = car;
        assert!(matches!(
            car.load_cargo(10.0),
            Err(FleetError::InvalidOperation(_))
        ));

        let truck = Vehicle::truck("T1", "Volvo", 140.0).unwrap();
        assert_eq!(truck.passenger_capacity(), None);
        assert_eq!(truck.cargo_capacity(), Some(5_000.0));
        assert_eq!(truck.wheels(), Some(6));
    }

    #[test]
    fn overload_leaves_state_unchanged() {
        let mut bus = Vehicle::bus("B1", "Setra", 120.0).unwrap();
        bus.board_passengers(48).unwrap();
        assert!(matches!(
            bus.board_passengers(3),
            Err(FleetError::Overload(_))
        ));
        assert_eq!(bus.current_passengers(), Some(48));
        assert!(matches!(
            bus.set_current_cargo(501.0),
            Err(FleetError::Overload(_))
        ));
        assert_eq!(bus.current_cargo(), Some(0.0));
    }

    #[test]
    fn maintenance_window_is_rolling() {
        let mut ship = Vehicle::cargo_ship("S1", "Maersk", 45.0, false).unwrap();
        ship.set_mileage(12_000.0).unwrap();
        assert!(ship.needs_maintenance());
        ship.perform_maintenance().unwrap();
        assert!(!ship.needs_maintenance());
        assert_eq!(ship.mileage_at_last_service(), Some(12_000.0));
        ship.schedule_maintenance().unwrap();
        assert!(ship.needs_maintenance());
    }

    #[test]
    fn type_names_parse_case_insensitively() {
        assert_eq!("cargoship".parse::<VehicleType>().unwrap(), VehicleType::CargoShip);
        assert_eq!(VehicleType::from_name(" BUS "), Some(VehicleType::Bus));
        assert!("boat".parse::<VehicleType>().is_err());
    }
}
