//! Line codec for fleet files.
//!
//! Each vehicle is one comma separated line:
//!
//! ```text
//! type,id,model,max_speed,mileage,efficiency,fuel_level,maintenance_needed,mileage_at_last_service,<tail>
//! ```
//!
//! followed by a tail that depends on the type:
//!
//! | type      | tail                                       |
//! |-----------|--------------------------------------------|
//! | Car       | `passengers`                               |
//! | Truck     | `cargo`                                    |
//! | Bus       | `passengers,cargo`                         |
//! | Airplane  | `max_altitude,passengers,cargo`            |
//! | CargoShip | `has_sail,cargo`                           |
//!
//! Fields are not escaped, so a model name containing a comma cannot be
//! stored. The efficiency column is informational and ignored when reading.

use std::str::Split;

use thiserror::Error;

use crate::{
    error::FleetError,
    models::{Capability, Vehicle, VehicleType},
};

/// Why a line could not be turned back into a vehicle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The line ended before a required field.
    #[error("missing field '{field}' at position {position}")]
    MissingField {
        /// Name of the expected field.
        field: &'static str,
        /// Zero-based column index.
        position: usize,
    },
    /// A field could not be parsed.
    #[error("malformed {field} '{value}'")]
    Malformed {
        /// Name of the field.
        field: &'static str,
        /// Raw text found in the file.
        value: String,
    },
    /// More columns than the type defines.
    #[error("unexpected extra fields after position {0}")]
    TrailingFields(usize),
    /// The values parsed but describe an invalid vehicle (unknown type,
    /// empty id, cargo over capacity, ...).
    #[error(transparent)]
    Invalid(#[from] FleetError),
}

/// Render a vehicle as a single line, without the trailing newline.
pub fn encode_vehicle(vehicle: &Vehicle) -> String {
    let mut fields = vec![
        vehicle.type_name().to_string(),
        vehicle.id().to_string(),
        vehicle.model().to_string(),
        real(vehicle.max_speed()),
        real(vehicle.current_mileage()),
        real(vehicle.fuel_efficiency()),
        real(vehicle.fuel_level().unwrap_or(0.0)),
        vehicle.maintenance_flag().unwrap_or(false).to_string(),
        real(vehicle.mileage_at_last_service().unwrap_or(0.0)),
    ];

    let passengers = || vehicle.current_passengers().unwrap_or(0).to_string();
    let cargo = || real(vehicle.current_cargo().unwrap_or(0.0));
    match vehicle.vehicle_type() {
        VehicleType::Car => fields.push(passengers()),
        VehicleType::Truck => fields.push(cargo()),
        VehicleType::Bus => {
            fields.push(passengers());
            fields.push(cargo());
        }
        VehicleType::Airplane => {
            fields.push(real(vehicle.max_altitude().unwrap_or(0.0)));
            fields.push(passengers());
            fields.push(cargo());
        }
        VehicleType::CargoShip => {
            fields.push(vehicle.has_sail().to_string());
            fields.push(cargo());
        }
    }

    fields.join(",")
}

/// Render every vehicle, one per line, each terminated by a newline.
pub fn encode_vehicles<'a>(vehicles: impl IntoIterator<Item = &'a Vehicle>) -> String {
    let mut out = String::new();
    for vehicle in vehicles {
        out.push_str(&encode_vehicle(vehicle));
        out.push('\n');
    }
    out
}

/// Parse one line back into a vehicle.
pub fn decode_vehicle(line: &str) -> Result<Vehicle, DecodeError> {
    let mut fields = Fields::new(line.trim());

    let vehicle_type: VehicleType = fields.text("type")?.parse()?;
    let id = fields.text("id")?;
    let model = fields.text("model")?;
    let max_speed = fields.real("max speed")?;
    let mileage = fields.real("mileage")?;
    // recomputed from the vehicle state, never trusted
    fields.text("fuel efficiency")?;
    let fuel_level = fields.real("fuel level")?;
    let maintenance_needed = fields.flag("maintenance flag")?;
    let mileage_at_last_service = fields.real("mileage at last service")?;

    let mut vehicle = match vehicle_type {
        VehicleType::Car => {
            let mut car = Vehicle::car(id, model, max_speed)?;
            car.set_current_passengers(fields.count("passengers")?)?;
            car
        }
        VehicleType::Truck => {
            let mut truck = Vehicle::truck(id, model, max_speed)?;
            truck.set_current_cargo(fields.real("cargo")?)?;
            truck
        }
        VehicleType::Bus => {
            let mut bus = Vehicle::bus(id, model, max_speed)?;
            bus.set_current_passengers(fields.count("passengers")?)?;
            bus.set_current_cargo(fields.real("cargo")?)?;
            bus
        }
        VehicleType::Airplane => {
            let max_altitude = fields.real("max altitude")?;
            let mut plane = Vehicle::airplane(id, model, max_speed, max_altitude)?;
            plane.set_current_passengers(fields.count("passengers")?)?;
            plane.set_current_cargo(fields.real("cargo")?)?;
            plane
        }
        VehicleType::CargoShip => {
            let has_sail = fields.flag("sail flag")?;
            let mut ship = Vehicle::cargo_ship(id, model, max_speed, has_sail)?;
            ship.set_current_cargo(fields.real("cargo")?)?;
            ship
        }
    };
    fields.finish()?;

    vehicle.set_mileage(mileage)?;
    if vehicle.supports(Capability::Fuel) {
        vehicle.set_fuel_level(fuel_level)?;
    }
    if vehicle.supports(Capability::Maintenance) {
        vehicle.set_maintenance_needed(maintenance_needed)?;
        vehicle.set_mileage_at_last_service(mileage_at_last_service)?;
    }
    Ok(vehicle)
}

/// Shortest representation that parses back to the same value (`220.0`, `0.1`).
fn real(value: f64) -> String {
    format!("{value:?}")
}

struct Fields<'a> {
    parts: Split<'a, char>,
    position: usize,
}

impl<'a> Fields<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            parts: line.split(','),
            position: 0,
        }
    }

    fn text(&mut self, field: &'static str) -> Result<&'a str, DecodeError> {
        let position = self.position;
        let value = self
            .parts
            .next()
            .map(str::trim)
            .ok_or(DecodeError::MissingField { field, position })?;
        self.position += 1;
        Ok(value)
    }

    fn real(&mut self, field: &'static str) -> Result<f64, DecodeError> {
        let raw = self.text(field)?;
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| malformed(field, raw))
    }

    fn count(&mut self, field: &'static str) -> Result<u32, DecodeError> {
        let raw = self.text(field)?;
        raw.parse::<u32>().map_err(|_| malformed(field, raw))
    }

    fn flag(&mut self, field: &'static str) -> Result<bool, DecodeError> {
        let raw = self.text(field)?;
        if raw.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if raw.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(malformed(field, raw))
        }
    }

    fn finish(mut self) -> Result<(), DecodeError> {
        match self.parts.next() {
            Some(_) => Err(DecodeError::TrailingFields(self.position)),
            None => Ok(()),
        }
    }
}

fn malformed(field: &'static str, raw: &str) -> DecodeError {
    DecodeError::Malformed {
        field,
        value: raw.to_string(),
    }
}
