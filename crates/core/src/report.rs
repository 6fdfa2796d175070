//! Aggregate statistics over a fleet snapshot.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use serde::Serialize;

use crate::models::Vehicle;

/// Text shown instead of a report when the fleet has no vehicles.
pub const EMPTY_FLEET_MESSAGE: &str = "The fleet is currently empty.";

/// Per-vehicle line of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleStatus {
    /// Vehicle id.
    pub id: String,
    /// Concrete type name.
    pub type_name: String,
    /// Model display name.
    pub model: String,
    /// Odometer reading in km.
    pub mileage: f64,
    /// Whether service is due.
    pub needs_maintenance: bool,
}

/// Reference to the fastest or slowest vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeedRecord {
    /// Vehicle id.
    pub id: String,
    /// Model display name.
    pub model: String,
    /// Top speed in km/h.
    pub max_speed: f64,
}

impl SpeedRecord {
    fn of(vehicle: &Vehicle) -> Self {
        Self {
            id: vehicle.id().to_string(),
            model: vehicle.model().to_string(),
            max_speed: vehicle.max_speed(),
        }
    }
}

/// Statistics computed from the fleet at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetReport {
    /// Number of vehicles in the fleet.
    pub total_vehicles: usize,
    /// Vehicle count keyed by type name.
    pub counts_by_type: BTreeMap<String, usize>,
    /// Sum of all odometer readings.
    pub total_mileage: f64,
    /// Mean over vehicles with a positive efficiency; sailing ships are left out.
    pub average_efficiency: f64,
    /// Model names, compared exactly.
    pub distinct_models: BTreeSet<String>,
    /// Highest top speed.
    pub fastest: Option<SpeedRecord>,
    /// Lowest top speed.
    pub slowest: Option<SpeedRecord>,
    /// One entry per vehicle in fleet order.
    pub vehicles: Vec<VehicleStatus>,
}

impl FleetReport {
    /// Compute a report for `vehicles` in their current order.
    pub fn from_vehicles(vehicles: &[Vehicle]) -> Self {
        let mut counts_by_type = BTreeMap::new();
        let mut distinct_models = BTreeSet::new();
        let mut total_mileage = 0.0;
        let mut efficiency_sum = 0.0;
        let mut efficiency_count = 0usize;
        let mut statuses = Vec::with_capacity(vehicles.len());
        let mut fastest: Option<&Vehicle> = None;
        let mut slowest: Option<&Vehicle> = None;

        for vehicle in vehicles {
            *counts_by_type
                .entry(vehicle.type_name().to_string())
                .or_insert(0) += 1;
            distinct_models.insert(vehicle.model().to_string());
            total_mileage += vehicle.current_mileage();

            let efficiency = vehicle.fuel_efficiency();
            if efficiency > 0.0 {
                efficiency_sum += efficiency;
                efficiency_count += 1;
            }

            // first vehicle seen wins a tie
            if fastest.map_or(true, |best| vehicle.max_speed() > best.max_speed()) {
                fastest = Some(vehicle);
            }
            if slowest.map_or(true, |best| vehicle.max_speed() < best.max_speed()) {
                slowest = Some(vehicle);
            }

            statuses.push(VehicleStatus {
                id: vehicle.id().to_string(),
                type_name: vehicle.type_name().to_string(),
                model: vehicle.model().to_string(),
                mileage: vehicle.current_mileage(),
                needs_maintenance: vehicle.needs_maintenance(),
            });
        }

        let average_efficiency = if efficiency_count > 0 {
            efficiency_sum / efficiency_count as f64
        } else {
            0.0
        };

        Self {
            total_vehicles: vehicles.len(),
            counts_by_type,
            total_mileage,
            average_efficiency,
            distinct_models,
            fastest: fastest.map(SpeedRecord::of),
            slowest: slowest.map(SpeedRecord::of),
            vehicles: statuses,
        }
    }

    /// Whether the report describes an empty fleet.
    pub fn is_empty(&self) -> bool {
        self.total_vehicles == 0
    }
}

impl fmt::Display for FleetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str(EMPTY_FLEET_MESSAGE);
        }

        writeln!(f, "Fleet Status Report")?;
        writeln!(f, "Total Vehicles: {}", self.total_vehicles)?;
        writeln!(f)?;
        for status in &self.vehicles {
            writeln!(
                f,
                "  - ID: {}, Type: {}, Model: {}, Mileage: {:.1} km, Needs Maintenance: {}",
                status.id,
                status.type_name,
                status.model,
                status.mileage,
                if status.needs_maintenance { "Yes" } else { "No" }
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Summary")?;
        writeln!(f, "Total Fleet Mileage: {:.1} km", self.total_mileage)?;
        writeln!(
            f,
            "Average Fuel Efficiency: {:.2} km/l",
            self.average_efficiency
        )?;
        let models = self
            .distinct_models
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            f,
            "Distinct Vehicle Models: {} ({models})",
            self.distinct_models.len()
        )?;
        if let Some(fastest) = &self.fastest {
            writeln!(
                f,
                "Fastest Vehicle: {} ({}) at {} km/h",
                fastest.id, fastest.model, fastest.max_speed
            )?;
        }
        if let Some(slowest) = &self.slowest {
            writeln!(
                f,
                "Slowest Vehicle: {} ({}) at {} km/h",
                slowest.id, slowest.model, slowest.max_speed
            )?;
        }
        writeln!(f, "Vehicle Counts by Type:")?;
        for (type_name, count) in &self.counts_by_type {
            writeln!(f, "  - {type_name}: {count}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::Fleet;

    #[test]
    fn empty_fleet_reports_fixed_message() {
        let fleet = Fleet::new();
        assert_eq!(fleet.generate_report(), EMPTY_FLEET_MESSAGE);
        assert!(fleet.report().fastest.is_none());
    }

    #[test]
    fn duplicate_models_are_counted_once() {
        let mut fleet = Fleet::new();
        fleet.add(Vehicle::car("C1", "Toyota", 220.0).unwrap()).unwrap();
        fleet.add(Vehicle::car("C2", "Toyota", 220.0).unwrap()).unwrap();

        let report = fleet.report();
        assert_eq!(report.total_vehicles, 2);
        assert_eq!(report.distinct_models.len(), 1);
        assert_eq!(report.counts_by_type.get("Car"), Some(&2));

        let text = fleet.generate_report();
        assert!(text.contains("Total Vehicles: 2"));
        assert!(text.contains("Distinct Vehicle Models: 1 (Toyota)"));
    }

    #[test]
    fn model_names_are_case_sensitive() {
        let mut fleet = Fleet::new();
        fleet.add(Vehicle::car("C1", "Toyota", 220.0).unwrap()).unwrap();
        fleet.add(Vehicle::car("C2", "toyota", 220.0).unwrap()).unwrap();
        assert_eq!(fleet.report().distinct_models.len(), 2);
    }

    #[test]
    fn zero_efficiency_vehicles_are_excluded_from_average() {
        let mut fleet = Fleet::new();
        fleet.add(Vehicle::car("C1", "Toyota", 220.0).unwrap()).unwrap();
        fleet.add(Vehicle::bus("B1", "Setra", 120.0).unwrap()).unwrap();
        fleet
            .add(Vehicle::cargo_ship("S1", "Clipper", 30.0, true).unwrap())
            .unwrap();
        let report = fleet.report();
        assert_eq!(report.average_efficiency, 12.5);
    }

    #[test]
    fn fastest_and_slowest_take_first_on_ties() {
        let mut fleet = Fleet::new();
        fleet.add(Vehicle::car("C1", "Toyota", 220.0).unwrap()).unwrap();
        fleet.add(Vehicle::car("C2", "Honda", 220.0).unwrap()).unwrap();
        fleet.add(Vehicle::truck("T1", "Volvo", 140.0).unwrap()).unwrap();
        fleet.add(Vehicle::truck("T2", "Scania", 140.0).unwrap()).unwrap();
        let report = fleet.report();
        assert_eq!(report.fastest.unwrap().id, "C1");
        assert_eq!(report.slowest.unwrap().id, "T1");
    }

    #[test]
    fn report_serializes_for_front_ends() {
        let mut fleet = Fleet::new();
        fleet.add(Vehicle::car("C1", "Toyota", 220.0).unwrap()).unwrap();
        fleet.add(Vehicle::truck("T1", "Volvo", 140.0).unwrap()).unwrap();

        let value = serde_json::to_value(fleet.report()).unwrap();
        assert_eq!(value["total_vehicles"], 2);
        assert_eq!(value["counts_by_type"]["Truck"], 1);
        assert_eq!(value["distinct_models"], serde_json::json!(["Toyota", "Volvo"]));
        assert_eq!(value["fastest"]["id"], "C1");
        assert_eq!(value["vehicles"][1]["needs_maintenance"], false);
    }

    #[test]
    fn totals_and_maintenance_status() {
        let mut fleet = Fleet::new();
        let mut car = Vehicle::car("C1", "Toyota", 220.0).unwrap();
        car.set_mileage(12_000.0).unwrap();
        fleet.add(car).unwrap();
        let mut plane = Vehicle::airplane("A1", "Boeing", 900.0, 41_000.0).unwrap();
        plane.set_mileage(500.0).unwrap();
        fleet.add(plane).unwrap();

        let report = fleet.report();
        assert_eq!(report.total_mileage, 12_500.0);
        assert!(report.vehicles[0].needs_maintenance);
        assert!(!report.vehicles[1].needs_maintenance);
        let text = report.to_string();
        assert!(text.contains(
            "ID: C1, Type: Car, Model: Toyota, Mileage: 12000.0 km, Needs Maintenance: Yes"
        ));
        assert!(text.contains("Fastest Vehicle: A1 (Boeing) at 900 km/h"));
    }
}
