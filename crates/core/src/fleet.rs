//! The fleet registry and its bulk operations.

use std::cmp::Ordering;

use tracing::{info, warn};

use crate::{
    error::{FleetError, FleetResult},
    models::{Capability, Journey, Vehicle},
    report::FleetReport,
};

/// Outcome of a best-effort operation applied across the fleet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Vehicles the operation succeeded on.
    pub succeeded: usize,
    /// Vehicles it failed on, with a human readable reason.
    pub failures: Vec<BatchFailure>,
}

/// A single vehicle a batch operation could not be applied to.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    /// Identifier of the affected vehicle.
    pub id: String,
    /// What went wrong.
    pub error: FleetError,
}

impl BatchReport {
    fn record(&mut self, id: &str, result: FleetResult<()>) {
        match result {
            Ok(()) => self.succeeded += 1,
            Err(error) => self.failures.push(BatchFailure {
                id: id.to_string(),
                error,
            }),
        }
    }

    /// Whether every targeted vehicle succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// One-line summary suitable for a status bar.
    pub fn summary(&self, action: &str) -> String {
        if self.failures.is_empty() {
            return format!("{action}: {} vehicle(s) ok", self.succeeded);
        }
        let detail = self
            .failures
            .iter()
            .map(|failure| format!("{}: {}", failure.id, failure.error))
            .collect::<Vec<_>>()
            .join("; ");
        format!(
            "{action}: {} ok, {} failed ({detail})",
            self.succeeded,
            self.failures.len()
        )
    }
}

/// Ordered, exclusively owned collection of vehicles with case-insensitive
/// unique ids.
#[derive(Debug, Clone, Default)]
pub struct Fleet {
    vehicles: Vec<Vehicle>,
}

impl Fleet {
    /// Empty fleet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vehicles.
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    /// Whether the fleet has no vehicles.
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Vehicles in their current order.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Iterate vehicles in their current order.
    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter()
    }

    /// Find a vehicle by id, ignoring case.
    pub fn get(&self, id: &str) -> Option<&Vehicle> {
        self.position(id).map(|index| &self.vehicles[index])
    }

    /// Mutable lookup by id, ignoring case.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Vehicle> {
        self.position(id).map(|index| &mut self.vehicles[index])
    }

    /// Append a vehicle, rejecting duplicate ids.
    pub fn add(&mut self, vehicle: Vehicle) -> FleetResult<()> {
        if self.position(vehicle.id()).is_some() {
            return Err(FleetError::invalid(format!(
                "vehicle with id {} already exists",
                vehicle.id()
            )));
        }
        info!(id = vehicle.id(), kind = vehicle.type_name(), "vehicle added");
        self.vehicles.push(vehicle);
        Ok(())
    }

    /// Remove and return the vehicle with the given id.
    pub fn remove(&mut self, id: &str) -> FleetResult<Vehicle> {
        let index = self
            .position(id)
            .ok_or_else(|| FleetError::invalid(format!("vehicle with id {id} not found")))?;
        let removed = self.vehicles.remove(index);
        info!(id = removed.id(), "vehicle removed");
        Ok(removed)
    }

    /// Drop every vehicle.
    pub fn clear(&mut self) {
        self.vehicles.clear();
    }

    /// Move every vehicle by `distance`, continuing past failures.
    ///
    /// Stranded vehicles (not enough fuel) are reported as failures alongside
    /// rejected moves.
    pub fn start_all_journeys(&mut self, distance: f64) -> BatchReport {
        info!(distance, "starting journeys for all vehicles");
        let mut report = BatchReport::default();
        for vehicle in &mut self.vehicles {
            let result = match vehicle.move_by(distance) {
                Ok(Journey::Completed { .. }) => Ok(()),
                Ok(Journey::Stranded { reason }) => Err(reason),
                Err(err) => {
                    warn!(id = vehicle.id(), %err, "could not start journey");
                    Err(err)
                }
            };
            report.record(vehicle.id(), result);
        }
        report
    }

    /// Refuel every fuel-capable vehicle, continuing past failures.
    pub fn refuel_all(&mut self, amount: f64) -> BatchReport {
        info!(amount, "refuelling all applicable vehicles");
        let mut report = BatchReport::default();
        for vehicle in self
            .vehicles
            .iter_mut()
            .filter(|vehicle| vehicle.supports(Capability::Fuel))
        {
            let result = vehicle.refuel(amount);
            if let Err(err) = &result {
                warn!(id = vehicle.id(), %err, "could not refuel");
            }
            report.record(vehicle.id(), result);
        }
        report
    }

    /// Service every maintainable vehicle that is due and return how many
    /// were serviced.
    pub fn maintain_all(&mut self) -> usize {
        let mut serviced = 0;
        for vehicle in self
            .vehicles
            .iter_mut()
            .filter(|vehicle| vehicle.supports(Capability::Maintenance))
        {
            if vehicle.needs_maintenance() && vehicle.perform_maintenance().is_ok() {
                serviced += 1;
            }
        }
        info!(serviced, "maintenance pass complete");
        serviced
    }

    /// Vehicles whose type name matches `type_name`, ignoring case.
    pub fn search(&self, type_name: &str) -> Vec<&Vehicle> {
        let needle = type_name.trim();
        self.vehicles
            .iter()
            .filter(|vehicle| vehicle.type_name().eq_ignore_ascii_case(needle))
            .collect()
    }

    /// Maintainable vehicles currently due for service.
    pub fn vehicles_needing_maintenance(&self) -> Vec<&Vehicle> {
        self.vehicles
            .iter()
            .filter(|vehicle| {
                vehicle.supports(Capability::Maintenance) && vehicle.needs_maintenance()
            })
            .collect()
    }

    /// Most fuel efficient first.
    pub fn sort_by_efficiency(&mut self) {
        self.vehicles.sort_by(by_efficiency_desc);
    }

    /// Fastest first.
    pub fn sort_by_max_speed(&mut self) {
        self.vehicles.sort_by(by_max_speed_desc);
    }

    /// Model name A-Z, ignoring case.
    pub fn sort_by_model(&mut self) {
        self.vehicles
            .sort_by_cached_key(|vehicle| vehicle.model().to_lowercase());
    }

    /// Aggregate statistics over the current fleet.
    pub fn report(&self) -> FleetReport {
        FleetReport::from_vehicles(&self.vehicles)
    }

    /// Text rendering of [`Fleet::report`].
    pub fn generate_report(&self) -> String {
        self.report().to_string()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.vehicles
            .iter()
            .position(|vehicle| same_id(vehicle.id(), id))
    }
}

/// Id equality under full Unicode case folding.
fn same_id(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

impl<'a> IntoIterator for &'a Fleet {
    type Item = &'a Vehicle;
    type IntoIter = std::slice::Iter<'a, Vehicle>;

    fn into_iter(self) -> Self::IntoIter {
        self.vehicles.iter()
    }
}

/// Natural order of vehicles: higher fuel efficiency first.
pub fn by_efficiency_desc(a: &Vehicle, b: &Vehicle) -> Ordering {
    b.fuel_efficiency().total_cmp(&a.fuel_efficiency())
}

/// Higher top speed first.
pub fn by_max_speed_desc(a: &Vehicle, b: &Vehicle) -> Ordering {
    b.max_speed().total_cmp(&a.max_speed())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fleet() -> Fleet {
        let mut fleet = Fleet::new();
        fleet.add(Vehicle::car("C1", "toyota", 220.0).unwrap()).unwrap();
        fleet.add(Vehicle::truck("T1", "Volvo", 140.0).unwrap()).unwrap();
        fleet
            .add(Vehicle::airplane("A1", "Boeing", 900.0, 41_000.0).unwrap())
            .unwrap();
        fleet
            .add(Vehicle::cargo_ship("S1", "Clipper", 30.0, true).unwrap())
            .unwrap();
        fleet.add(Vehicle::bus("B1", "Setra", 120.0).unwrap()).unwrap();
        fleet
    }

    fn ids(fleet: &Fleet) -> Vec<&str> {
        fleet.iter().map(Vehicle::id).collect()
    }

    #[test]
    fn duplicate_ids_are_rejected_case_insensitively() {
        let mut fleet = sample_fleet();
        let err = fleet
            .add(Vehicle::car("c1", "Honda", 180.0).unwrap())
            .unwrap_err();
        assert!(matches!(err, FleetError::InvalidOperation(_)));
        assert_eq!(fleet.len(), 5);
        assert_eq!(fleet.get("C1").unwrap().model(), "toyota");
    }

    #[test]
    fn non_ascii_ids_fold_case() {
        let mut fleet = Fleet::new();
        fleet.add(Vehicle::car("É1", "Renault", 180.0).unwrap()).unwrap();
        let err = fleet
            .add(Vehicle::car("é1", "Peugeot", 190.0).unwrap())
            .unwrap_err();
        assert!(matches!(err, FleetError::InvalidOperation(_)));
        assert_eq!(fleet.len(), 1);
        assert_eq!(fleet.get("é1").map(Vehicle::model), Some("Renault"));
        assert_eq!(fleet.remove("é1").unwrap().id(), "É1");
        assert!(fleet.is_empty());
    }

    #[test]
    fn remove_matches_case_insensitively() {
        let mut fleet = sample_fleet();
        let removed = fleet.remove("t1").unwrap();
        assert_eq!(removed.id(), "T1");
        assert_eq!(ids(&fleet), vec!["C1", "A1", "S1", "B1"]);
        assert!(matches!(
            fleet.remove("T1"),
            Err(FleetError::InvalidOperation(_))
        ));
    }

    #[test]
    fn journeys_continue_past_failures() {
        let mut fleet = sample_fleet();
        fleet.get_mut("C1").unwrap().refuel(100.0).unwrap();

        let report = fleet.start_all_journeys(150.0);
        // car and sailing ship move, the rest have empty tanks
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failures.len(), 3);
        assert!(report
            .failures
            .iter()
            .all(|failure| matches!(failure.error, FleetError::InsufficientFuel(_))));
        assert_eq!(fleet.get("C1").unwrap().current_mileage(), 150.0);
        assert_eq!(fleet.get("S1").unwrap().current_mileage(), 150.0);
        assert_eq!(fleet.get("T1").unwrap().current_mileage(), 0.0);
    }

    #[test]
    fn invalid_distance_is_reported_per_vehicle() {
        let mut fleet = sample_fleet();
        let report = fleet.start_all_journeys(-1.0);
        assert_eq!(report.succeeded, 0);
        assert_eq!(report.failures.len(), 5);
        assert!(fleet.iter().all(|vehicle| vehicle.current_mileage() == 0.0));
    }

    #[test]
    fn refuel_skips_nothing_but_reports_sailing_ship() {
        let mut fleet = sample_fleet();
        let report = fleet.refuel_all(50.0);
        assert_eq!(report.succeeded, 4);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, "S1");
        assert_eq!(fleet.get("B1").unwrap().fuel_level(), Some(50.0));
        assert!(report.summary("Refuel").contains("S1"));
    }

    #[test]
    fn maintain_all_resets_due_vehicles() {
        let mut fleet = Fleet::new();
        let mut car = Vehicle::car("C1", "Toyota", 220.0).unwrap();
        car.set_mileage(10_001.0).unwrap();
        assert!(car.needs_maintenance());
        fleet.add(car).unwrap();
        fleet.add(Vehicle::bus("B1", "Setra", 120.0).unwrap()).unwrap();

        assert_eq!(fleet.vehicles_needing_maintenance().len(), 1);
        assert_eq!(fleet.maintain_all(), 1);
        let car = fleet.get("C1").unwrap();
        assert!(!car.needs_maintenance());
        assert_eq!(car.mileage_at_last_service(), Some(10_001.0));
        assert!(fleet.vehicles_needing_maintenance().is_empty());
    }

    #[test]
    fn search_is_case_insensitive() {
        let mut fleet = sample_fleet();
        fleet.add(Vehicle::car("C2", "Honda", 180.0).unwrap()).unwrap();
        let cars = fleet.search("car");
        assert_eq!(cars.len(), 2);
        assert!(fleet.search("Submarine").is_empty());
        assert_eq!(fleet.search("CARGOSHIP").len(), 1);
    }

    #[test]
    fn sorts_reorder_in_place() {
        let mut fleet = sample_fleet();

        fleet.sort_by_efficiency();
        assert_eq!(ids(&fleet), vec!["C1", "B1", "T1", "A1", "S1"]);

        fleet.sort_by_max_speed();
        assert_eq!(ids(&fleet), vec!["A1", "C1", "T1", "B1", "S1"]);

        fleet.sort_by_model();
        assert_eq!(ids(&fleet), vec!["A1", "S1", "B1", "C1", "T1"]);
    }

    #[test]
    fn efficiency_sort_is_stable() {
        let mut fleet = Fleet::new();
        fleet.add(Vehicle::bus("B1", "Setra", 120.0).unwrap()).unwrap();
        fleet.add(Vehicle::car("C1", "Toyota", 220.0).unwrap()).unwrap();
        fleet.add(Vehicle::bus("B2", "MAN", 110.0).unwrap()).unwrap();
        fleet.add(Vehicle::car("C2", "Honda", 180.0).unwrap()).unwrap();
        fleet.sort_by_efficiency();
        assert_eq!(ids(&fleet), vec!["C1", "C2", "B1", "B2"]);
    }
}
