#![warn(clippy::all, missing_docs)]

//! Core domain logic for the fleet manager.
//!
//! This crate hosts the vehicle model and its capabilities, the fleet
//! registry with its bulk operations, report generation, flat-file
//! persistence, and configuration handling used by the terminal UI.

pub mod config;
pub mod error;
pub mod fleet;
pub mod models;
pub mod persistence;
pub mod report;

pub use crate::config::AppConfig;
pub use error::{FleetError, FleetResult};
pub use fleet::{BatchFailure, BatchReport, Fleet};
pub use models::{Capability, CapabilitySet, Family, Journey, Vehicle, VehicleType};
pub use persistence::{DecodeError, LoadOutcome, LoadSummary};
pub use report::FleetReport;
