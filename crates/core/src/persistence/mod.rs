//! Flat-file persistence for the fleet.

/// Line encoding and decoding of individual vehicles.
pub mod codec;
/// Reading and writing whole fleet files.
pub mod store;

pub use codec::{decode_vehicle, encode_vehicle, encode_vehicles, DecodeError};
pub use store::{LoadOutcome, LoadSummary, SkippedLine};
