//! Error types shared by the vehicle model and the fleet registry.

use thiserror::Error;

/// Failures raised by vehicle and fleet operations.
///
/// Every variant carries a human readable message. Operations that return one
/// of these leave the vehicle or registry exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FleetError {
    /// A precondition was violated (bad id, non-positive amount, unknown vehicle, ...).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// A passenger or cargo capacity would be exceeded.
    #[error("overload: {0}")]
    Overload(String),
    /// Not enough fuel on board for the requested distance.
    #[error("insufficient fuel: {0}")]
    InsufficientFuel(String),
}

impl FleetError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    pub(crate) fn overload(message: impl Into<String>) -> Self {
        Self::Overload(message.into())
    }
}

/// Convenience alias for results carrying a [`FleetError`].
pub type FleetResult<T> = Result<T, FleetError>;
