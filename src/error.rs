//! Client-visible error taxonomy for scheduling operations.
//!
//! Every variant is detected before any mutation; a failed operation never
//! leaves a half-written booking behind. Travel-estimator unavailability is
//! deliberately NOT an error here: providers return `None` and day planning
//! degrades to the haversine fallback.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Referenced appointment, pet, or groomer does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Actor does not own the referenced appointment or pet. Distinct from
    /// `NotFound` so callers can surface 403 vs 404.
    #[error("{0}")]
    Forbidden(String),

    /// Requested interval overlaps an approved appointment. Retryable with
    /// different input; never coerced to another slot.
    #[error("{0}")]
    Conflict(String),

    /// State-machine-violating request, with the business-rule message.
    #[error("{0}")]
    IllegalOperation(String),

    /// Address is outside the configured service area.
    #[error("address is outside the service area")]
    OutOfCoverage,
}
