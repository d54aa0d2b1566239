//! groom-planner core
//!
//! Appointment scheduling and route sequencing for a mobile pet-grooming
//! crew: conflict-free slot allocation, the booking status state machine,
//! and the greedy day-planning engine with live or haversine travel-time
//! estimates.

pub mod availability;
pub mod error;
pub mod memstore;
pub mod model;
pub mod scheduler;
pub mod sequencer;
pub mod traits;
pub mod travel;
