//! Collaborator seams for the scheduling core.
//!
//! These are intentionally minimal. Everything the scheduler talks to
//! (persistence, pet/groomer lookup, coverage, notifications, the
//! travel-time service, the clock) sits behind one of these traits so
//! concrete apps can plug in their own infrastructure.

use chrono::{NaiveDate, NaiveDateTime};

use crate::model::{Appointment, BookingEvent, Channel, DayRoutePlan, GroomingRecord};

/// Anything with a position on the map. Implementations decide how to stand
/// in for missing coordinates; the appointment model uses the origin.
pub trait Locatable {
    /// Coordinates as (lat, lng).
    fn coordinates(&self) -> (f64, f64);
}

/// Live travel-time estimates between two points.
///
/// `None` means "no estimate available": unconfigured credentials, network
/// failure, malformed response, anything. Callers substitute the haversine
/// fallback; providers must not surface errors or retry.
pub trait TravelTimeProvider {
    fn duration_minutes(&self, origin: (f64, f64), destination: (f64, f64)) -> Option<i64>;
}

/// Offline provider: never has a live estimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLiveTraffic;

impl TravelTimeProvider for NoLiveTraffic {
    fn duration_minutes(&self, _origin: (f64, f64), _destination: (f64, f64)) -> Option<i64> {
        None
    }
}

/// Appointment persistence.
///
/// Implementations must present a consistent snapshot to each call; the
/// scheduler serializes its own check-then-act windows, so a store shared
/// across schedulers needs its own transaction boundary around insert/update.
pub trait AppointmentStore {
    /// Persist a new appointment. The store assigns the id and returns the
    /// stored row.
    fn insert(&self, appointment: Appointment) -> Appointment;

    fn get(&self, id: i64) -> Option<Appointment>;

    /// Replace the stored row with the same id. Unknown ids are a no-op.
    fn update(&self, appointment: &Appointment);

    /// All appointments for a customer, date then time ascending.
    fn for_customer(&self, customer_id: i64) -> Vec<Appointment>;

    /// All appointments on a date, any status.
    fn on_date(&self, date: NaiveDate) -> Vec<Appointment>;

    /// Approved appointments on a date, optionally restricted to one groomer.
    fn approved_on(&self, date: NaiveDate, groomer_id: Option<i64>) -> Vec<Appointment>;

    /// Most recent appointment for a pet (latest date, then latest time).
    fn latest_for_pet(&self, pet_id: i64) -> Option<Appointment>;
}

/// Persisted visiting-order overrides, at most one per date.
pub trait RoutePlanStore {
    fn find(&self, date: NaiveDate) -> Option<DayRoutePlan>;

    /// Create or replace the plan for its date, verbatim.
    fn upsert(&self, plan: DayRoutePlan);
}

/// Pet ownership and display lookups. Pet CRUD lives elsewhere.
pub trait PetCatalog {
    /// Owning customer id, or `None` when the pet does not exist.
    fn owner_of(&self, pet_id: i64) -> Option<i64>;

    fn name_of(&self, pet_id: i64) -> Option<String>;
}

/// Groomer roster lookup.
pub trait TechnicianDirectory {
    /// Active groomer ids in a stable order. Assignment policies rely on
    /// this order being reproducible across calls.
    fn active_groomers(&self) -> Vec<i64>;
}

/// Chooses the groomer for a new appointment from the directory candidates.
pub trait AssignmentPolicy {
    fn choose(&self, candidates: &[i64], appointment: &Appointment) -> Option<i64>;
}

/// Default policy: first candidate in directory order. Not load-aware; a
/// known limitation carried over from the system of record.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstAvailable;

impl AssignmentPolicy for FirstAvailable {
    fn choose(&self, candidates: &[i64], _appointment: &Appointment) -> Option<i64> {
        candidates.first().copied()
    }
}

/// Service-area containment check, consulted at creation when coordinates
/// are present.
pub trait CoverageCheck {
    fn is_within_service_area(&self, lat: f64, lng: f64) -> bool;
}

/// Disabled coverage checking: every address is in range.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverageDisabled;

impl CoverageCheck for CoverageDisabled {
    fn is_within_service_area(&self, _lat: f64, _lng: f64) -> bool {
        true
    }
}

/// Rectangular service area in degrees.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBoxCoverage {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl CoverageCheck for BoundingBoxCoverage {
    fn is_within_service_area(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }
}

/// Outbound booking-event delivery. Fire-and-forget: sinks own their
/// failures, the scheduler never sees them.
pub trait NotificationSink {
    fn notify(&self, user_id: i64, event: BookingEvent, channel: Channel);
}

/// Default sink: structured log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, user_id: i64, event: BookingEvent, channel: Channel) {
        tracing::info!(user_id, event = event.name(), ?channel, "booking event");
    }
}

/// Append-only completion audit.
pub trait ServiceHistory {
    fn record(&self, record: GroomingRecord);
}

/// Default history sink: structured log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogHistory;

impl ServiceHistory for LogHistory {
    fn record(&self, record: GroomingRecord) {
        tracing::info!(?record, "completed service");
    }
}

/// Time source, injectable so past-date validation is testable.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in local time; home visits are scheduled in the business's
/// own timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}
