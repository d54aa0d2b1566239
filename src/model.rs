//! Domain model for grooming appointments and day route plans.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::traits::Locatable;

/// Service offered on a home visit. Each service has a fixed duration;
/// callers never supply their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    Bath,
    Haircut,
    NailTrim,
    FullGrooming,
}

impl ServiceType {
    /// Fixed service duration in minutes.
    pub fn duration_minutes(self) -> i64 {
        match self {
            ServiceType::Bath => 45,
            ServiceType::Haircut => 60,
            ServiceType::NailTrim => 20,
            ServiceType::FullGrooming => 90,
        }
    }
}

/// Booking lifecycle status.
///
/// Transitions are monotonic: `Pending -> {Approved, Rejected}`,
/// `Approved -> {OnRoute, Rejected}`, `OnRoute -> Completed`.
/// `Rejected` and `Completed` are terminal. Cancellation is a transition
/// to `Rejected`; bookings are never physically deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Pending,
    Approved,
    Rejected,
    OnRoute,
    Completed,
}

impl AppointmentStatus {
    /// Whether the state machine admits a transition to `next`.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Approved, OnRoute)
                | (Approved, Rejected)
                | (OnRoute, Completed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AppointmentStatus::Rejected | AppointmentStatus::Completed)
    }
}

/// A single scheduled home visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub customer_id: i64,
    pub pet_id: i64,
    pub service_type: ServiceType,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub groomer_id: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Appointment {
    /// Slot start, in minutes from midnight.
    pub fn start_minute(&self) -> i64 {
        self.time.signed_duration_since(NaiveTime::MIN).num_minutes()
    }

    /// Slot end, in minutes from midnight (start + fixed service duration).
    pub fn end_minute(&self) -> i64 {
        self.start_minute() + self.service_type.duration_minutes()
    }
}

impl Locatable for Appointment {
    /// Missing coordinates read as the origin. This mirrors the system of
    /// record and can dominate route ordering with non-physical distances;
    /// kept for parity.
    fn coordinates(&self) -> (f64, f64) {
        (self.latitude.unwrap_or(0.0), self.longitude.unwrap_or(0.0))
    }
}

/// Explicit visiting-order override for one calendar date.
///
/// At most one plan exists per date. The order is stored as a comma-joined
/// id list, exactly as written; ids that are no longer approved are dropped
/// when the plan is read back, never at save time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRoutePlan {
    pub date: NaiveDate,
    pub order_csv: String,
}

impl DayRoutePlan {
    pub fn new(date: NaiveDate, ordered_ids: &[i64]) -> Self {
        let order_csv = ordered_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        Self { date, order_csv }
    }

    /// Decode the stored order. Malformed entries are skipped.
    pub fn ordered_ids(&self) -> Vec<i64> {
        self.order_csv
            .split(',')
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .collect()
    }
}

/// Append-only audit entry written when a visit completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroomingRecord {
    pub groomer_id: Option<i64>,
    pub pet_name: Option<String>,
    pub service_type: ServiceType,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub notes: Option<String>,
}

/// Booking lifecycle events handed to the notification sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingEvent {
    Created,
    Approved,
    Rejected,
    OnRoute,
    Completed,
    Rescheduled,
    Canceled,
}

impl BookingEvent {
    /// Wire name of the event.
    pub fn name(self) -> &'static str {
        match self {
            BookingEvent::Created => "BOOKING_CREATED",
            BookingEvent::Approved => "BOOKING_APPROVED",
            BookingEvent::Rejected => "BOOKING_REJECTED",
            BookingEvent::OnRoute => "BOOKING_ON_ROUTE",
            BookingEvent::Completed => "BOOKING_COMPLETED",
            BookingEvent::Rescheduled => "BOOKING_RESCHEDULED",
            BookingEvent::Canceled => "BOOKING_CANCELED",
        }
    }
}

/// Delivery channel hint passed along with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Internal,
    WhatsApp,
    Email,
}
