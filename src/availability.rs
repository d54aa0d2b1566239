//! Slot conflict detection against approved appointments.
//!
//! Pure functions over appointment snapshots; callers fetch the day's rows
//! and decide whether a conflict is fatal (booking creation) or just
//! reported (availability checks).

use chrono::{NaiveDate, NaiveTime};

use crate::error::ScheduleError;
use crate::model::{Appointment, AppointmentStatus, ServiceType};

/// Candidate interval in minutes from midnight: `[start, start + duration)`.
pub fn slot_interval(time: NaiveTime, service_type: ServiceType) -> (i64, i64) {
    let start = time.signed_duration_since(NaiveTime::MIN).num_minutes();
    (start, start + service_type.duration_minutes())
}

/// Inclusive overlap test: intervals conflict unless one ends strictly
/// before the other starts. `e1 == s2` (back-to-back slots) counts as a
/// conflict, replicating the system of record; stricter than a
/// half-open-interval test.
pub fn intervals_conflict(first: (i64, i64), second: (i64, i64)) -> bool {
    let (s1, e1) = first;
    let (s2, e2) = second;
    !(e1 < s2 || s1 > e2)
}

/// First approved appointment whose interval conflicts with the candidate
/// slot. Rows in any other status are ignored: new requests may stack
/// freely against pending or rejected slots.
pub fn find_conflict<'a>(
    time: NaiveTime,
    service_type: ServiceType,
    existing: &'a [Appointment],
) -> Option<&'a Appointment> {
    let candidate = slot_interval(time, service_type);
    existing
        .iter()
        .filter(|appointment| appointment.status == AppointmentStatus::Approved)
        .find(|appointment| {
            let interval = (appointment.start_minute(), appointment.end_minute());
            intervals_conflict(candidate, interval)
        })
}

/// Validate a proposed slot against the approved appointments for `date`.
pub fn validate(
    date: NaiveDate,
    time: NaiveTime,
    service_type: ServiceType,
    existing: &[Appointment],
) -> Result<(), ScheduleError> {
    match find_conflict(time, service_type, existing) {
        Some(_) => Err(ScheduleError::Conflict(format!(
            "the requested slot on {date} at {time} overlaps an approved appointment"
        ))),
        None => Ok(()),
    }
}
