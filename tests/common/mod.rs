//! Shared test collaborators for scheduler and day-plan suites.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use groom_planner::memstore::{InMemoryAppointmentStore, InMemoryRoutePlanStore};
use groom_planner::model::{BookingEvent, Channel, GroomingRecord, ServiceType};
use groom_planner::scheduler::{AppointmentScheduler, CreateRequest};
use groom_planner::traits::{
    Clock, NotificationSink, PetCatalog, ServiceHistory, TechnicianDirectory, TravelTimeProvider,
};

pub const CUSTOMER: i64 = 100;
pub const OTHER_CUSTOMER: i64 = 101;
pub const PET: i64 = 500;
pub const OTHER_PET: i64 = 501;
pub const GROOMER_A: i64 = 10;
pub const GROOMER_B: i64 = 11;

/// Static pet catalog: two customers, one pet each.
pub struct TestPets;

impl PetCatalog for TestPets {
    fn owner_of(&self, pet_id: i64) -> Option<i64> {
        match pet_id {
            PET => Some(CUSTOMER),
            OTHER_PET => Some(OTHER_CUSTOMER),
            _ => None,
        }
    }

    fn name_of(&self, pet_id: i64) -> Option<String> {
        match pet_id {
            PET => Some("Firulais".to_string()),
            OTHER_PET => Some("Michi".to_string()),
            _ => None,
        }
    }
}

/// Fixed two-groomer roster in stable order.
pub struct TestGroomers;

impl TechnicianDirectory for TestGroomers {
    fn active_groomers(&self) -> Vec<i64> {
        vec![GROOMER_A, GROOMER_B]
    }
}

pub type SentEvent = (i64, &'static str, Channel);

/// Notifier that records every event for assertions.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub events: Arc<Mutex<Vec<SentEvent>>>,
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, user_id: i64, event: BookingEvent, channel: Channel) {
        self.events
            .lock()
            .unwrap()
            .push((user_id, event.name(), channel));
    }
}

/// History sink that records every completion entry.
#[derive(Clone, Default)]
pub struct RecordingHistory {
    pub records: Arc<Mutex<Vec<GroomingRecord>>>,
}

impl ServiceHistory for RecordingHistory {
    fn record(&self, record: GroomingRecord) {
        self.records.lock().unwrap().push(record);
    }
}

/// Frozen clock so 2024 fixtures stay in the future.
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Provider with one fixed answer for every leg.
pub struct StubTravel(pub i64);

impl TravelTimeProvider for StubTravel {
    fn duration_minutes(&self, _origin: (f64, f64), _destination: (f64, f64)) -> Option<i64> {
        Some(self.0)
    }
}

pub fn clock_start() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2024-06-01 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

/// Scheduler over fresh in-memory stores, with recording sinks and a frozen
/// clock. Returns the sinks' shared buffers for assertions.
pub fn new_scheduler() -> (
    AppointmentScheduler,
    Arc<Mutex<Vec<SentEvent>>>,
    Arc<Mutex<Vec<GroomingRecord>>>,
) {
    let notifier = RecordingNotifier::default();
    let history = RecordingHistory::default();
    let events = notifier.events.clone();
    let records = history.records.clone();

    let scheduler = AppointmentScheduler::new(
        InMemoryAppointmentStore::new(),
        InMemoryRoutePlanStore::new(),
        TestPets,
        TestGroomers,
    )
    .with_notifier(notifier)
    .with_history(history)
    .with_clock(FixedClock(clock_start()));

    (scheduler, events, records)
}

/// Booking request with sensible defaults; override fields as needed.
pub fn request(day: &str, at: &str, service_type: ServiceType) -> CreateRequest {
    CreateRequest {
        customer_id: CUSTOMER,
        pet_id: PET,
        service_type,
        date: date(day),
        time: time(at),
        address: None,
        latitude: None,
        longitude: None,
        notes: None,
        groomer_id: None,
    }
}

/// Request with coordinates attached.
pub fn located_request(
    day: &str,
    at: &str,
    service_type: ServiceType,
    lat: f64,
    lng: f64,
) -> CreateRequest {
    CreateRequest {
        latitude: Some(lat),
        longitude: Some(lng),
        ..request(day, at, service_type)
    }
}
