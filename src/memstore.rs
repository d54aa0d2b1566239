//! In-memory reference implementations of the store seams.
//!
//! Mutex-guarded maps with store-assigned sequential ids. Suitable for
//! embedding apps without a database and for tests; a real deployment puts
//! its own persistence behind the same traits.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use chrono::NaiveDate;

use crate::model::{Appointment, AppointmentStatus, DayRoutePlan};
use crate::traits::{AppointmentStore, RoutePlanStore};

#[derive(Debug, Default)]
pub struct InMemoryAppointmentStore {
    inner: Mutex<AppointmentRows>,
}

#[derive(Debug, Default)]
struct AppointmentRows {
    next_id: i64,
    rows: BTreeMap<i64, Appointment>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AppointmentStore for InMemoryAppointmentStore {
    fn insert(&self, mut appointment: Appointment) -> Appointment {
        let mut inner = self.inner.lock().expect("appointment store poisoned");
        inner.next_id += 1;
        appointment.id = inner.next_id;
        inner.rows.insert(appointment.id, appointment.clone());
        appointment
    }

    fn get(&self, id: i64) -> Option<Appointment> {
        let inner = self.inner.lock().expect("appointment store poisoned");
        inner.rows.get(&id).cloned()
    }

    fn update(&self, appointment: &Appointment) {
        let mut inner = self.inner.lock().expect("appointment store poisoned");
        if let Some(row) = inner.rows.get_mut(&appointment.id) {
            *row = appointment.clone();
        }
    }

    fn for_customer(&self, customer_id: i64) -> Vec<Appointment> {
        let inner = self.inner.lock().expect("appointment store poisoned");
        let mut rows: Vec<Appointment> = inner
            .rows
            .values()
            .filter(|a| a.customer_id == customer_id)
            .cloned()
            .collect();
        rows.sort_by_key(|a| (a.date, a.time));
        rows
    }

    fn on_date(&self, date: NaiveDate) -> Vec<Appointment> {
        let inner = self.inner.lock().expect("appointment store poisoned");
        inner
            .rows
            .values()
            .filter(|a| a.date == date)
            .cloned()
            .collect()
    }

    fn approved_on(&self, date: NaiveDate, groomer_id: Option<i64>) -> Vec<Appointment> {
        let inner = self.inner.lock().expect("appointment store poisoned");
        inner
            .rows
            .values()
            .filter(|a| a.date == date && a.status == AppointmentStatus::Approved)
            .filter(|a| groomer_id.is_none() || a.groomer_id == groomer_id)
            .cloned()
            .collect()
    }

    fn latest_for_pet(&self, pet_id: i64) -> Option<Appointment> {
        let inner = self.inner.lock().expect("appointment store poisoned");
        inner
            .rows
            .values()
            .filter(|a| a.pet_id == pet_id)
            .max_by_key(|a| (a.date, a.time))
            .cloned()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRoutePlanStore {
    inner: Mutex<HashMap<NaiveDate, DayRoutePlan>>,
}

impl InMemoryRoutePlanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoutePlanStore for InMemoryRoutePlanStore {
    fn find(&self, date: NaiveDate) -> Option<DayRoutePlan> {
        let inner = self.inner.lock().expect("route plan store poisoned");
        inner.get(&date).cloned()
    }

    fn upsert(&self, plan: DayRoutePlan) {
        let mut inner = self.inner.lock().expect("route plan store poisoned");
        inner.insert(plan.date, plan);
    }
}
