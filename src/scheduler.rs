//! Booking lifecycle orchestration and day planning.
//!
//! `AppointmentScheduler` owns the appointment and route-plan lifecycles.
//! Collaborators arrive through the trait seams in [`crate::traits`]; the
//! defaults make a scheduler usable standalone (no coverage limits, log-only
//! sinks, no live traffic, wall clock).

use std::sync::Mutex;

use chrono::{NaiveDate, NaiveTime};
use rayon::prelude::*;

use crate::availability;
use crate::error::ScheduleError;
use crate::model::{
    Appointment, AppointmentStatus, BookingEvent, Channel, DayRoutePlan, GroomingRecord,
    ServiceType,
};
use crate::sequencer::order_by_nearest;
use crate::traits::{
    AppointmentStore, AssignmentPolicy, Clock, CoverageCheck, CoverageDisabled, FirstAvailable,
    Locatable, LogHistory, LogNotifier, NoLiveTraffic, NotificationSink, PetCatalog,
    RoutePlanStore, ServiceHistory, SystemClock, TechnicianDirectory, TravelTimeProvider,
};
use crate::travel::estimate_minutes;

/// Request to book a new visit.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub customer_id: i64,
    pub pet_id: i64,
    pub service_type: ServiceType,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: Option<String>,
    /// Explicit groomer selection; `None` lets the assignment policy pick.
    pub groomer_id: Option<i64>,
}

/// Outcome of an availability probe. A conflict is reported here, never
/// raised as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    pub available: bool,
    pub message: String,
    pub candidate_groomer_ids: Vec<i64>,
}

/// A groomer's planned day: visiting order plus cumulative travel ETAs.
///
/// `eta_minutes[i]` is the estimated minutes of driving accumulated when
/// arriving at `ordered_ids[i]`; the first stop is always 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub ordered_ids: Vec<i64>,
    pub eta_minutes: Vec<i64>,
}

pub struct AppointmentScheduler {
    appointments: Box<dyn AppointmentStore + Send + Sync>,
    route_plans: Box<dyn RoutePlanStore + Send + Sync>,
    pets: Box<dyn PetCatalog + Send + Sync>,
    groomers: Box<dyn TechnicianDirectory + Send + Sync>,
    assignment: Box<dyn AssignmentPolicy + Send + Sync>,
    coverage: Box<dyn CoverageCheck + Send + Sync>,
    notifier: Box<dyn NotificationSink + Send + Sync>,
    history: Box<dyn ServiceHistory + Send + Sync>,
    travel: Box<dyn TravelTimeProvider + Send + Sync>,
    clock: Box<dyn Clock + Send + Sync>,
    /// Serializes validate+persist so two concurrent creates cannot both
    /// pass the conflict check for overlapping slots.
    slot_guard: Mutex<()>,
}

impl AppointmentScheduler {
    pub fn new(
        appointments: impl AppointmentStore + Send + Sync + 'static,
        route_plans: impl RoutePlanStore + Send + Sync + 'static,
        pets: impl PetCatalog + Send + Sync + 'static,
        groomers: impl TechnicianDirectory + Send + Sync + 'static,
    ) -> Self {
        Self {
            appointments: Box::new(appointments),
            route_plans: Box::new(route_plans),
            pets: Box::new(pets),
            groomers: Box::new(groomers),
            assignment: Box::new(FirstAvailable),
            coverage: Box::new(CoverageDisabled),
            notifier: Box::new(LogNotifier),
            history: Box::new(LogHistory),
            travel: Box::new(NoLiveTraffic),
            clock: Box::new(SystemClock),
            slot_guard: Mutex::new(()),
        }
    }

    pub fn with_assignment_policy(
        mut self,
        policy: impl AssignmentPolicy + Send + Sync + 'static,
    ) -> Self {
        self.assignment = Box::new(policy);
        self
    }

    pub fn with_coverage(mut self, coverage: impl CoverageCheck + Send + Sync + 'static) -> Self {
        self.coverage = Box::new(coverage);
        self
    }

    pub fn with_notifier(mut self, notifier: impl NotificationSink + Send + Sync + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_history(mut self, history: impl ServiceHistory + Send + Sync + 'static) -> Self {
        self.history = Box::new(history);
        self
    }

    pub fn with_travel_provider(
        mut self,
        travel: impl TravelTimeProvider + Send + Sync + 'static,
    ) -> Self {
        self.travel = Box::new(travel);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Book a new visit. Validates pet ownership, the future-dated slot,
    /// service-area coverage, and slot availability before persisting with
    /// status `Pending`.
    pub fn create(&self, request: CreateRequest) -> Result<Appointment, ScheduleError> {
        let owner = self
            .pets
            .owner_of(request.pet_id)
            .ok_or(ScheduleError::NotFound("pet"))?;
        if owner != request.customer_id {
            return Err(ScheduleError::Forbidden(
                "the pet does not belong to the requesting customer".to_string(),
            ));
        }

        self.ensure_future(request.date, request.time)?;

        if let (Some(lat), Some(lng)) = (request.latitude, request.longitude) {
            if !self.coverage.is_within_service_area(lat, lng) {
                return Err(ScheduleError::OutOfCoverage);
            }
        }

        let now = self.clock.now();
        let mut appointment = Appointment {
            id: 0,
            customer_id: request.customer_id,
            pet_id: request.pet_id,
            service_type: request.service_type,
            date: request.date,
            time: request.time,
            address: request.address,
            latitude: request.latitude,
            longitude: request.longitude,
            notes: request.notes,
            status: AppointmentStatus::Pending,
            groomer_id: None,
            created_at: now,
            updated_at: now,
        };

        appointment.groomer_id = match request.groomer_id {
            Some(id) => {
                if !self.groomers.active_groomers().contains(&id) {
                    return Err(ScheduleError::NotFound("groomer"));
                }
                Some(id)
            }
            None => self
                .assignment
                .choose(&self.groomers.active_groomers(), &appointment),
        };

        let stored = {
            let _slot = self.slot_guard.lock().expect("slot guard poisoned");
            let approved = self.appointments.approved_on(request.date, None);
            availability::validate(request.date, request.time, request.service_type, &approved)?;
            self.appointments.insert(appointment)
        };

        tracing::info!(
            id = stored.id,
            customer = stored.customer_id,
            date = %stored.date,
            time = %stored.time,
            "appointment created"
        );
        self.notifier
            .notify(stored.customer_id, BookingEvent::Created, Channel::Internal);
        if let Some(groomer) = stored.groomer_id {
            self.notifier
                .notify(groomer, BookingEvent::Created, Channel::Internal);
        }

        Ok(stored)
    }

    /// Drive the status state machine. Completion also appends the grooming
    /// history record.
    pub fn update_status(
        &self,
        id: i64,
        new_status: AppointmentStatus,
    ) -> Result<Appointment, ScheduleError> {
        let mut appointment = self
            .appointments
            .get(id)
            .ok_or(ScheduleError::NotFound("appointment"))?;

        if !appointment.status.can_transition_to(new_status) {
            return Err(ScheduleError::IllegalOperation(format!(
                "a {:?} appointment cannot move to {:?}",
                appointment.status, new_status
            )));
        }

        appointment.status = new_status;
        appointment.updated_at = self.clock.now();
        self.appointments.update(&appointment);
        tracing::info!(id, status = ?new_status, "appointment status updated");

        match new_status {
            AppointmentStatus::Approved => {
                self.notifier
                    .notify(appointment.customer_id, BookingEvent::Approved, Channel::Internal);
            }
            AppointmentStatus::Rejected => {
                self.notifier
                    .notify(appointment.customer_id, BookingEvent::Rejected, Channel::Internal);
            }
            AppointmentStatus::OnRoute => {
                self.notifier
                    .notify(appointment.customer_id, BookingEvent::OnRoute, Channel::Internal);
            }
            AppointmentStatus::Completed => {
                self.history.record(GroomingRecord {
                    groomer_id: appointment.groomer_id,
                    pet_name: self.pets.name_of(appointment.pet_id),
                    service_type: appointment.service_type,
                    date: appointment.date,
                    time: appointment.time,
                    notes: appointment.notes.clone(),
                });
                self.notifier
                    .notify(appointment.customer_id, BookingEvent::Completed, Channel::WhatsApp);
            }
            AppointmentStatus::Pending => {}
        }

        Ok(appointment)
    }

    /// Move an appointment to a new slot. Only the owning customer may
    /// reschedule, terminal appointments stay put, and the new slot is
    /// validated with the appointment's own row excluded. Status resets to
    /// `Pending`.
    pub fn reschedule(
        &self,
        id: i64,
        actor_customer_id: i64,
        date: NaiveDate,
        time: NaiveTime,
        service_type: Option<ServiceType>,
    ) -> Result<Appointment, ScheduleError> {
        let mut appointment = self
            .appointments
            .get(id)
            .ok_or(ScheduleError::NotFound("appointment"))?;

        if appointment.customer_id != actor_customer_id {
            return Err(ScheduleError::Forbidden(
                "the appointment does not belong to the requesting customer".to_string(),
            ));
        }
        if appointment.status.is_terminal() {
            return Err(ScheduleError::IllegalOperation(format!(
                "a {:?} appointment cannot be rescheduled",
                appointment.status
            )));
        }

        self.ensure_future(date, time)?;
        let service_type = service_type.unwrap_or(appointment.service_type);

        {
            let _slot = self.slot_guard.lock().expect("slot guard poisoned");
            let approved: Vec<Appointment> = self
                .appointments
                .approved_on(date, None)
                .into_iter()
                .filter(|a| a.id != id)
                .collect();
            availability::validate(date, time, service_type, &approved)?;

            appointment.date = date;
            appointment.time = time;
            appointment.service_type = service_type;
            appointment.status = AppointmentStatus::Pending;
            appointment.updated_at = self.clock.now();
            self.appointments.update(&appointment);
        }

        tracing::info!(id, date = %date, time = %time, "appointment rescheduled");
        self.notifier
            .notify(appointment.customer_id, BookingEvent::Rescheduled, Channel::Internal);
        if let Some(groomer) = appointment.groomer_id {
            self.notifier
                .notify(groomer, BookingEvent::Rescheduled, Channel::Internal);
        }

        Ok(appointment)
    }

    /// Customer-initiated cancellation. Permitted only while the booking is
    /// still `Pending`; the row is kept for history as `Rejected`.
    pub fn cancel(&self, id: i64, actor_customer_id: i64) -> Result<Appointment, ScheduleError> {
        let mut appointment = self
            .appointments
            .get(id)
            .ok_or(ScheduleError::NotFound("appointment"))?;

        if appointment.customer_id != actor_customer_id {
            return Err(ScheduleError::Forbidden(
                "the appointment does not belong to the requesting customer".to_string(),
            ));
        }
        if appointment.status != AppointmentStatus::Pending {
            return Err(ScheduleError::IllegalOperation(
                "the appointment was already accepted and can no longer be modified".to_string(),
            ));
        }

        appointment.status = AppointmentStatus::Rejected;
        appointment.updated_at = self.clock.now();
        self.appointments.update(&appointment);
        tracing::info!(id, "appointment canceled");
        self.notifier
            .notify(appointment.customer_id, BookingEvent::Canceled, Channel::Internal);

        Ok(appointment)
    }

    /// Probe a slot without booking it.
    pub fn check_availability(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        service_type: ServiceType,
    ) -> Availability {
        let approved = self.appointments.approved_on(date, None);
        match availability::validate(date, time, service_type, &approved) {
            Ok(()) => Availability {
                available: true,
                message: "the requested slot is available".to_string(),
                candidate_groomer_ids: self.groomers.active_groomers(),
            },
            Err(err) => Availability {
                available: false,
                message: err.to_string(),
                candidate_groomer_ids: Vec::new(),
            },
        }
    }

    /// Plan a day of visits: approved appointments for the date (optionally
    /// one groomer's), ordered by the stored route plan when present and by
    /// greedy nearest-neighbor otherwise, with cumulative travel ETAs.
    ///
    /// Estimator problems never fail the plan; affected legs use the
    /// haversine fallback.
    pub fn plan_day(&self, date: NaiveDate, groomer_id: Option<i64>) -> DayPlan {
        let approved = self.appointments.approved_on(date, groomer_id);

        let ordered: Vec<Appointment> = match self.route_plans.find(date) {
            Some(plan) => {
                tracing::debug!(date = %date, "using stored route plan");
                plan.ordered_ids()
                    .into_iter()
                    .filter_map(|id| approved.iter().find(|a| a.id == id).cloned())
                    .collect()
            }
            None => order_by_nearest(approved),
        };

        let eta_minutes = self.cumulative_etas(&ordered);
        DayPlan {
            date,
            ordered_ids: ordered.iter().map(|a| a.id).collect(),
            eta_minutes,
        }
    }

    /// Store the visiting order for a date verbatim. Staleness is resolved
    /// when the plan is read back, not here.
    pub fn save_route_plan(&self, date: NaiveDate, ordered_ids: &[i64]) {
        self.route_plans.upsert(DayRoutePlan::new(date, ordered_ids));
        tracing::info!(date = %date, stops = ordered_ids.len(), "route plan saved");
    }

    /// A customer's bookings, date then time ascending.
    pub fn list_for_customer(&self, customer_id: i64) -> Vec<Appointment> {
        self.appointments.for_customer(customer_id)
    }

    /// Every booking on a date, any status, optionally one groomer's.
    pub fn list_for_date(&self, date: NaiveDate, groomer_id: Option<i64>) -> Vec<Appointment> {
        let mut rows = self.appointments.on_date(date);
        if groomer_id.is_some() {
            rows.retain(|a| a.groomer_id == groomer_id);
        }
        rows
    }

    /// Most recent booking for a pet, for the pets-overview surface.
    pub fn latest_for_pet(&self, pet_id: i64) -> Option<Appointment> {
        self.appointments.latest_for_pet(pet_id)
    }

    fn ensure_future(&self, date: NaiveDate, time: NaiveTime) -> Result<(), ScheduleError> {
        if date.and_time(time) < self.clock.now() {
            return Err(ScheduleError::IllegalOperation(
                "the appointment cannot be scheduled in the past".to_string(),
            ));
        }
        Ok(())
    }

    /// Cumulative travel minutes per stop, first stop at 0. Legs are
    /// independent outbound queries and run in parallel.
    fn cumulative_etas(&self, stops: &[Appointment]) -> Vec<i64> {
        if stops.is_empty() {
            return Vec::new();
        }

        let legs: Vec<i64> = stops
            .par_windows(2)
            .map(|pair| {
                estimate_minutes(
                    self.travel.as_ref(),
                    pair[0].coordinates(),
                    pair[1].coordinates(),
                )
            })
            .collect();

        let mut eta_minutes = Vec::with_capacity(stops.len());
        let mut elapsed = 0;
        eta_minutes.push(0);
        for leg in legs {
            elapsed += leg;
            eta_minutes.push(elapsed);
        }
        eta_minutes
    }
}
