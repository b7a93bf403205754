//! Appointment lifecycle — booking requests, status transitions, and the
//! recent-appointments aggregate for the admin dashboard.
//!
//! Status machine: appointments start `pending`; `pending → scheduled`,
//! `pending → cancelled`, `scheduled → cancelled`, and `scheduled →
//! scheduled` (reschedule) are the only legal moves. `cancelled` is
//! terminal. Illegal moves fail with [`AppointmentError::InvalidTransition`]
//! instead of writing anything.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    Appointment, AppointmentPatch, AppointmentStatus, ChangeKind, CreateAppointmentInput,
};
use crate::notify::{change_message, Notifier};
use crate::store::{collections, ListQuery, Persisted, RecordStore, StoreError};
use crate::validation::{self, FieldErrors};

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Appointment not found: {0}")]
    NotFound(String),

    #[error("Invalid status transition: {} -> {}", .from.as_str(), .to.as_str())]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Record store failure: {0}")]
    Store(StoreError),
}

impl From<StoreError> for AppointmentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Derived aggregate over the appointment list. Never persisted; recomputed
/// on every request.
#[derive(Debug, Serialize)]
pub struct RecentAppointments {
    pub total_count: u64,
    pub scheduled_count: u64,
    pub pending_count: u64,
    pub cancelled_count: u64,
    pub documents: Vec<Persisted<Appointment>>,
}

pub struct AppointmentService {
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
}

impl AppointmentService {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Creates an appointment request in `pending` state.
    pub fn create(
        &self,
        input: &CreateAppointmentInput,
    ) -> Result<Persisted<Appointment>, AppointmentError> {
        let schedule =
            validation::validate_create_appointment(input).map_err(AppointmentError::Validation)?;

        let appointment = Appointment {
            patient_id: input.patient_id.clone(),
            physician: input.physician.clone(),
            schedule,
            reason: input.reason.trim().to_string(),
            note: input.note.clone(),
            status: AppointmentStatus::Pending,
            cancellation_reason: None,
        };

        let id = Uuid::new_v4().to_string();
        let record = self
            .store
            .create(collections::APPOINTMENTS, &id, &json_value(&appointment)?)?;
        let created = record.into_typed::<Appointment>()?;

        tracing::info!(
            appointment_id = %created.id,
            physician = %created.document.physician,
            "appointment requested"
        );
        Ok(created)
    }

    pub fn get(&self, id: &str) -> Result<Persisted<Appointment>, AppointmentError> {
        let record = self.store.get(collections::APPOINTMENTS, id)?;
        Ok(record.into_typed()?)
    }

    /// Fetches all appointments, newest first, and folds per-status counts in
    /// a single pass. A stored status outside the known set increments no
    /// counter but its document stays in the list.
    pub fn list_recent(&self) -> Result<RecentAppointments, AppointmentError> {
        let page = self
            .store
            .list(collections::APPOINTMENTS, &ListQuery::default())?;

        let mut documents = Vec::with_capacity(page.documents.len());
        for record in page.documents {
            documents.push(record.into_typed::<Appointment>()?);
        }

        let mut scheduled_count = 0;
        let mut pending_count = 0;
        let mut cancelled_count = 0;
        for appointment in &documents {
            match appointment.document.status {
                AppointmentStatus::Scheduled => scheduled_count += 1,
                AppointmentStatus::Pending => pending_count += 1,
                AppointmentStatus::Cancelled => cancelled_count += 1,
                AppointmentStatus::Unrecognized => {}
            }
        }

        Ok(RecentAppointments {
            total_count: page.total,
            scheduled_count,
            pending_count,
            cancelled_count,
            documents,
        })
    }

    /// Applies a partial update, enforcing the status machine, then fires the
    /// patient-notification and admin-view-invalidation hooks.
    pub fn update(
        &self,
        id: &str,
        patch: &AppointmentPatch,
        actor_user_id: &str,
        kind: ChangeKind,
    ) -> Result<Persisted<Appointment>, AppointmentError> {
        let changes =
            validation::validate_appointment_patch(patch).map_err(AppointmentError::Validation)?;

        let current = self.get(id)?;

        if let Some(next) = changes.status {
            let from = current.document.status;
            if !from.can_transition_to(next) {
                tracing::warn!(
                    appointment_id = %id,
                    from = from.as_str(),
                    to = next.as_str(),
                    "rejected status transition"
                );
                return Err(AppointmentError::InvalidTransition { from, to: next });
            }
            if next == AppointmentStatus::Cancelled && changes.cancellation_reason.is_none() {
                let mut errors = FieldErrors::default();
                errors.push("cancellation_reason", "A cancellation reason is required");
                return Err(AppointmentError::Validation(errors));
            }
        }

        if changes.is_empty() {
            return Ok(current);
        }

        let mut body = serde_json::Map::new();
        if let Some(physician) = &changes.physician {
            body.insert("physician".into(), serde_json::Value::String(physician.clone()));
        }
        if let Some(schedule) = changes.schedule {
            body.insert("schedule".into(), json_value(&schedule)?);
        }
        if let Some(reason) = &changes.reason {
            body.insert("reason".into(), serde_json::Value::String(reason.clone()));
        }
        if let Some(note) = &changes.note {
            body.insert("note".into(), serde_json::Value::String(note.clone()));
        }
        if let Some(status) = changes.status {
            body.insert("status".into(), json_value(&status)?);
        }
        if let Some(reason) = &changes.cancellation_reason {
            body.insert(
                "cancellation_reason".into(),
                serde_json::Value::String(reason.clone()),
            );
        }

        let record =
            self.store
                .update(collections::APPOINTMENTS, id, &serde_json::Value::Object(body))?;
        let updated = record.into_typed::<Appointment>()?;

        tracing::info!(
            appointment_id = %updated.id,
            actor_user_id,
            status = updated.document.status.as_str(),
            "appointment updated"
        );

        let message = change_message(
            kind,
            &updated.document.physician,
            updated.document.schedule,
            updated.document.cancellation_reason.as_deref(),
        );
        self.notifier.notify_patient(&updated.document.patient_id, &message);
        self.notifier.invalidate_admin_view();

        Ok(updated)
    }
}

fn json_value<T: Serialize>(value: &T) -> Result<serde_json::Value, AppointmentError> {
    serde_json::to_value(value).map_err(|e| {
        AppointmentError::Store(StoreError::Unavailable(format!("serialization: {e}")))
    })
}
