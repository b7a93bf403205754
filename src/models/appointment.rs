use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;

/// Appointment document as persisted in the appointments collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub patient_id: String,
    pub physician: String,
    pub schedule: DateTime<Utc>,
    pub reason: String,
    pub note: Option<String>,
    pub status: AppointmentStatus,
    pub cancellation_reason: Option<String>,
}

/// Raw booking form values for a new appointment request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentInput {
    pub patient_id: String,
    pub physician: String,
    /// RFC 3339 date-time.
    pub schedule: String,
    pub reason: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// Raw partial update to an appointment. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentPatch {
    #[serde(default)]
    pub physician: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
}

/// Validated form of [`AppointmentPatch`], produced by the validation layer.
#[derive(Debug, Clone, Default)]
pub struct AppointmentChanges {
    pub physician: Option<String>,
    pub schedule: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub note: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub cancellation_reason: Option<String>,
}

impl AppointmentChanges {
    pub fn is_empty(&self) -> bool {
        self.physician.is_none()
            && self.schedule.is_none()
            && self.reason.is_none()
            && self.note.is_none()
            && self.status.is_none()
            && self.cancellation_reason.is_none()
    }
}
