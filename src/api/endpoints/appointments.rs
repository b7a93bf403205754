//! Appointment booking endpoints (patient-facing).

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{Appointment, CreateAppointmentInput};
use crate::store::Persisted;

#[derive(Serialize)]
pub struct AppointmentResponse {
    pub appointment: Persisted<Appointment>,
}

/// `POST /api/appointments` — request an appointment (starts `pending`).
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(input): Json<CreateAppointmentInput>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    let appointment = ctx.appointments.create(&input)?;
    Ok(Json(AppointmentResponse { appointment }))
}

/// `GET /api/appointments/:id` — fetch one appointment.
pub async fn get(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    let appointment = ctx.appointments.get(&id)?;
    Ok(Json(AppointmentResponse { appointment }))
}
