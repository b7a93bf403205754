//! Admin dashboard endpoints.
//!
//! `verify` is reachable without a key (it is how the key is obtained);
//! `list` and `update` sit behind the access-key middleware.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::gate::GateError;
use crate::models::{Appointment, AppointmentPatch, ChangeKind};
use crate::scheduling::RecentAppointments;
use crate::store::Persisted;

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub passkey: String,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    /// Obfuscated key the client persists and replays in `X-Access-Key`.
    pub access_key: String,
}

/// `POST /api/admin/verify` — exchange the passkey for an access key.
pub async fn verify(
    State(ctx): State<ApiContext>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    match ctx.gate.issue_token(&request.passkey) {
        Some(access_key) => Ok(Json(VerifyResponse { access_key })),
        None => Err(GateError::InvalidPasskey.into()),
    }
}

/// `GET /api/admin/appointments` — recent appointments with status counts.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<RecentAppointments>, ApiError> {
    let recent = ctx.appointments.list_recent()?;
    Ok(Json(recent))
}

#[derive(Deserialize)]
pub struct UpdateAppointmentRequest {
    /// Acting admin's user identifier.
    pub user_id: String,
    pub kind: ChangeKind,
    pub appointment: AppointmentPatch,
}

#[derive(Serialize)]
pub struct UpdateAppointmentResponse {
    pub appointment: Persisted<Appointment>,
}

/// `PATCH /api/admin/appointments/:id` — schedule, reschedule, or cancel.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<UpdateAppointmentResponse>, ApiError> {
    let appointment = ctx.appointments.update(
        &id,
        &request.appointment,
        &request.user_id,
        request.kind,
    )?;
    Ok(Json(UpdateAppointmentResponse { appointment }))
}
