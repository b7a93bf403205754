//! Patient registration endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{Patient, RegisterPatientInput};
use crate::store::Persisted;

#[derive(Serialize)]
pub struct RegisterResponse {
    pub patient: Persisted<Patient>,
    /// Route the client should navigate to next.
    pub booking_path: String,
}

/// `POST /api/patients/register` — run the registration pipeline.
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(input): Json<RegisterPatientInput>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let registered = ctx.registration.register(&input)?;
    Ok(Json(RegisterResponse {
        patient: registered.patient,
        booking_path: registered.booking_path,
    }))
}

#[derive(Serialize)]
pub struct PatientResponse {
    pub patient: Persisted<Patient>,
}

/// `GET /api/patients/:user_id` — fetch the patient registered for a user.
pub async fn get(
    State(ctx): State<ApiContext>,
    Path(user_id): Path<String>,
) -> Result<Json<PatientResponse>, ApiError> {
    let patient = ctx.registration.get_patient(&user_id)?;
    Ok(Json(PatientResponse { patient }))
}
