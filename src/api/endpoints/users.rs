//! User account endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{CreateUserInput, User};
use crate::store::Persisted;

#[derive(Serialize)]
pub struct UserResponse {
    pub user: Persisted<User>,
}

/// `POST /api/users` — create a user account.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(input): Json<CreateUserInput>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = ctx.registration.create_user(&input)?;
    Ok(Json(UserResponse { user }))
}

/// `GET /api/users/:id` — fetch a user account.
pub async fn get(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = ctx.registration.get_user(&id)?;
    Ok(Json(UserResponse { user }))
}
