//! API router.
//!
//! Routes are nested under `/api/`. Admin routes carry the access-key
//! middleware; everything else is public. `Extension` injects the context
//! for middleware, `State` provides it to handlers.

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the API router.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(ctx: ApiContext) -> Router {
    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/users", post(endpoints::users::create))
        .route("/users/:id", get(endpoints::users::get))
        .route("/patients/register", post(endpoints::patients::register))
        .route("/patients/:user_id", get(endpoints::patients::get))
        .route("/appointments", post(endpoints::appointments::create))
        .route("/appointments/:id", get(endpoints::appointments::get))
        .route("/admin/verify", post(endpoints::admin::verify))
        .with_state(ctx.clone());

    let admin = Router::new()
        .route("/admin/appointments", get(endpoints::admin::list))
        .route("/admin/appointments/:id", patch(endpoints::admin::update))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::require_admin))
        // Extension must be outermost so the middleware can extract ApiContext
        .layer(axum::Extension(ctx));

    Router::new()
        .nest("/api", public)
        .nest("/api", admin)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
