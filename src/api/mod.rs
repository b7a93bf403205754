//! HTTP surface for the intake services.
//!
//! Thin axum layer: handlers forward to the services and translate typed
//! errors into structured JSON responses.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod types;

pub use router::api_router;
pub use types::ApiContext;
