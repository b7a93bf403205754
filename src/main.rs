use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use caredesk::notify::LogNotifier;
use caredesk::store::SqliteStore;
use caredesk::{api, config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let settings = config::Settings::from_env();
    if let Some(parent) = settings.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let store = Arc::new(SqliteStore::open(&settings.database_path)?);
    let ctx = api::ApiContext::new(store, Arc::new(LogNotifier), &settings.admin_passkey);
    let app = api::api_router(ctx);

    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("API listening on {}", settings.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
