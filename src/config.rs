use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Caredesk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the application data directory
/// ~/Caredesk/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Caredesk")
}

/// Default SQLite database path inside the data directory
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("caredesk.db")
}

/// Default tracing filter when RUST_LOG is unset
pub fn default_log_filter() -> &'static str {
    "caredesk=info,tower_http=info"
}

/// Runtime settings, read from `CAREDESK_*` environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Address the HTTP API binds to.
    pub bind_addr: SocketAddr,
    /// Path of the backing document database.
    pub database_path: PathBuf,
    /// Static admin passkey for the dashboard gate.
    pub admin_passkey: String,
}

impl Settings {
    /// Reads settings from the environment, falling back to defaults.
    ///
    /// `CAREDESK_BIND_ADDR`, `CAREDESK_DATABASE_PATH`, `CAREDESK_ADMIN_PASSKEY`.
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("CAREDESK_BIND_ADDR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8620)));

        let database_path = std::env::var("CAREDESK_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_database_path());

        let admin_passkey = match std::env::var("CAREDESK_ADMIN_PASSKEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => {
                tracing::warn!("CAREDESK_ADMIN_PASSKEY not set, using development default");
                "123456".to_string()
            }
        };

        Self {
            bind_addr,
            database_path,
            admin_passkey,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("Caredesk"));
    }

    #[test]
    fn default_database_path_under_app_data() {
        let path = default_database_path();
        assert!(path.starts_with(app_data_dir()));
        assert!(path.ends_with("caredesk.db"));
    }

    #[test]
    fn app_name_is_caredesk() {
        assert_eq!(APP_NAME, "Caredesk");
    }
}
