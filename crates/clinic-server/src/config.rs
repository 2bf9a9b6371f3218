// Server configuration loaded from environment variables
// Decision: No DATABASE_URL means dev mode on the in-memory backend

use crate::auth::config::{parse_flag, AuthConfig};

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection string; None selects the in-memory backend
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// Apply pending migrations at startup
    pub run_migrations: bool,
    pub bind_addr: String,
    /// Origins allowed to make credentialed cross-origin requests
    pub cors_allowed_origins: Vec<String>,
    /// Return the national-ID initial password after staff-created registrations
    pub echo_credentials: bool,
    pub auth: AuthConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            database_max_connections: 10,
            run_migrations: true,
            bind_addr: "0.0.0.0:9000".to_string(),
            cors_allowed_origins: Vec::new(),
            echo_credentials: true,
            auth: AuthConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let database_max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.database_max_connections);

        let run_migrations = std::env::var("RUN_MIGRATIONS")
            .map(|v| parse_flag(&v))
            .unwrap_or(defaults.run_migrations);

        let bind_addr = std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr);

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .map(|s| split_list(&s))
            .unwrap_or_default();

        let echo_credentials = std::env::var("CLINIC_ECHO_CREDENTIALS")
            .map(|v| parse_flag(&v))
            .unwrap_or(defaults.echo_credentials);

        Self {
            database_url,
            database_max_connections,
            run_migrations,
            bind_addr,
            cors_allowed_origins,
            echo_credentials,
            auth: AuthConfig::from_env(),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
