// Clinic server
// Decision: PostgreSQL when DATABASE_URL is set, otherwise the in-memory dev backend
// Decision: The bootstrap administrator is created at startup when configured

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use clinic_core::telemetry::{init_telemetry, TelemetryConfig};
use clinic_server::services::Registrar;
use clinic_server::storage::StorageBackend;
use clinic_server::{build_router, AppConfig};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // RUST_LOG overrides the default filter
    let mut telemetry_config = TelemetryConfig::from_env();
    if telemetry_config.service_name == "clinic" {
        telemetry_config.service_name = "clinic-server".to_string();
    }
    if telemetry_config.log_filter.is_none() {
        telemetry_config.log_filter = Some("clinic_server=debug,tower_http=debug".to_string());
    }
    telemetry_config.service_version = Some(env!("CARGO_PKG_VERSION").to_string());
    init_telemetry(telemetry_config);

    tracing::info!("clinic-server starting...");

    let config = AppConfig::from_env();

    let storage = match &config.database_url {
        Some(url) => {
            let storage = StorageBackend::postgres(url, config.database_max_connections)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            if config.run_migrations {
                storage
                    .migrate()
                    .await
                    .context("Failed to run database migrations")?;
                tracing::info!("Database migrations applied");
            }
            storage
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage (data is lost on exit)");
            StorageBackend::in_memory()
        }
    };

    if let Some(admin) = &config.auth.admin {
        Registrar::new(storage.clone(), config.echo_credentials)
            .ensure_admin(&admin.username, &admin.password)
            .await
            .context("Failed to create bootstrap admin")?;
    }

    let cors_origins = parse_origins(&config.cors_allowed_origins);
    if cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?cors_origins, "CORS origins configured");
    }

    let app = with_cors(build_router(storage, &config), cors_origins);
    let app = app.layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("HTTP server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Keep only origins that are valid header values
fn parse_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins.iter().filter_map(|o| o.parse().ok()).collect()
}

/// Add a credentialed CORS layer when origins are configured
fn with_cors(app: Router, origins: Vec<HeaderValue>) -> Router {
    if origins.is_empty() {
        return app;
    }

    app.layer(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([
                header::CONTENT_TYPE,
                header::ACCEPT,
                header::ORIGIN,
                header::CACHE_CONTROL,
            ])
            .allow_credentials(true),
    )
}
