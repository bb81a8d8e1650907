//! geoschool service - HTTP API for schools sorted by distance.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `PORT` | HTTP server port | 3000 |
//! | `SCHOOLS_DB_PATH` | SQLite database file, or `:memory:` | `schools.db` |
//! | `RUST_LOG` | Log level (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `GET /` - Service banner and health check
//! - `POST /api/addSchool` - Add a school
//! - `GET /api/listSchools?latitude=X&longitude=Y` - Schools sorted by distance
//! - `GET /docs` - OpenAPI documentation (Swagger UI)

use std::net::SocketAddr;
use std::sync::Arc;

use geoschool_service::{app, AppState, ServiceConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "geoschool_service=info,geoschool=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::from_env();

    tracing::info!(
        port = config.port,
        database = %config.database_path,
        "Starting school service"
    );

    let store = match config.open_store() {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, database = %config.database_path, "Database connection failed");
            return Err(e.into());
        }
    };
    tracing::info!("Database connected successfully");

    let state = Arc::new(AppState::new(store));
    let app = app(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let port = config.port;
    tracing::info!("Server is running on port {port}");
    tracing::info!("Health check: http://localhost:{port}");
    tracing::info!("Add School: POST http://localhost:{port}/api/addSchool");
    tracing::info!(
        "List Schools: GET http://localhost:{port}/api/listSchools?latitude=LAT&longitude=LON"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
