//! # Quill Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

#[cfg(feature = "scheduler")]
mod background;
mod config;
mod handlers;
mod middleware;
mod session;
mod state;
mod telemetry;
mod views;

use config::AppConfig;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    tracing::info!("Starting Quill server on {}:{}", config.host, config.port);

    let state = AppState::new(&config)
        .await
        .map_err(std::io::Error::other)?;

    #[cfg(feature = "scheduler")]
    let mut scheduler = background::start_maintenance(
        background::SchedulerConfig {
            enabled: config.scheduler_enabled,
        },
        &state,
    )
    .await
    .map_err(std::io::Error::other)?;

    let server_state = state.clone();
    let result = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(server_state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    #[cfg(feature = "scheduler")]
    if let Err(e) = scheduler.shutdown().await {
        tracing::warn!(error = %e, "Scheduler shutdown failed");
    }

    result
}
