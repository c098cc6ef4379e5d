//! Contest reminder service: aggregates programming contests and emails subscribers

mod app;
mod config;
mod constants;
mod error;
mod handlers;
mod middlewares;
mod models;
mod services;
mod state;

#[cfg(test)]
mod tests;

use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{close_db, init_db, APP_CONFIG};
use crate::models::contest_type::ContestType;
use crate::services::codeforces::CodeforcesClient;
use crate::services::reminder::ReminderSweep;
use crate::services::sender::SesMailer;

// High-performance memory allocator for non-MSVC targets
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    info!("Starting contest-reminder...");

    let _sentry_guard = init_sentry();

    let db_pool = init_db().await?;

    // The fixed category rows are a startup invariant; refuse to run
    // without them.
    ContestType::verify_seed(&db_pool).await?;

    spawn_reminder_sweep(db_pool.clone());

    let state = state::AppState::new(db_pool, CodeforcesClient::new());
    let app = app::app(state);

    let port = &APP_CONFIG.server_port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    info!("Server running on http://0.0.0.0:{port}");
    info!(
        "Config: reminder_lead={}s, tick={}s",
        APP_CONFIG.reminder_lead_secs, APP_CONFIG.reminder_tick_secs
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cleanup
    info!("Shutting down...");
    close_db().await;

    // Flush Sentry events before exit
    if let Some(client) = sentry::Hub::current().client() {
        client.flush(Some(std::time::Duration::from_secs(2)));
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        () = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}

fn init_logger() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_owned());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)))
        .init();
}

fn init_sentry() -> sentry::ClientInitGuard {
    sentry::init((
        APP_CONFIG.sentry_dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            traces_sample_rate: APP_CONFIG.sentry_traces_sample_rate,
            sample_rate: 1.0,
            ..Default::default()
        },
    ))
}

fn spawn_reminder_sweep(db_pool: sqlx::SqlitePool) {
    let sweep = ReminderSweep::new(db_pool, SesMailer::new());
    tokio::spawn(sweep.run());
}
