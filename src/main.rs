//! Tasker API server.
//!
//! # Environment Variables
//!
//! - `HOST`: Server host address (default: `0.0.0.0`)
//! - `PORT`: Server port (default: `5000`)
//! - `JWT_SECRET`: token signing key, at least 16 bytes (required)
//! - `JWT_EXPIRE_DAYS`: token lifetime in days, 1 to 3650 (default: `30`)
//! - `STORAGE_MODE`: `in_memory` (default) | `postgres`
//! - `DATABASE_URL`: `PostgreSQL` connection URL (required when `STORAGE_MODE=postgres`)
//! - `BODY_LIMIT_BYTES`: maximum request body (default: 50 MiB)
//! - `ENABLE_CLEAR_DATABASE`: mount `DELETE /api/clear-database` (needs the `maintenance` feature)
//! - `RUST_LOG`: Logging level (e.g., `debug`, `tasker=debug`)
//! - `LOG_FORMAT`: `text` (default) | `json`
//! - `WORKER_THREADS`: Number of tokio worker threads (default: logical CPU count)

use std::net::SocketAddr;
use std::num::NonZeroUsize;

use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tasker::api::{AppConfig, AppState, router};
use tasker::auth::TokenService;
use tasker::config::{LogFormat, Settings};
use tasker::infrastructure::RepositoryFactory;

/// Reads the `WORKER_THREADS` override.
///
/// Unset or blank means "use the tokio default". Anything that is not a
/// positive integer is rejected with a message for the operator.
fn parse_worker_threads(value: Option<&str>) -> Result<Option<NonZeroUsize>, String> {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    value
        .parse::<NonZeroUsize>()
        .map(Some)
        .map_err(|error| format!("WORKER_THREADS={value:?} ignored: {error}"))
}

fn main() {
    dotenvy::dotenv().ok();

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();

    match parse_worker_threads(std::env::var("WORKER_THREADS").ok().as_deref()) {
        Ok(Some(threads)) => {
            builder.worker_threads(threads.get());
        }
        Ok(None) => {}
        // Tracing is not installed until the runtime is running.
        Err(message) => eprintln!("{message}"),
    }

    let runtime = match builder.build() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("Failed to create tokio runtime: {error}");
            std::process::exit(1);
        }
    };
    runtime.block_on(async_main());
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tasker=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn async_main() {
    let settings = Settings::from_env();
    init_tracing(
        settings
            .as_ref()
            .map_or_else(|_| LogFormat::default(), |settings| settings.log_format),
    );

    let settings = match settings {
        Ok(settings) => settings,
        Err(error) => {
            tracing::error!("Configuration error: {}", error);
            std::process::exit(1);
        }
    };

    tracing::info!(
        storage_mode = ?settings.repository.storage_mode,
        log_format = ?settings.log_format,
        "Starting Tasker API"
    );

    if settings.enable_clear_database && !cfg!(feature = "maintenance") {
        tracing::warn!(
            "ENABLE_CLEAR_DATABASE is set but this binary was built without the maintenance feature"
        );
    }

    let factory = RepositoryFactory::new(settings.repository.clone());
    let repositories = match factory.create().await {
        Ok(repositories) => {
            tracing::info!("Repositories initialized successfully");
            repositories
        }
        Err(error) => {
            tracing::error!("Failed to initialize repositories: {}", error);
            std::process::exit(1);
        }
    };

    let state = AppState::with_config(
        repositories,
        TokenService::new(&settings.auth),
        AppConfig::from_settings(&settings),
    );
    let application = router(state);

    let address: SocketAddr = match settings.server.bind_address().parse() {
        Ok(address) => address,
        Err(error) => {
            tracing::error!(%error, "Invalid server address: {}", settings.server.bind_address());
            std::process::exit(1);
        }
    };

    let listener = match TcpListener::bind(address).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, "Failed to bind to address {}", address);
            std::process::exit(1);
        }
    };

    match listener.local_addr() {
        Ok(address) => tracing::info!("Listening on {}", address),
        Err(error) => tracing::warn!(%error, "Could not determine local address"),
    }

    if let Err(error) = axum::serve(listener, application)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(%error, "Server error");
        std::process::exit(1);
    }

    tracing::info!("Server shutdown complete");
}

/// Waits for SIGINT, or SIGTERM on Unix, and logs which one arrived.
///
/// A handler that cannot be installed never fires, so the other one still
/// stops the server.
async fn shutdown_signal() {
    async fn interrupt() {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "SIGINT handler unavailable");
            std::future::pending::<()>().await;
        }
    }

    #[cfg(unix)]
    async fn terminate() {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    }

    #[cfg(not(unix))]
    async fn terminate() {
        std::future::pending::<()>().await;
    }

    let received = tokio::select! {
        () = interrupt() => "SIGINT",
        () = terminate() => "SIGTERM",
    };
    tracing::info!(signal = received, "Shutting down, draining open connections");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some("  "), None)]
    #[case(Some("4"), Some(4))]
    #[case(Some(" 12 "), Some(12))]
    #[case(Some("512"), Some(512))]
    fn test_parse_worker_threads_accepts(
        #[case] input: Option<&str>,
        #[case] expected: Option<usize>,
    ) {
        let threads = parse_worker_threads(input).unwrap();
        assert_eq!(threads.map(NonZeroUsize::get), expected);
    }

    #[rstest]
    #[case("0")]
    #[case("-2")]
    #[case("lots")]
    fn test_parse_worker_threads_rejects(#[case] input: &str) {
        let message = parse_worker_threads(Some(input)).unwrap_err();
        assert!(message.starts_with("WORKER_THREADS="));
    }
}
