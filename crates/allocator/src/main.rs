//! Pretty-ID allocator server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use dynstory_allocator::{PrettyIdAllocator, router};
use dynstory_common::Config;
use dynstory_db::repositories::CounterRepository;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
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
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dynstory=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting dynstory pretty-ID allocator...");

    let config = Config::load()?;

    let db = dynstory_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    dynstory_db::migrate(&db).await?;
    info!("Migrations completed");

    let counter = CounterRepository::new(Arc::new(db));
    let allocator = PrettyIdAllocator::spawn(counter);

    let app = router(&config.allocator.path, allocator).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.allocator.port));
    info!("Pretty-ID allocator listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Allocator shutdown complete");
    Ok(())
}
