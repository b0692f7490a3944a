//! Dynstory API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use dynstory_api::{middleware::AppState, router as api_router};
use dynstory_common::Config;
use dynstory_core::{
    AccountService, EmailService, FeedbackService, PrettyIdClient, QuestionService,
    SessionService, StoryService, VoteService,
};
use dynstory_db::repositories::{
    FeedbackRepository, QuestionRepository, SessionRepository, StoryRepository, UserRepository,
    VoteRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// API version prefix.
const API_PREFIX: &str = "/v1";

/// How often the background reaper sweeps expired sessions. Validity never
/// depends on this; session resolution checks the expiry itself.
const SESSION_REAPER_INTERVAL: Duration = Duration::from_secs(3600);

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

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dynstory=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting dynstory server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = dynstory_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    dynstory_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let session_repo = SessionRepository::new(Arc::clone(&db));
    let story_repo = StoryRepository::new(Arc::clone(&db));
    let question_repo = QuestionRepository::new(Arc::clone(&db));
    let vote_repo = VoteRepository::new(Arc::clone(&db));
    let feedback_repo = FeedbackRepository::new(Arc::clone(&db));

    // Initialize services
    let session_service = SessionService::new(session_repo);
    let account_service = AccountService::new(user_repo.clone(), session_service.clone());

    let pretty_ids = PrettyIdClient::new(&config.allocator);
    let story_service = StoryService::new(
        story_repo,
        user_repo.clone(),
        session_service.clone(),
        pretty_ids,
    );

    let vote_service = VoteService::new(vote_repo);
    let question_service = QuestionService::new(
        question_repo,
        session_service.clone(),
        vote_service,
        story_service.clone(),
    );

    let email_service = EmailService::new(config.email.clone())?;
    if !email_service.is_enabled() {
        // Integration setups run without SMTP; feedback delivery will
        // refuse until it is configured.
        tracing::warn!("SMTP not configured. Cannot handle emails.");
    }

    let feedback_service = FeedbackService::new(
        feedback_repo,
        user_repo,
        session_service.clone(),
        email_service.clone(),
    );

    // Spawn the background session reaper
    let reaper_sessions = session_service.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_REAPER_INTERVAL);
        loop {
            interval.tick().await;
            match reaper_sessions.delete_expired().await {
                Ok(0) => {}
                Ok(purged) => info!(purged, "Reaped expired sessions"),
                Err(e) => error!(error = %e, "Session reaper sweep failed"),
            }
        }
    });

    // Create app state
    let state = AppState {
        account_service,
        session_service,
        story_service,
        question_service,
        feedback_service,
        email_service,
    };

    // Build router
    let app = Router::new()
        .nest(API_PREFIX, api_router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Dynstory API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
