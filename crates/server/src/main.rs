//! Gather server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use gather_api::{AppState, router as api_router};
use gather_common::Config;
use gather_core::{
    AuthorizationGate, EngagementService, EventService, MetricsService, NotificationSender,
    RoleService, ShareService, SmtpNotifier, SuggestionService, UserService,
};
use gather_db::repositories::{
    EventRepository, FavoriteRepository, RegistrationRepository, RoleRepository, ShareRepository,
    UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
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
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gather=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting gather server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database and run migrations
    let db = gather_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    gather_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let role_repo = RoleRepository::new(Arc::clone(&db));
    let user_repo = UserRepository::new(Arc::clone(&db));
    let event_repo = EventRepository::new(Arc::clone(&db));
    let registration_repo = RegistrationRepository::new(Arc::clone(&db));
    let favorite_repo = FavoriteRepository::new(Arc::clone(&db));
    let share_repo = ShareRepository::new(Arc::clone(&db));

    // Optional email backend for share notifications
    let notifier: Option<Arc<dyn NotificationSender>> = match &config.email {
        Some(email) => {
            info!(smtp_host = %email.smtp_host, "Email delivery enabled");
            Some(Arc::new(SmtpNotifier::new(email)?))
        }
        None => {
            info!("No email configuration, share notifications disabled");
            None
        }
    };

    // Initialize services
    let gate = AuthorizationGate::new(user_repo.clone(), &config);
    let role_service = RoleService::new(role_repo);
    let user_service = UserService::new(
        user_repo.clone(),
        gate.clone(),
        config.roles.user_role_id.clone(),
    );
    let event_service = EventService::new(event_repo.clone(), gate);
    let engagement_service = EngagementService::new(
        Arc::clone(&db),
        registration_repo.clone(),
        favorite_repo.clone(),
        event_repo.clone(),
    );
    let suggestion_service = SuggestionService::new(
        registration_repo.clone(),
        favorite_repo.clone(),
        event_repo.clone(),
    );
    let metrics_service = MetricsService::new(
        event_repo.clone(),
        registration_repo,
        favorite_repo,
        share_repo.clone(),
    );
    let share_service = ShareService::new(event_repo, user_repo, share_repo, notifier);

    // Seed the built-in roles
    role_service.ensure_seed_roles(&config.roles).await?;

    let state = AppState {
        role_service,
        user_service,
        event_service,
        engagement_service,
        suggestion_service,
        metrics_service,
        share_service,
    };

    let app = api_router()
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
