use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use jejuqa_core::badges::BadgeCheckQueue;
use jejuqa_core::notify::ActivityNotifier;
use jejuqa_core::store::CommunityStore;
use jejuqa_db::PgStore;
use jejuqa_events::{EventBus, EventBusNotifier, NotificationSink};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jejuqa_api::background;
use jejuqa_api::config::ServerConfig;
use jejuqa_api::router::build_app_router;
use jejuqa_api::state::{AppState, Services};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jejuqa_api=debug,jejuqa_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        base_points = config.adoption.base_points,
        badge_bonus = config.adoption.badge_bonus,
        "Loaded server configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = jejuqa_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    jejuqa_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    jejuqa_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let store: Arc<dyn CommunityStore> = Arc::new(PgStore::new(pool.clone()));

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let notifier: Arc<dyn ActivityNotifier> =
        Arc::new(EventBusNotifier::new(Arc::clone(&event_bus)));

    let sink_cancel = CancellationToken::new();
    let sink_handle = tokio::spawn(NotificationSink::run(
        pool.clone(),
        event_bus.subscribe(),
        sink_cancel.clone(),
    ));

    // --- Services ---
    let (badge_queue, badge_receiver) = BadgeCheckQueue::channel(config.badge_queue_capacity);
    let services = Services::new(Arc::clone(&store), &config, badge_queue, notifier);

    let badge_cancel = CancellationToken::new();
    let badge_handle = tokio::spawn(background::badge_checks::run(
        services.badges.clone(),
        badge_receiver,
        badge_cancel.clone(),
    ));
    tracing::info!("Background services started (badge checks, notification sink)");

    let state = AppState {
        config: Arc::new(config.clone()),
        store,
        services,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // The router owned the badge queue senders, so the queue is closed now.
    // Badge grants publish events, so the bus stays open until that drains.
    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    background::drain("badge checks", badge_handle, &badge_cancel, grace).await;
    drop(event_bus);
    background::drain("notification sink", sink_handle, &sink_cancel, grace).await;

    pool.close().await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
