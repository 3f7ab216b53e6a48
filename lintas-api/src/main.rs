use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use lintas_api::{app, state::{AppState, AuthConfig}};
use lintas_booking::{HoldPolicy, Reaper};
use lintas_core::store::ReservationStore;
use lintas_store::PgReservationStore;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lintas_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = lintas_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Lintas API on port {}", config.server.port);

    // Postgres connection + schema
    let db = lintas_store::DbClient::new(&config.database.url, config.database.max_connections)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let store: Arc<dyn ReservationStore> = Arc::new(PgReservationStore::new(db.pool.clone()));

    let rules = &config.business_rules;
    let app_state = AppState::new(
        store.clone(),
        HoldPolicy {
            hold_ttl: chrono::Duration::seconds(rules.hold_ttl_seconds as i64),
            base_fare_amount: rules.base_fare_amount,
            fare_currency: rules.fare_currency.clone(),
        },
        AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    );

    // Expiry reaper: owned by the process, stopped on shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reaper = Reaper::new(
        store,
        Duration::from_secs(rules.reaper_interval_seconds),
    );
    let reaper_handle = tokio::spawn(reaper.run(shutdown_rx));

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    let _ = shutdown_tx.send(true);
    let _ = reaper_handle.await;
    tracing::info!("Shutdown complete");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
}
