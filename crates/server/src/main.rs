//! Warden authentication server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use warden_application::{AuthOrchestrator, AuthPorts};
use warden_infrastructure::{
    Expiring, InMemoryKeyValueStore, InMemorySessionStore, InMemoryUserRepository,
    ReqwestProviderGateway, Settings, SystemClock, TracingEventSink, spawn_sweeper,
};
use warden_server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load().context("failed to load settings")?;

    let clock = Arc::new(SystemClock::new());
    let key_value = Arc::new(InMemoryKeyValueStore::new(clock.clone()));
    let sessions = Arc::new(InMemorySessionStore::new(clock.clone()));
    let expiring: Vec<Arc<dyn Expiring>> = vec![key_value.clone(), sessions.clone()];
    let sweeper = spawn_sweeper(expiring, settings.store.sweep_interval());
    let ports = AuthPorts {
        clock,
        key_value,
        sessions,
        users: Arc::new(InMemoryUserRepository::new()),
        events: Arc::new(TracingEventSink::new()),
    };
    let engine = AuthOrchestrator::new(&settings.auth, ports).context("invalid signing key")?;
    let gateway = ReqwestProviderGateway::new(settings.providers.clone())
        .context("failed to build provider gateway")?;

    let addr: SocketAddr = settings
        .server
        .bind_address()
        .parse()
        .context("invalid bind address")?;

    tracing::info!(
        "Starting Warden server v{} on {}",
        env!("CARGO_PKG_VERSION"),
        addr
    );

    let app = warden_server::router(AppState::new(engine, Arc::new(gateway), settings.server));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.abort();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
