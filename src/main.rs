//! Runboard binary entrypoint wiring configuration, the document store and the HTTP router.

use std::sync::Arc;

use anyhow::{Context, anyhow, bail};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use runboard::{
    config::{AppConfig, StoreBackend},
    dao::store::DocumentStore,
    routes,
    services::user_service,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("loading configuration")?;
    init_tracing(config.debug);
    config.log_summary();

    let store = connect_store(&config).await?;
    let app_state =
        AppState::new(store, config).map_err(|err| anyhow!("building session key: {err}"))?;

    if user_service::ensure_admin(&app_state)
        .await
        .context("creating the admin account")?
    {
        info!("created admin account from ADMIN_PASSWORD");
    }

    let addr = app_state.config().bind_addr();
    let app = build_router(app_state);

    info!(%addr, "starting server");
    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Open the configured document store.
async fn connect_store(config: &AppConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match config.store_backend {
        #[cfg(feature = "mongo-store")]
        StoreBackend::Mongo => {
            let store = runboard::dao::mongodb::MongoStore::connect(&config.mongo_uri, &config.mongo_db)
                .await
                .context("connecting to MongoDB")?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "memory-store")]
        StoreBackend::Memory => {
            tracing::warn!("using the in-memory store; data is lost on restart");
            Ok(Arc::new(runboard::dao::memory::MemoryStore::new()))
        }
        #[allow(unreachable_patterns)]
        backend => bail!("store backend {backend:?} is not compiled into this binary"),
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state).layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "debug,tower_http=debug"
    } else {
        "info,tower_http=debug"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "SIGTERM handler unavailable; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
