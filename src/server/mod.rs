use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::server::dashboard::Dashboard;
use crate::service::{AdvisoryService, VersionRegistry};
use crate::storage::SqliteStore;
use crate::ui;

pub mod dashboard;
pub mod params;
pub mod routes;

/// Static asset directories served under `/<dir>`
pub const STATIC_DIRS: &[&str] = &["css", "js", "img"];

/// Server state
pub struct AppState {
    pub advisories: AdvisoryService,
    pub registry: VersionRegistry,
    pub dashboard: Dashboard,
}

impl AppState {
    pub fn new(store: SqliteStore) -> crate::Result<Self> {
        Ok(Self {
            advisories: AdvisoryService::new(store.clone()),
            registry: VersionRegistry::new(store),
            dashboard: Dashboard::new()?,
        })
    }
}

/// Build the route table. Every (method, path) maps to exactly one handler.
pub fn router(state: Arc<AppState>, static_dir: &Path) -> Router {
    let mut app = Router::new()
        .route(routes::DASHBOARD, get(routes::dashboard))
        .route(
            routes::ADVISORIES,
            get(routes::list_advisories)
                .put(routes::put_advisory)
                .delete(routes::delete_advisory),
        )
        .route(
            routes::SERVICES,
            get(routes::list_services).put(routes::put_service_version),
        );

    for dir in STATIC_DIRS {
        app = app.nest_service(&format!("/{}", dir), ServeDir::new(static_dir.join(dir)));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(addr: SocketAddr, store: SqliteStore, static_dir: &Path) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(store)?);
    let app = router(Arc::clone(&state), static_dir);

    tracing::info!("Starting server on {}", addr);
    ui::field(ui::Icons::GLOBE, "Server running at", &format!("http://{}", addr));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let removed = clear_versions(&state).await?;
    tracing::info!("Server stopped, cleared {} version reports", removed);
    ui::done("Server stopped");

    Ok(())
}

/// Drop every version report once serving has ended; they only describe
/// the run that collected them.
pub async fn clear_versions(state: &Arc<AppState>) -> anyhow::Result<usize> {
    let state = Arc::clone(state);
    let removed = tokio::task::spawn_blocking(move || state.registry.clear_all()).await??;
    Ok(removed)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
