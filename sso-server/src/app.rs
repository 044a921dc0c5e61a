//! Server lifecycle — wiring, bind, serve, graceful shutdown

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use sso_auth::{Auth, SqliteStore};

use crate::config::ServerConfig;
use crate::http::router;
use crate::transport::AuthTransport;

/// Fully wired server, ready to bind
pub struct ServerApp {
    port: u16,
    router: Router,
}

impl ServerApp {
    /// Open storage, build the engine and the routes
    pub fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        let store = Arc::new(
            SqliteStore::open(&config.storage_path)
                .with_context(|| format!("failed to open storage at {}", config.storage_path))?,
        );
        let auth = Arc::new(Auth::new(&config.auth_config(), store.clone(), store)?);
        let transport = AuthTransport::new(auth, config.http.timeout());

        Ok(Self::with_transport(config.http.port, transport))
    }

    pub fn with_transport(port: u16, transport: AuthTransport) -> Self {
        Self { port, router: router(transport) }
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests
    pub async fn run<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        const OP: &str = "ServerApp.run";

        let listener = TcpListener::bind(("0.0.0.0", self.port))
            .await
            .with_context(|| format!("{OP}: failed to bind port {}", self.port))?;
        let addr = listener.local_addr().context(OP)?;

        info!(op = OP, port = self.port, addr = %addr, "starting server");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .context(OP)?;

        info!(op = OP, port = self.port, "server stopped");
        Ok(())
    }
}

/// Resolves on SIGINT or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!(signal = "SIGINT", "shutdown requested"),
        _ = terminate => info!(signal = "SIGTERM", "shutdown requested"),
    }
}
