//! Service lifecycle management.
//!
//! Provides the main service runner with signal handling and graceful shutdown.

use std::sync::Arc;

use tokio::signal;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::api;
use crate::cluster::create_backend;
use crate::config::ConsoleConfig;
use crate::error::{ConsoleError, ConsoleResult};
use crate::reconcile::Reconciler;
use crate::workfile::ValuesWorkdir;

/// The console service.
///
/// Manages the lifecycle of the console:
/// - Cluster backend
/// - Deployment reconciler
/// - HTTP API server
/// - Signal handling and graceful shutdown
pub struct ConsoleService {
    config: ConsoleConfig,
    cancel: CancellationToken,
}

impl ConsoleService {
    /// Create a new console service with the given configuration.
    #[must_use]
    pub fn new(config: ConsoleConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Run the console service until a shutdown signal arrives.
    pub async fn run(&self) -> ConsoleResult<()> {
        let cluster = create_backend(&self.config.cluster);
        info!(backend = ?self.config.cluster.backend, "cluster backend configured");

        let workdir = ValuesWorkdir::new(&self.config.paths.working_file);
        let reconciler = Arc::new(Reconciler::new(cluster, workdir));
        info!(
            working_file = %self.config.paths.working_file.display(),
            "reconciler initialised"
        );

        let state = api::AppState {
            reconciler,
            values_path: self.config.paths.values_file.clone(),
            defaults: self.config.helm.clone(),
            last_persisted: Arc::new(Mutex::new(None)),
        };

        let app = api::router(state);

        let listener = tokio::net::TcpListener::bind(self.config.server.listen_addr)
            .await
            .map_err(|e| {
                ConsoleError::Config(format!(
                    "failed to bind {}: {e}",
                    self.config.server.listen_addr
                ))
            })?;

        info!(addr = %self.config.server.listen_addr, "console listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(self.cancel.clone()))
            .await
            .map_err(|e| ConsoleError::Config(format!("server error: {e}")))?;

        info!("console shutdown complete");
        Ok(())
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            info!("received SIGTERM, initiating shutdown");
        }
        () = cancel.cancelled() => {
            info!("shutdown requested");
        }
    }
}
