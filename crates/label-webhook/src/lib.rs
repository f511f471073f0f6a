pub mod api;
mod certs;
pub mod cli;
pub mod config;
pub mod tracing;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use ::tracing::{info, warn};
use anyhow::Result;
use axum::{
    Router,
    routing::{get, post},
};
use axum_server::{Handle, tls_rustls::RustlsConfig};
use tower_http::trace::{self, TraceLayer};

use crate::api::{
    handlers::{
        mutate_handler, not_found_handler, readiness_handler, validate_handler,
    },
    state::ApiServerState,
};
use crate::config::Config;

pub struct LabelWebhook {
    router: Router,
    addr: SocketAddr,
    tls_config: Option<RustlsConfig>,
}

impl LabelWebhook {
    pub async fn new_from_config(config: Config) -> Result<Self> {
        let policy = config.policy;

        let settings = policy.settings();
        info!(
            governed_kind = settings.governed_kind.as_str(),
            governed_namespace = settings.governed_namespace.as_str(),
            required_labels = ?settings.required_labels,
            validation_check_mode = ?settings.validation_check_mode,
            "policy loaded"
        );

        let state = Arc::new(ApiServerState { policy });

        let tls_config = match &config.tls_config {
            Some(tls_config) => Some(certs::create_tls_config(tls_config).await?),
            None => None,
        };

        let router = Router::new()
            .route("/validate", post(validate_handler))
            .route("/mutate", post(mutate_handler))
            .route("/readiness", get(readiness_handler))
            .fallback(not_found_handler)
            .with_state(state)
            .layer(
                TraceLayer::new_for_http()
                    .on_response(trace::DefaultOnResponse::new().level(::tracing::Level::DEBUG))
                    .on_failure(trace::DefaultOnFailure::new().level(::tracing::Level::ERROR)),
            );

        Ok(Self {
            router,
            addr: config.addr,
            tls_config,
        })
    }

    pub async fn run(self) -> Result<()> {
        let handle = Handle::new();
        tokio::spawn(shutdown_signal(handle.clone()));

        match self.tls_config {
            None => {
                info!(address = self.addr.to_string().as_str(), "started HTTP server");
                axum_server::bind(self.addr)
                    .handle(handle)
                    .serve(self.router.into_make_service())
                    .await?;
            }
            Some(tls_config) => {
                info!(address = self.addr.to_string().as_str(), "started HTTPS server");
                axum_server::bind_rustls(self.addr, tls_config)
                    .handle(handle)
                    .serve(self.router.into_make_service())
                    .await?;
            }
        }

        info!("server stopped");
        Ok(())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for ctrl-c");
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
                warn!(error = %e, "cannot listen for SIGTERM");
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

    info!("shutdown signal received, draining connections");
    handle.graceful_shutdown(Some(Duration::from_secs(10)));
}
