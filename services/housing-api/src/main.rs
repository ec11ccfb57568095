//! Housing API HTTP service entry point.
//!
//! # Purpose
//! Wires configuration, storage, token handling, and the HTTP router, then
//! starts the API server and the metrics listener.
//!
//! # Notes
//! The `build_state` helper keeps wiring testable and minimizes main setup logic.
mod api;
mod app;
mod auth;
mod config;
mod model;
mod observability;
mod service;
mod store;

use anyhow::Context;
use app::{AppState, build_router};
use housing_authz::{TokenIssuer, TokenVerifier};
use service::{RecordService, ServiceOptions};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use store::{HousingStore, memory::InMemoryStore, postgres::PostgresStore};

/// Clock skew tolerated when checking token expiry.
const TOKEN_LEEWAY_SECONDS: u64 = 30;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::HousingConfig::from_env_or_yaml().context("housing config")?;
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: config::HousingConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability("housing-api");
    let state = build_state(config.clone()).await?;
    if config.uses_dev_secret() {
        tracing::warn!("HOUSING_JWT_SECRET not set; signing tokens with the development secret");
    }
    if !config.strict_ownership {
        tracing::warn!(
            "strict ownership disabled; any authenticated user may edit or delete forum posts \
             and any rental agreement in their scope"
        );
    }
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));

    let app = build_router(state.clone());

    let addr = config.bind_addr;
    tracing::info!(
        %addr,
        storage = state.service.backend_name(),
        "housing api listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }

    metrics_task.abort();
    let _ = metrics_task.await;
    Ok(())
}

async fn build_state(config: config::HousingConfig) -> anyhow::Result<AppState> {
    let store: Arc<dyn HousingStore + Send + Sync> = match config.storage {
        config::StorageBackend::Memory => Arc::new(InMemoryStore::new()),
        config::StorageBackend::Postgres => {
            let pg = config
                .postgres
                .as_ref()
                .context("postgres configuration missing")?;
            Arc::new(PostgresStore::connect(pg).await?)
        }
    };

    let secret = config.jwt_secret.as_bytes();
    let issuer = TokenIssuer::new(
        secret,
        config.jwt_issuer.clone(),
        Duration::from_secs(config.token_ttl_seconds),
    )
    .context("token issuer")?;
    let verifier = TokenVerifier::new(secret, config.jwt_issuer.clone(), TOKEN_LEEWAY_SECONDS)
        .context("token verifier")?;

    Ok(AppState {
        service: RecordService::new(
            store,
            ServiceOptions {
                forum_max_depth: config.forum_max_depth,
                strict_ownership: config.strict_ownership,
            },
        ),
        issuer,
        verifier,
    })
}
