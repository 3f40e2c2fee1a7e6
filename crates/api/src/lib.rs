//! Saga coordinator HTTP service.
//!
//! Exposes the start-saga and transaction-status endpoints over a
//! [`SagaCoordinator`], with structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{
    HttpParticipantClient, InMemoryTransactionStore, ParticipantClient, SagaCoordinator,
    TransactionStore,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::transactions::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S, C>(state: Arc<AppState<S, C>>, metrics_handle: PrometheusHandle) -> Router
where
    S: TransactionStore + Clone + 'static,
    C: ParticipantClient + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/create-order-saga",
            post(routes::transactions::create_order_saga::<S, C>),
        )
        .route(
            "/transaction-status",
            get(routes::transactions::transaction_status::<S, C>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wraps a store and participant client in application state.
pub fn create_state<S, C>(store: S, client: C) -> Arc<AppState<S, C>>
where
    S: TransactionStore + Clone + 'static,
    C: ParticipantClient + 'static,
{
    Arc::new(AppState {
        coordinator: SagaCoordinator::new(store, client),
    })
}

/// Creates the production state: an in-memory store and HTTP participants
/// at the configured URLs.
pub fn create_default_state(
    config: &Config,
) -> Arc<AppState<InMemoryTransactionStore, HttpParticipantClient>> {
    create_state(
        InMemoryTransactionStore::new(),
        HttpParticipantClient::new(config.endpoints()),
    )
}
