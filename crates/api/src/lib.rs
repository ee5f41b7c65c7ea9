//! HTTP API server for the barbecue facility reservation system.
//!
//! Provides JSON endpoints for members, reservations, fee payments, and
//! bulletins, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::FacilityConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use workflow::SystemClock;

use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store>(state: Arc<AppState<S>>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/api/criar-reserva", post(routes::reservas::criar::<S>))
        .route("/api/listar-reservas", get(routes::reservas::listar::<S>))
        .route(
            "/api/verificar-disponibilidade",
            get(routes::reservas::disponibilidade::<S>),
        )
        .route(
            "/api/cancelar-reserva/{id}",
            post(routes::reservas::cancelar::<S>),
        )
        .route(
            "/api/taxa/confirmar-pagamento",
            post(routes::taxas::confirmar::<S>),
        )
        .route("/api/associado/criar", post(routes::associados::criar::<S>))
        .route(
            "/api/associado/verificar/{cpf}",
            get(routes::associados::verificar::<S>),
        )
        .route("/api/boletim/criar", post(routes::boletins::criar::<S>))
        .route("/api/boletins", get(routes::boletins::listar::<S>))
        .route("/api/estatisticas", get(routes::estatisticas::obter::<S>))
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

/// Creates the default application state over a store, with the wall clock.
pub fn create_default_state<S: Store>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState::new(
        Arc::new(store),
        FacilityConfig::default(),
        Arc::new(SystemClock),
    ))
}
