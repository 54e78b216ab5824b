use crate::handlers;
use axum::{
    routing::{get, post},
    Router,
};
use disbursement_adapters::DisbursementService;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DisbursementService>,
    /// Fires on process shutdown; in-flight partner calls end with 503
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(service: DisbursementService, shutdown: CancellationToken) -> Self {
        Self {
            service: Arc::new(service),
            shutdown,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let disbursement = Router::new()
        .route("/:rail/banks", get(handlers::list_banks))
        .route("/single/:rail", post(handlers::transfer))
        .route("/status/:method/:ref_id", get(handlers::transfer_status));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/readiness", get(handlers::readiness))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/disbursement", disbursement)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
