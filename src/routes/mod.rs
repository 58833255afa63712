mod health;
mod metrics;
mod process_frame;

use crate::server::SharedState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(health::healthcheck))
        .route("/process_frame", post(process_frame::process_frame))
        .route("/metrics", get(metrics::metrics_handler))
}
