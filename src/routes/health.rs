use crate::server::SharedState;
use axum::{extract::State, response::IntoResponse, response::Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct ServiceStatus {
    status: String,
    model_loaded: bool,
    active_model: Option<String>,
    model_path: String,
}

pub async fn healthcheck(State(state): State<SharedState>) -> impl IntoResponse {
    Json(ServiceStatus {
        status: "Available".into(),
        model_loaded: state.registry.is_loaded(),
        active_model: state.registry.active_id(),
        model_path: state.model_path.clone(),
    })
}
