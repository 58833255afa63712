use crate::{error::RestorationError, server::SharedState};
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::instrument;

#[derive(Deserialize)]
pub struct ProcessFrameRequest {
    pub frame: Option<String>,
    pub model: Option<String>,
}

#[derive(Serialize)]
pub struct ProcessFrameResponse {
    pub status: String,
    pub frame: String,
}

#[instrument(skip(state, request))]
pub async fn process_frame(
    State(state): State<SharedState>,
    Json(request): Json<ProcessFrameRequest>,
) -> Result<Json<ProcessFrameResponse>, RestorationError> {
    state.metrics.record_request("process_frame");

    let payload = request.frame.ok_or(RestorationError::MissingFrame)?;

    let started = Instant::now();
    let frame = state
        .restoration_service
        .restore_frame(&payload, request.model.as_deref())
        .await?;
    state
        .metrics
        .record_restoration_duration(started.elapsed().as_millis() as u64, "process_frame");

    Ok(Json(ProcessFrameResponse {
        status: "success".into(),
        frame,
    }))
}
