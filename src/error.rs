use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failures a frame can hit on its way through the pipeline. Translated to an
/// HTTP status and a JSON body only at the response boundary; everything
/// upstream deals in these variants.
#[derive(Error, Debug)]
pub enum RestorationError {
    #[error("No frame provided")]
    MissingFrame,
    #[error("Frame decode failed: {0}")]
    Decode(String),
    #[error("Model not loaded")]
    ModelNotLoaded,
    #[error("Input shape mismatch: model expects {expected:?}, frame is {actual:?}")]
    ShapeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("Inference timed out after {0} ms")]
    InferenceTimeout(u64),
    #[error("Frame encode failed: {0}")]
    Encode(String),
}

impl RestorationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestorationError::MissingFrame | RestorationError::Decode(_) => {
                StatusCode::BAD_REQUEST
            }
            RestorationError::ModelNotLoaded
            | RestorationError::ShapeMismatch { .. }
            | RestorationError::Inference(_)
            | RestorationError::InferenceTimeout(_)
            | RestorationError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for RestorationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("failed to build inference session: {0}")]
    Session(#[from] ort::Error),
    #[error("model artifact declares no inputs")]
    NoInputs,
    #[error("model artifact declares no outputs")]
    NoOutputs,
}
