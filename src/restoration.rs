use crate::codec::{self, Frame};
use crate::color::{self, ChannelOrder};
use crate::config::PipelineConfig;
use crate::error::RestorationError;
use crate::geometry;
use crate::inference;
use crate::model::ModelHandle;
use crate::postprocess;
use crate::registry::ModelRegistry;
use ndarray::ArrayD;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Per-request pipeline: decode, convert, resize, invoke, denormalize,
/// restore, convert back, encode. Every stage is a pure computation over
/// request-local data; the registry read is the only shared access.
pub struct RestorationService {
    registry: Arc<ModelRegistry>,
    jpeg_quality: u8,
    inference_timeout: Duration,
}

impl RestorationService {
    pub fn new(registry: Arc<ModelRegistry>, config: &PipelineConfig) -> Self {
        Self {
            registry,
            jpeg_quality: config.jpeg_quality,
            inference_timeout: Duration::from_millis(config.inference_timeout_ms),
        }
    }

    #[instrument(skip(self, payload))]
    pub async fn restore_frame(
        &self,
        payload: &str,
        model_id: Option<&str>,
    ) -> Result<String, RestorationError> {
        let handle = self
            .registry
            .get(model_id)
            .ok_or(RestorationError::ModelNotLoaded)?;

        let frame = codec::decode_frame(payload)?;
        let original_h = frame.height();
        let original_w = frame.width();

        let frame = color::convert(frame, handle.channel_order());

        let (target_h, target_w) = handle.input_shape();
        let normalized = geometry::resize(&frame, target_h, target_w);
        let input_range = byte_range(&normalized);

        let output = self.invoke_with_timeout(handle.clone(), normalized).await?;

        tracing::debug!(
            model = handle.id(),
            original_w,
            original_h,
            input_range = ?input_range,
            output_shape = ?output.shape(),
            output_range = ?value_range(&output),
            "inference complete"
        );

        let restored = postprocess::denormalize(output, handle.channel_order())?;
        let restored = geometry::restore(&restored, original_h, original_w);
        let restored = color::convert(restored, ChannelOrder::Rgb);

        codec::encode_frame(&restored, self.jpeg_quality)
    }

    /// Runs the blocking model invocation off the async runtime, bounded by
    /// the configured timeout. A stalled transform surfaces as a dedicated
    /// timeout error instead of wedging the frame stream.
    async fn invoke_with_timeout(
        &self,
        handle: Arc<ModelHandle>,
        frame: Frame,
    ) -> Result<ArrayD<f32>, RestorationError> {
        let invocation = tokio::task::spawn_blocking(move || inference::invoke(&handle, &frame));

        match tokio::time::timeout(self.inference_timeout, invocation).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(RestorationError::Inference(join_error.to_string())),
            Err(_) => Err(RestorationError::InferenceTimeout(
                self.inference_timeout.as_millis() as u64,
            )),
        }
    }
}

fn byte_range(frame: &Frame) -> (u8, u8) {
    let min = frame.data().iter().copied().min().unwrap_or(0);
    let max = frame.data().iter().copied().max().unwrap_or(0);
    (min, max)
}

fn value_range(tensor: &ArrayD<f32>) -> (f32, f32) {
    let min = tensor.iter().copied().fold(f32::INFINITY, f32::min);
    let max = tensor.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    (min, max)
}
