use crate::color::ChannelOrder;
use crate::error::ModelLoadError;
use ndarray::{Array, ArrayD, Ix4};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::{TensorRef, ValueType},
};
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;

/// Spatial shape assumed when an artifact does not declare a static one.
pub const DEFAULT_INPUT_SHAPE: (u32, u32) = (256, 256);

/// A loaded restoration transform. Implementations take a `[1, 3, h, w]`
/// tensor with values in [0, 1] and return a tensor of the same spatial
/// shape; the output value range is not guaranteed.
pub trait ModelBackend: Send + Sync + 'static {
    fn run(&self, input: &Array<f32, Ix4>) -> Result<ArrayD<f32>, String>;
}

/// In-memory representation of a model artifact. The declared input shape and
/// channel order are fixed at load time and never mutated afterwards.
pub struct ModelHandle {
    id: String,
    input_shape: (u32, u32),
    channel_order: ChannelOrder,
    loaded_at: SystemTime,
    backend: Box<dyn ModelBackend>,
}

impl ModelHandle {
    pub fn new(
        id: impl Into<String>,
        input_shape: (u32, u32),
        channel_order: ChannelOrder,
        backend: Box<dyn ModelBackend>,
    ) -> Self {
        Self {
            id: id.into(),
            input_shape,
            channel_order,
            loaded_at: SystemTime::now(),
            backend,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Declared input spatial shape as (height, width).
    pub fn input_shape(&self) -> (u32, u32) {
        self.input_shape
    }

    pub fn channel_order(&self) -> ChannelOrder {
        self.channel_order
    }

    pub fn loaded_at(&self) -> SystemTime {
        self.loaded_at
    }

    pub fn run(&self, input: &Array<f32, Ix4>) -> Result<ArrayD<f32>, String> {
        self.backend.run(input)
    }
}

/// ONNX Runtime backend. The session is not assumed reentrant, so every
/// invocation takes the per-handle lock.
pub struct OrtBackend {
    session: Mutex<Session>,
    output_name: String,
}

impl OrtBackend {
    /// Builds a session from the artifact and introspects its declared input
    /// spatial shape once. Returns `None` for the shape when the artifact
    /// only declares dynamic dimensions.
    pub fn load(path: &Path) -> Result<(Self, Option<(u32, u32)>), ModelLoadError> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(path)?;

        let input = session.inputs.first().ok_or(ModelLoadError::NoInputs)?;
        let declared_shape = match &input.input_type {
            ValueType::Tensor { shape, .. } => spatial_shape(shape),
            _ => None,
        };

        let output_name = session
            .outputs
            .first()
            .ok_or(ModelLoadError::NoOutputs)?
            .name
            .clone();

        Ok((
            Self {
                session: Mutex::new(session),
                output_name,
            },
            declared_shape,
        ))
    }
}

impl ModelBackend for OrtBackend {
    fn run(&self, input: &Array<f32, Ix4>) -> Result<ArrayD<f32>, String> {
        let mut session = self
            .session
            .lock()
            .map_err(|e| format!("session mutex poisoned: {}", e))?;

        let tensor_ref = TensorRef::from_array_view(input.view())
            .map_err(|e| format!("failed to build tensor: {}", e))?;

        let input_tensor = ort::inputs![tensor_ref];

        let outputs = session
            .run(input_tensor)
            .map_err(|e| format!("inference failed: {}", e))?;

        let (shape, data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| format!("failed to extract tensor: {}", e))?;

        let ix = shape.to_ixdyn();
        let array = ArrayD::from_shape_vec(ix, data.to_vec())
            .map_err(|e| format!("invalid tensor shape: {}", e))?;

        Ok(array)
    }
}

/// Reads (height, width) out of a declared 4-dimensional tensor shape,
/// accepting both channels-first and channels-last layouts. Dynamic or
/// degenerate dimensions yield `None`.
fn spatial_shape(dimensions: &[i64]) -> Option<(u32, u32)> {
    match dimensions {
        [_, 3, h, w] if *h > 0 && *w > 0 => Some((*h as u32, *w as u32)),
        [_, h, w, 3] if *h > 0 && *w > 0 => Some((*h as u32, *w as u32)),
        _ => None,
    }
}
