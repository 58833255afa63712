use crate::codec::Frame;
use crate::error::RestorationError;
use crate::model::ModelHandle;
use ndarray::{Array, ArrayD, Ix4};

/// Converts an interleaved 8-bit frame into a `[1, 3, h, w]` tensor with
/// values scaled to [0, 1].
pub fn frame_to_tensor(frame: &Frame) -> Array<f32, Ix4> {
    let h = frame.height() as usize;
    let w = frame.width() as usize;
    let data = frame.data();

    let mut input = Array::zeros((1, 3, h, w));
    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) * 3;
            input[[0, 0, y, x]] = (data[idx] as f32) / 255.;
            input[[0, 1, y, x]] = (data[idx + 1] as f32) / 255.;
            input[[0, 2, y, x]] = (data[idx + 2] as f32) / 255.;
        }
    }

    input
}

/// Runs the handle's transform against a normalized frame. The frame's
/// spatial shape is validated against the handle's declared shape before the
/// backend sees it; the backend's own behavior on malformed input is not
/// trusted.
pub fn invoke(handle: &ModelHandle, frame: &Frame) -> Result<ArrayD<f32>, RestorationError> {
    let expected = handle.input_shape();
    let actual = (frame.height(), frame.width());
    if expected != actual {
        return Err(RestorationError::ShapeMismatch { expected, actual });
    }

    let input = frame_to_tensor(frame);
    handle.run(&input).map_err(RestorationError::Inference)
}
