use crate::codec::Frame;
use crate::color::ChannelOrder;
use crate::error::RestorationError;
use ndarray::{ArrayD, Axis};

/// Model output above this maximum is taken to already be integer-scaled;
/// at or below it the tensor is treated as a [0, 1] signal.
const NORMALIZED_OUTPUT_CEILING: f32 = 1.5;

/// Maps a raw output tensor back into an 8-bit frame.
///
/// The output value range is not guaranteed by the model contract, so both
/// conventions are handled: a tensor whose maximum is at most 1.5 is scaled
/// by 255 before clipping and rounding, anything hotter is clipped and
/// rounded as-is. Accepts channels-first or channels-last layouts, with or
/// without a leading unit batch axis.
pub fn denormalize(tensor: ArrayD<f32>, order: ChannelOrder) -> Result<Frame, RestorationError> {
    let tensor = if tensor.ndim() == 4 && tensor.shape()[0] == 1 {
        tensor.index_axis_move(Axis(0), 0)
    } else {
        tensor
    };

    let (height, width, channels_first) = match tensor.shape() {
        [3, h, w] if *h > 0 && *w > 0 => (*h, *w, true),
        [h, w, 3] if *h > 0 && *w > 0 => (*h, *w, false),
        other => {
            return Err(RestorationError::Inference(format!(
                "unexpected output tensor shape {:?}",
                other
            )))
        }
    };

    let max = tensor.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let normalized = max <= NORMALIZED_OUTPUT_CEILING;

    let mut data = vec![0u8; height * width * 3];
    for y in 0..height {
        for x in 0..width {
            for c in 0..3 {
                let value = if channels_first {
                    tensor[[c, y, x]]
                } else {
                    tensor[[y, x, c]]
                };
                data[(y * width + x) * 3 + c] = quantize(value, normalized);
            }
        }
    }

    Ok(Frame::new(data, width as u32, height as u32, order))
}

fn quantize(value: f32, normalized: bool) -> u8 {
    if normalized {
        (value.clamp(0., 1.) * 255.).round() as u8
    } else {
        value.clamp(0., 255.).round() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, IxDyn};

    #[test]
    fn unit_range_output_is_scaled_to_bytes() {
        let mut tensor = Array::zeros(IxDyn(&[1, 3, 2, 2]));
        tensor[[0, 0, 0, 0]] = 1.0;
        tensor[[0, 1, 0, 0]] = 0.5;
        tensor[[0, 2, 1, 1]] = -0.25;

        let frame = denormalize(tensor, ChannelOrder::Rgb).unwrap();

        assert_eq!((frame.width(), frame.height()), (2, 2));
        assert_eq!(frame.data()[0], 255);
        assert_eq!(frame.data()[1], 128);
        assert_eq!(frame.data()[11], 0);
    }

    #[test]
    fn integer_scaled_output_is_clipped_and_rounded_directly() {
        let mut tensor = Array::zeros(IxDyn(&[1, 3, 1, 2]));
        tensor[[0, 0, 0, 0]] = 300.0;
        tensor[[0, 1, 0, 0]] = 127.4;
        tensor[[0, 2, 0, 1]] = -12.0;

        let frame = denormalize(tensor, ChannelOrder::Rgb).unwrap();

        assert_eq!(frame.data()[0], 255);
        assert_eq!(frame.data()[1], 127);
        assert_eq!(frame.data()[5], 0);
    }

    #[test]
    fn value_at_the_ceiling_takes_the_normalized_path() {
        let tensor = Array::from_elem(IxDyn(&[3, 1, 1]), 1.5);

        let frame = denormalize(tensor, ChannelOrder::Rgb).unwrap();

        // clipped to 1.0 before the 255 scale, not treated as a raw 1.5
        assert_eq!(frame.data(), &[255, 255, 255]);
    }

    #[test]
    fn channels_last_layout_is_accepted() {
        let mut tensor = Array::zeros(IxDyn(&[2, 2, 3]));
        tensor[[0, 0, 0]] = 1.0;
        tensor[[1, 1, 2]] = 1.0;

        let frame = denormalize(tensor, ChannelOrder::Rgb).unwrap();

        assert_eq!(frame.data()[0], 255);
        assert_eq!(frame.data()[11], 255);
    }

    #[test]
    fn unbatched_channels_first_layout_is_accepted() {
        let tensor = Array::from_elem(IxDyn(&[3, 4, 5]), 0.5);

        let frame = denormalize(tensor, ChannelOrder::Bgr).unwrap();

        assert_eq!((frame.height(), frame.width()), (4, 5));
        assert_eq!(frame.order(), ChannelOrder::Bgr);
    }

    #[test]
    fn non_three_channel_output_is_rejected() {
        let tensor = Array::zeros(IxDyn(&[1, 4, 8, 8]));

        let err = denormalize(tensor, ChannelOrder::Rgb).unwrap_err();

        assert!(matches!(err, RestorationError::Inference(_)));
    }
}
