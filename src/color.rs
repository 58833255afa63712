use crate::codec::Frame;
use serde::Deserialize;

/// Interleaved channel ordering of a [`Frame`]'s pixel data.
///
/// The codec always produces `Rgb`; a model trained under a BGR convention
/// declares `bgr` in its configuration and the pipeline swaps on the way in
/// and back out.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Bgr,
}

/// Reorders the frame's channels to `to`. A no-op when the frame already
/// carries that ordering; otherwise swaps the first and third byte of every
/// pixel in place.
pub fn convert(frame: Frame, to: ChannelOrder) -> Frame {
    if frame.order() == to {
        return frame;
    }

    let (mut data, width, height, _) = frame.into_parts();
    for pixel in data.chunks_exact_mut(3) {
        pixel.swap(0, 2);
    }

    Frame::new(data, width, height, to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> Frame {
        let data = vec![
            10, 20, 30, //
            40, 50, 60, //
            70, 80, 90, //
            100, 110, 120,
        ];
        Frame::new(data, 2, 2, ChannelOrder::Rgb)
    }

    #[test]
    fn conversion_swaps_first_and_third_channel() {
        let converted = convert(sample_frame(), ChannelOrder::Bgr);

        assert_eq!(converted.order(), ChannelOrder::Bgr);
        assert_eq!(&converted.data()[..3], &[30, 20, 10]);
        assert_eq!(&converted.data()[9..], &[120, 110, 100]);
    }

    #[test]
    fn conversion_to_same_order_is_identity() {
        let frame = sample_frame();
        let expected = frame.data().to_vec();

        let converted = convert(frame, ChannelOrder::Rgb);

        assert_eq!(converted.data(), expected.as_slice());
    }

    #[test]
    fn round_trip_is_bit_identical() {
        let original = sample_frame();
        let expected = original.data().to_vec();

        let there = convert(original, ChannelOrder::Bgr);
        let back = convert(there, ChannelOrder::Rgb);

        assert_eq!(back.order(), ChannelOrder::Rgb);
        assert_eq!(back.data(), expected.as_slice());
    }
}
