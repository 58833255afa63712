use crate::codec::Frame;
use image::{imageops, imageops::FilterType, ImageBuffer, Rgb};

/// Resamples the frame to the model's declared spatial shape. Direct,
/// non-aspect-preserving bilinear resize; distortion is accepted and undone
/// geometrically by [`restore`].
pub fn resize(frame: &Frame, target_h: u32, target_w: u32) -> Frame {
    let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .expect("frame buffer length matches dimensions");

    let resized = imageops::resize(&buffer, target_w, target_h, FilterType::Triangle);

    Frame::new(resized.into_raw(), target_w, target_h, frame.order())
}

/// Resamples back to the caller's original dimensions.
pub fn restore(frame: &Frame, original_h: u32, original_w: u32) -> Frame {
    resize(frame, original_h, original_w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ChannelOrder;

    fn gradient_frame(width: u32, height: u32) -> Frame {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height {
            for x in 0..width {
                data.push((x % 256) as u8);
                data.push((y % 256) as u8);
                data.push(((x + y) % 256) as u8);
            }
        }
        Frame::new(data, width, height, ChannelOrder::Rgb)
    }

    #[test]
    fn resize_produces_target_shape() {
        let resized = resize(&gradient_frame(640, 480), 128, 128);

        assert_eq!((resized.height(), resized.width()), (128, 128));
        assert_eq!(resized.data().len(), 128 * 128 * 3);
    }

    #[test]
    fn restore_recovers_original_dimensions_exactly() {
        let original = gradient_frame(640, 480);

        let squeezed = resize(&original, 128, 128);
        let restored = restore(&squeezed, 480, 640);

        assert_eq!((restored.height(), restored.width()), (480, 640));
    }

    #[test]
    fn round_trip_holds_for_awkward_aspect_ratios() {
        for (w, h) in [(31, 517), (1920, 2), (99, 101)] {
            let original = gradient_frame(w, h);

            let restored = restore(&resize(&original, 256, 256), h, w);

            assert_eq!((restored.width(), restored.height()), (w, h));
        }
    }

    #[test]
    fn resize_preserves_channel_order_tag() {
        let frame = gradient_frame(64, 64);
        let converted = crate::color::convert(frame, ChannelOrder::Bgr);

        let resized = resize(&converted, 32, 32);

        assert_eq!(resized.order(), ChannelOrder::Bgr);
    }

    #[test]
    fn resize_of_uniform_frame_stays_uniform() {
        let data = vec![77u8; 50 * 40 * 3];
        let frame = Frame::new(data, 50, 40, ChannelOrder::Rgb);

        let resized = resize(&frame, 20, 25);

        assert!(resized.data().iter().all(|&v| v == 77));
    }
}
