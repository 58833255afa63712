use crate::color::ChannelOrder;
use crate::error::RestorationError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, GenericImageView, ImageEncoder};
use std::io::Cursor;

const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Decoded raster buffer. Always three interleaved 8-bit channels once past
/// ingestion; `order` records which way round they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    order: ChannelOrder,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, order: ChannelOrder) -> Self {
        assert!(width > 0 && height > 0, "frame dimensions must be nonzero");
        assert_eq!(
            data.len(),
            width as usize * height as usize * 3,
            "frame buffer length must match dimensions"
        );

        Self {
            data,
            width,
            height,
            order,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_parts(self) -> (Vec<u8>, u32, u32, ChannelOrder) {
        (self.data, self.width, self.height, self.order)
    }
}

/// Decodes a base64 image payload, with or without a `data:` URI prefix, into
/// an RGB frame. Grayscale and alpha sources are force-converted to three
/// channels at this boundary.
pub fn decode_frame(payload: &str) -> Result<Frame, RestorationError> {
    if payload.trim().is_empty() {
        return Err(RestorationError::Decode("empty frame payload".into()));
    }

    // data URI payloads carry the base64 body after the last comma
    let encoded = payload.rsplit(',').next().unwrap_or(payload);

    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| RestorationError::Decode(format!("invalid base64: {}", e)))?;

    let reader = image::ImageReader::new(Cursor::new(&bytes))
        .with_guessed_format()
        .map_err(|e| RestorationError::Decode(format!("unreadable image data: {}", e)))?;

    let decoded = reader
        .decode()
        .map_err(|e| RestorationError::Decode(format!("unsupported image data: {}", e)))?;

    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(RestorationError::Decode(
            "decoded image has zero-size geometry".into(),
        ));
    }

    let rgb = decoded.to_rgb8();

    Ok(Frame::new(
        rgb.into_raw(),
        width,
        height,
        ChannelOrder::Rgb,
    ))
}

/// Encodes an RGB frame as a JPEG data URI at the given quality.
pub fn encode_frame(frame: &Frame, quality: u8) -> Result<String, RestorationError> {
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    encoder
        .write_image(
            frame.data(),
            frame.width(),
            frame.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| RestorationError::Encode(e.to_string()))?;

    Ok(format!(
        "{}{}",
        DATA_URI_PREFIX,
        STANDARD.encode(buffer.into_inner())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn png_payload(width: u32, height: u32) -> String {
        let img = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        STANDARD.encode(bytes)
    }

    #[test]
    fn decodes_raw_base64_payload() {
        let frame = decode_frame(&png_payload(64, 48)).unwrap();

        assert_eq!(frame.width(), 64);
        assert_eq!(frame.height(), 48);
        assert_eq!(frame.order(), ChannelOrder::Rgb);
        assert_eq!(frame.data().len(), 64 * 48 * 3);
    }

    #[test]
    fn decodes_data_uri_payload() {
        let payload = format!("data:image/png;base64,{}", png_payload(16, 16));

        let frame = decode_frame(&payload).unwrap();

        assert_eq!((frame.width(), frame.height()), (16, 16));
    }

    #[test]
    fn rejects_empty_payload() {
        let err = decode_frame("   ").unwrap_err();

        assert!(matches!(err, RestorationError::Decode(_)));
    }

    #[test]
    fn rejects_invalid_base64() {
        let err = decode_frame("not-valid-base64!!!").unwrap_err();

        assert!(matches!(err, RestorationError::Decode(_)));
    }

    #[test]
    fn rejects_undecodable_image_data() {
        let payload = STANDARD.encode(b"this is not an image container");

        let err = decode_frame(&payload).unwrap_err();

        assert!(matches!(err, RestorationError::Decode(_)));
    }

    #[test]
    fn grayscale_sources_are_forced_to_three_channels() {
        let img = image::GrayImage::from_pixel(8, 8, image::Luma([200]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let frame = decode_frame(&STANDARD.encode(bytes)).unwrap();

        assert_eq!(frame.data().len(), 8 * 8 * 3);
        assert_eq!(&frame.data()[..3], &[200, 200, 200]);
    }

    #[test]
    fn encode_produces_a_decodable_data_uri() {
        let frame = decode_frame(&png_payload(32, 24)).unwrap();

        let encoded = encode_frame(&frame, 90).unwrap();
        assert!(encoded.starts_with(DATA_URI_PREFIX));

        let round_tripped = decode_frame(&encoded).unwrap();
        assert_eq!((round_tripped.width(), round_tripped.height()), (32, 24));
    }
}
