//! QR decoding from grey frames and still images

use image::GrayImage;

use crate::error::AppError;

/// Finds and decodes a QR code in a frame
pub trait FrameDecoder: Send + Sync {
    /// `None` when the frame holds no readable code
    fn decode(&self, frame: &GrayImage) -> Option<String>;
}

/// Default decoder backed by `rqrr`
#[derive(Clone, Copy, Debug, Default)]
pub struct GridDecoder;

impl FrameDecoder for GridDecoder {
    fn decode(&self, frame: &GrayImage) -> Option<String> {
        let (w, h) = frame.dimensions();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            w as usize,
            h as usize,
            |x, y| frame.get_pixel(x as u32, y as u32).0[0],
        );

        prepared.detect_grids().into_iter().find_map(|grid| match grid.decode() {
            Ok((_meta, content)) => Some(content),
            Err(e) => {
                tracing::debug!(error = ?e, "Grid found but not decodable");
                None
            }
        })
    }
}

/// Decode a still image given as encoded bytes (PNG, JPEG, ...)
pub fn decode_image_bytes(decoder: &dyn FrameDecoder, bytes: &[u8]) -> Result<String, AppError> {
    let img = image::load_from_memory(bytes).map_err(|e| AppError::Decode(e.to_string()))?;
    decoder
        .decode(&img.to_luma8())
        .ok_or_else(|| AppError::Decode("no QR code found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QrSize;
    use crate::qr::encoder::{EncodeOptions, MatrixEncoder, QrEncoder};
    use image::DynamicImage;

    #[test]
    fn test_round_trip_text_and_url() {
        for payload in ["https://example.com", "Hello, World!", "tel:+1 555 0100"] {
            let img = MatrixEncoder
                .encode(payload, &EncodeOptions::with_size(QrSize::Px300))
                .unwrap();
            let gray = DynamicImage::ImageRgba8(img.raster).to_luma8();
            assert_eq!(GridDecoder.decode(&gray).as_deref(), Some(payload));
        }
    }

    #[test]
    fn test_round_trip_through_png_bytes() {
        let img = MatrixEncoder
            .encode("BEGIN:VCARD\nFN:Jane Doe\nEND:VCARD", &EncodeOptions::with_size(QrSize::Px400))
            .unwrap();
        let png = img.to_png().unwrap();
        assert_eq!(
            decode_image_bytes(&GridDecoder, &png).unwrap(),
            "BEGIN:VCARD\nFN:Jane Doe\nEND:VCARD"
        );
    }

    #[test]
    fn test_blank_image_has_no_code() {
        let blank = GrayImage::from_pixel(120, 120, image::Luma([255]));
        assert!(GridDecoder.decode(&blank).is_none());
    }

    #[test]
    fn test_garbage_bytes_fail_with_decode_error() {
        let err = decode_image_bytes(&GridDecoder, b"not an image").unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
    }
}
