//! QR emission controller
//!
//! Keeps exactly one encoded artifact. A new encode replaces it only once it
//! succeeds, so a failed attempt leaves the previous image (and its payload)
//! in place.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::models::{ContactInfo, QrSize};
use crate::platform::ClipboardSink;
use crate::qr::encoder::{EncodeOptions, QrEncoder, QrImage};
use crate::qr::vcard::to_vcard;

/// Text rendering of an artifact for the terminal preview
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrPreview {
    pub payload: String,
    pub size: QrSize,
    /// Half-block rows, two modules per character cell
    pub lines: Vec<String>,
}

impl QrPreview {
    pub fn from_image(image: &QrImage, border: usize) -> Self {
        let span = image.width + 2 * border;
        let dark = |x: usize, y: usize| {
            x >= border && y >= border && image.is_dark(x - border, y - border)
        };

        let lines = (0..span)
            .step_by(2)
            .map(|y| {
                (0..span)
                    .map(|x| match (dark(x, y), dark(x, y + 1)) {
                        (true, true) => '█',
                        (true, false) => '▀',
                        (false, true) => '▄',
                        (false, false) => ' ',
                    })
                    .collect()
            })
            .collect();

        QrPreview {
            payload: image.payload.clone(),
            size: image.size,
            lines,
        }
    }
}

pub struct QrEmitter {
    encoder: Box<dyn QrEncoder>,
    artifact: Option<QrImage>,
}

impl QrEmitter {
    pub fn new(encoder: Box<dyn QrEncoder>) -> Self {
        QrEmitter {
            encoder,
            artifact: None,
        }
    }

    pub fn artifact(&self) -> Option<&QrImage> {
        self.artifact.as_ref()
    }

    pub fn encode(&mut self, payload: &str, size: QrSize) -> Result<&QrImage, AppError> {
        if payload.trim().is_empty() {
            return Err(AppError::Validation("Enter some content to encode".to_string()));
        }

        let image = self.encoder.encode(payload, &EncodeOptions::with_size(size))?;
        tracing::info!(len = payload.len(), px = size.pixels(), modules = image.width, "QR code generated");
        Ok(self.artifact.insert(image))
    }

    /// Encode a contact as a vCard; `Ok(None)` when every field is empty
    pub fn encode_contact(
        &mut self,
        contact: &ContactInfo,
        size: QrSize,
    ) -> Result<Option<&QrImage>, AppError> {
        if contact.is_empty() {
            tracing::debug!("Contact form empty, nothing to encode");
            return Ok(None);
        }
        let card = to_vcard(contact);
        self.encode(&card, size).map(Some)
    }

    fn current(&self) -> Result<&QrImage, AppError> {
        self.artifact
            .as_ref()
            .ok_or_else(|| AppError::Validation("Generate a QR code first".to_string()))
    }

    /// Write the artifact as a timestamped PNG into `dir`
    pub fn save_png(&self, dir: &Path) -> Result<PathBuf, AppError> {
        let image = self.current()?;
        fs::create_dir_all(dir)?;
        let name = format!("qrcode-{}.png", chrono::Local::now().format("%Y%m%d-%H%M%S"));
        let path = dir.join(name);
        image.save_png(&path)?;
        tracing::info!(path = %path.display(), "QR code saved");
        Ok(path)
    }

    pub fn copy_image(&self, clipboard: &mut dyn ClipboardSink) -> Result<(), AppError> {
        let image = self.current()?;
        clipboard.set_image(&image.raster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::encoder::MatrixEncoder;
    use image::RgbaImage;

    #[derive(Default)]
    struct RecordingClipboard {
        images: Vec<(u32, u32)>,
    }

    impl ClipboardSink for RecordingClipboard {
        fn set_text(&mut self, _text: &str) -> Result<(), AppError> {
            Ok(())
        }

        fn set_image(&mut self, image: &RgbaImage) -> Result<(), AppError> {
            self.images.push(image.dimensions());
            Ok(())
        }
    }

    fn emitter() -> QrEmitter {
        QrEmitter::new(Box::new(MatrixEncoder))
    }

    #[test]
    fn test_encode_retains_artifact() {
        let mut emitter = emitter();
        emitter.encode("hello", QrSize::Px200).unwrap();
        let artifact = emitter.artifact().unwrap();
        assert_eq!(artifact.payload, "hello");
        assert_eq!(artifact.raster.width(), 200);
    }

    #[test]
    fn test_blank_payload_is_rejected() {
        let mut emitter = emitter();
        assert!(matches!(
            emitter.encode("   ", QrSize::Px300),
            Err(AppError::Validation(_))
        ));
        assert!(emitter.artifact().is_none());
    }

    #[test]
    fn test_failed_encode_keeps_previous_artifact() {
        let mut emitter = emitter();
        emitter.encode("first", QrSize::Px300).unwrap();

        let too_long = "x".repeat(4000);
        assert!(matches!(
            emitter.encode(&too_long, QrSize::Px300),
            Err(AppError::Encode(_))
        ));
        assert_eq!(emitter.artifact().unwrap().payload, "first");
    }

    #[test]
    fn test_empty_contact_is_skipped() {
        let mut emitter = emitter();
        let outcome = emitter
            .encode_contact(&ContactInfo::default(), QrSize::Px300)
            .unwrap();
        assert!(outcome.is_none());
        assert!(emitter.artifact().is_none());
    }

    #[test]
    fn test_contact_is_encoded_as_vcard() {
        let mut emitter = emitter();
        let contact = ContactInfo {
            name: "Jane Doe".into(),
            phone: "+1 555 0100".into(),
            ..Default::default()
        };
        let image = emitter.encode_contact(&contact, QrSize::Px400).unwrap().unwrap();
        assert!(image.payload.starts_with("BEGIN:VCARD\nVERSION:3.0\nFN:Jane Doe"));
    }

    #[test]
    fn test_save_png_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut emitter = emitter();
        assert!(emitter.save_png(dir.path()).is_err());

        emitter.encode("save me", QrSize::Px300).unwrap();
        let path = emitter.save_png(&dir.path().join("out")).unwrap();
        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "png");
        let reopened = image::open(&path).unwrap();
        assert_eq!(reopened.width(), 300);
    }

    #[test]
    fn test_copy_image_to_clipboard() {
        let mut emitter = emitter();
        let mut clipboard = RecordingClipboard::default();
        assert!(emitter.copy_image(&mut clipboard).is_err());

        emitter.encode("copy me", QrSize::Px600).unwrap();
        emitter.copy_image(&mut clipboard).unwrap();
        assert_eq!(clipboard.images, vec![(600, 600)]);
    }

    #[test]
    fn test_preview_covers_symbol() {
        let mut emitter = emitter();
        let image = emitter.encode("preview", QrSize::Px200).unwrap();
        let preview = QrPreview::from_image(image, 1);
        let span = image.width + 2;
        assert_eq!(preview.lines.len(), span.div_ceil(2));
        assert!(preview.lines.iter().all(|l| l.chars().count() == span));
        // Border row is blank, finder pattern starts right after it
        assert!(preview.lines[0].starts_with(" ▄"));
    }
}
