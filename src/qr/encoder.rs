//! QR symbol encoding and raster output
//!
//! The symbol matrix comes from the `qrcode` crate; rasterisation into an RGBA
//! image (scaling, quiet zone, palette) happens here.

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::constants::{QR_DARK, QR_LIGHT, QR_MARGIN};
use crate::error::AppError;
use crate::models::QrSize;

/// Error correction level of the emitted symbol
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ErrorCorrection {
    Low,
    #[default]
    Medium,
    Quartile,
    High,
}

impl From<ErrorCorrection> for qrcode::EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::Low => qrcode::EcLevel::L,
            ErrorCorrection::Medium => qrcode::EcLevel::M,
            ErrorCorrection::Quartile => qrcode::EcLevel::Q,
            ErrorCorrection::High => qrcode::EcLevel::H,
        }
    }
}

/// Visual parameters of an encoded image
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    pub size: QrSize,
    /// Quiet zone in modules
    pub margin: u32,
    pub dark: [u8; 4],
    pub light: [u8; 4],
    pub error_correction: ErrorCorrection,
}

impl EncodeOptions {
    pub fn with_size(size: QrSize) -> Self {
        EncodeOptions {
            size,
            ..Default::default()
        }
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            size: QrSize::default(),
            margin: QR_MARGIN,
            dark: QR_DARK,
            light: QR_LIGHT,
            error_correction: ErrorCorrection::Medium,
        }
    }
}

/// An encoded QR code: the module matrix and its raster
#[derive(Clone, Debug)]
pub struct QrImage {
    pub payload: String,
    pub size: QrSize,
    /// Modules per side, without quiet zone
    pub width: usize,
    modules: Vec<bool>,
    pub raster: RgbaImage,
}

impl QrImage {
    /// Whether the module at (x, y) is dark; out of range counts as light
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.modules[y * self.width + x]
    }

    /// PNG bytes of the raster
    pub fn to_png(&self) -> Result<Vec<u8>, AppError> {
        let mut buf = Vec::new();
        self.raster
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| AppError::Io(std::io::Error::other(e.to_string())))?;
        Ok(buf)
    }

    pub fn save_png(&self, path: &Path) -> Result<(), AppError> {
        self.raster
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| AppError::Io(std::io::Error::other(e.to_string())))
    }
}

/// Turns text into a QR image
pub trait QrEncoder: Send + Sync {
    fn encode(&self, payload: &str, options: &EncodeOptions) -> Result<QrImage, AppError>;
}

/// Default encoder backed by the `qrcode` crate
#[derive(Clone, Copy, Debug, Default)]
pub struct MatrixEncoder;

impl QrEncoder for MatrixEncoder {
    fn encode(&self, payload: &str, options: &EncodeOptions) -> Result<QrImage, AppError> {
        let code = qrcode::QrCode::with_error_correction_level(
            payload.as_bytes(),
            options.error_correction.into(),
        )
        .map_err(|e| AppError::Encode(e.to_string()))?;

        let width = code.width();
        let modules: Vec<bool> = code
            .to_colors()
            .into_iter()
            .map(|c| c == qrcode::Color::Dark)
            .collect();
        let raster = rasterize(width, &modules, options);

        Ok(QrImage {
            payload: payload.to_string(),
            size: options.size,
            width,
            modules,
            raster,
        })
    }
}

/// Draw the module matrix centred on a `size x size` light canvas
fn rasterize(width: usize, modules: &[bool], options: &EncodeOptions) -> RgbaImage {
    let canvas = options.size.pixels();
    let total = width as u32 + 2 * options.margin;
    let scale = (canvas / total).max(1);
    let symbol = total * scale;
    let canvas = canvas.max(symbol);
    let offset = (canvas - symbol) / 2 + options.margin * scale;

    let dark = Rgba(options.dark);
    let mut img = RgbaImage::from_pixel(canvas, canvas, Rgba(options.light));

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        if x < offset || y < offset {
            continue;
        }
        let mx = ((x - offset) / scale) as usize;
        let my = ((y - offset) / scale) as usize;
        if mx < width && my < width && modules[my * width + mx] {
            *pixel = dark;
        }
    }

    img
}
