//! Error taxonomy shared by the scan, emission and probe controllers
//!
//! None of these are fatal: every operation that fails leaves its controller
//! in an idle, retryable state and the app layer turns the error into a notice.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Bad or missing required input, caught before any side effect
    #[error("{0}")]
    Validation(String),

    /// The custom header block is not a JSON object
    #[error("Headers must be valid JSON format: {0}")]
    HeaderParse(String),

    #[error("Unable to access camera: {0}")]
    CameraAccess(String),

    #[error("Unable to toggle flashlight: {0}")]
    FlashControl(String),

    /// Image or frame has no recoverable QR code
    #[error("Unable to scan QR code from image: {0}")]
    Decode(String),

    /// Payload cannot be encoded at the requested parameters
    #[error("Failed to generate QR code: {0}")]
    Encode(String),

    /// Transport failure, no response received
    #[error("{0}")]
    Network(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Short title used for the notice shown in the status bar
    pub fn title(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Error",
            AppError::HeaderParse(_) => "Invalid Headers",
            AppError::CameraAccess(_) => "Camera Error",
            AppError::FlashControl(_) => "Flash Error",
            AppError::Decode(_) => "Scan Error",
            AppError::Encode(_) => "Error",
            AppError::Network(_) => "Network Error",
            AppError::Clipboard(_) => "Clipboard Error",
            AppError::Io(_) => "File Error",
        }
    }
}
