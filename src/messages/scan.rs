//! Scan messages - communication between App and Scan layers

use std::path::PathBuf;

use crate::error::AppError;
use crate::models::ScanResult;

/// Commands sent from App layer to the scan actor
#[derive(Debug, Clone)]
pub enum ScanCommand {
    Start,
    Stop,
    ToggleFlash,
    /// Decode a still image from disk
    ScanImage(PathBuf),
    Shutdown,
}

/// Where a result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanSource {
    Camera,
    Image,
}

/// Responses sent from the scan actor to the App layer
#[derive(Debug, Clone)]
pub enum ScanResponse {
    Started { has_flash: bool },
    Stopped,
    FlashChanged { on: bool },
    Detected { result: ScanResult, source: ScanSource },
    Failed {
        title: String,
        message: String,
        /// The live session ended because of this failure
        session_ended: bool,
    },
}

impl ScanResponse {
    pub fn failed(error: &AppError, session_ended: bool) -> Self {
        ScanResponse::Failed {
            title: error.title().to_string(),
            message: error.to_string(),
            session_ended,
        }
    }
}
