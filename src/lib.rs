//! # QR Probe TUI
//!
//! A terminal QR toolbox with a small HTTP request tester.
//!
//! ## Features
//! - QR generation from text, URLs and contact cards (vCard 3.0)
//! - PNG export and clipboard copy of generated codes
//! - Live camera scanning (frame directory) and still-image scanning
//! - Scan result classification: contact, URL, email, phone, text
//! - HTTP methods: GET, POST, PUT, PATCH, DELETE with JSON headers/body
//! - JSON syntax highlighting and request cancellation
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine)
//! - Network Layer (Tokio runtime)
//! - Scan Layer (camera session and decode loop)

pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod messages;
pub mod models;
pub mod network;
pub mod platform;
pub mod qr;
pub mod storage;
pub mod ui;

// Re-export commonly used types
pub use app::{AppActor, AppState};
pub use config::Config;
pub use error::AppError;
pub use messages::{NetworkCommand, NetworkResponse, RenderState, ScanCommand, ScanResponse, UiEvent};
pub use models::{HttpMethod, RequestSpec, ResultCategory, ScanResult};
pub use network::NetworkActor;
pub use qr::{ScanActor, ScanController};
