//! Message types for inter-layer communication in the actor-based architecture.
//!
//! This module defines all messages that flow between the UI, App, Network and
//! Scan layers.

pub mod network;
pub mod render;
pub mod scan;
pub mod ui_events;

pub use network::{NetworkCommand, NetworkResponse};
pub use render::RenderState;
pub use scan::{ScanCommand, ScanResponse};
pub use ui_events::UiEvent;
