//! QR layer - encoding, decoding, classification and the camera session
//!
//! Encoding and decoding sit behind the `QrEncoder` / `FrameDecoder` traits
//! so the controllers never depend on a particular QR library.

pub mod actor;
pub mod camera;
pub mod classify;
pub mod decoder;
pub mod emitter;
pub mod encoder;
pub mod scanner;
pub mod vcard;

pub use actor::ScanActor;
pub use classify::classify;
pub use emitter::{QrEmitter, QrPreview};
pub use scanner::{ScanController, SessionState};
