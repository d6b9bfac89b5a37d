//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Placeholder shown in an empty API URL field
pub const API_URL_PLACEHOLDER: &str = "https://jsonplaceholder.typicode.com/posts/1";

/// Directory under $HOME holding config and logs
pub const CONFIG_DIR_NAME: &str = ".qrprobe";

/// Config file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Default log file name
pub const LOG_FILE_NAME: &str = "qrprobe.log";

/// Upper bound on live decode attempts per second
pub const DEFAULT_SCANS_PER_SECOND: u32 = 5;

/// Default HTTP timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Quiet zone around the QR symbol, in modules
pub const QR_MARGIN: u32 = 2;

/// Dark module colour (#1e293b)
pub const QR_DARK: [u8; 4] = [0x1e, 0x29, 0x3b, 0xff];

/// Light module colour (#ffffff)
pub const QR_LIGHT: [u8; 4] = [0xff, 0xff, 0xff, 0xff];

/// vCard framing literals
pub const VCARD_BEGIN: &str = "BEGIN:VCARD";
pub const VCARD_VERSION: &str = "VERSION:3.0";
pub const VCARD_END: &str = "END:VCARD";

/// Application name
pub const APP_NAME: &str = "QR Probe";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
