//! User configuration, read from `~/.qrprobe/config.yaml`
//!
//! Every key is optional; anything missing falls back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{DEFAULT_SCANS_PER_SECOND, DEFAULT_TIMEOUT_SECS};
use crate::models::QrSize;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub qr: QrConfig,
    pub camera: CameraConfig,
    pub http: HttpConfig,
    /// Log file; defaults to `qrprobe.log` in the config directory
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrConfig {
    pub default_size: QrSize,
    /// Where saved PNGs go; defaults to the user's download directory
    pub output_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Directory an external capture tool writes frames into
    pub frames_dir: Option<PathBuf>,
    pub max_scans_per_second: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig {
            frames_dir: None,
            max_scans_per_second: DEFAULT_SCANS_PER_SECOND,
        }
    }
}

impl CameraConfig {
    /// Delay between two decode attempts of the live loop
    pub fn scan_interval(&self) -> Duration {
        let rate = self.max_scans_per_second.max(1);
        Duration::from_millis(1000 / u64::from(rate))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    /// Pre-filled API URL; empty by default
    pub default_url: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_url: String::new(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}
