//! Camera access
//!
//! A terminal has no video element, so the default device reads frames that
//! an external capture tool keeps writing into a directory, e.g.
//! `ffmpeg -f v4l2 -i /dev/video0 -r 5 ~/.qrprobe/frames/%05d.png`.
//! The newest image in the directory is the current frame.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use image::GrayImage;

use crate::error::AppError;

const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// A live feed acquired from a camera device
pub trait CameraStream: Send {
    /// Next frame, or `None` when nothing new is available yet
    fn grab_frame(&mut self) -> Result<Option<GrayImage>, AppError>;

    fn has_flash(&self) -> bool;

    fn set_flash(&mut self, on: bool) -> Result<(), AppError>;

    /// Hand the device back; the stream yields nothing afterwards
    fn release(&mut self);
}

/// Source of camera streams
pub trait CameraDevice: Send {
    /// Fails with `CameraAccess` when permission is denied or no camera exists
    fn open(&mut self) -> Result<Box<dyn CameraStream>, AppError>;
}

/// Camera backed by a directory of captured frames
#[derive(Clone, Debug)]
pub struct FrameDirCamera {
    dir: PathBuf,
}

impl FrameDirCamera {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FrameDirCamera { dir: dir.into() }
    }
}

impl CameraDevice for FrameDirCamera {
    fn open(&mut self) -> Result<Box<dyn CameraStream>, AppError> {
        if !self.dir.is_dir() {
            return Err(AppError::CameraAccess(format!(
                "no capture directory at {}",
                self.dir.display()
            )));
        }
        if newest_frame(&self.dir)?.is_none() {
            return Err(AppError::CameraAccess(format!(
                "no frames in {}; is the capture tool running?",
                self.dir.display()
            )));
        }
        tracing::info!(dir = %self.dir.display(), "Camera stream opened");
        Ok(Box::new(FrameDirStream {
            dir: self.dir.clone(),
            last_frame: None,
            released: false,
        }))
    }
}

struct FrameDirStream {
    dir: PathBuf,
    last_frame: Option<(PathBuf, SystemTime)>,
    released: bool,
}

impl CameraStream for FrameDirStream {
    fn grab_frame(&mut self) -> Result<Option<GrayImage>, AppError> {
        if self.released {
            return Err(AppError::CameraAccess("camera stream released".to_string()));
        }
        let Some(current) = newest_frame(&self.dir)? else {
            return Ok(None);
        };
        if self.last_frame.as_ref() == Some(&current) {
            return Ok(None);
        }

        // The capture tool may still be writing this file
        match image::open(&current.0) {
            Ok(img) => {
                self.last_frame = Some(current);
                Ok(Some(img.to_luma8()))
            }
            Err(e) => {
                tracing::debug!(path = %current.0.display(), error = %e, "Skipping unreadable frame");
                Ok(None)
            }
        }
    }

    fn has_flash(&self) -> bool {
        false
    }

    fn set_flash(&mut self, _on: bool) -> Result<(), AppError> {
        Err(AppError::FlashControl("device has no flash".to_string()))
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            tracing::info!(dir = %self.dir.display(), "Camera stream released");
        }
    }
}

fn is_frame(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Most recently modified frame in `dir`
fn newest_frame(dir: &Path) -> Result<Option<(PathBuf, SystemTime)>, AppError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| AppError::CameraAccess(format!("{}: {}", dir.display(), e)))?;

    let newest = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| is_frame(p))
        .filter_map(|p| {
            let modified = fs::metadata(&p).and_then(|m| m.modified()).ok()?;
            Some((p, modified))
        })
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    Ok(newest)
}
