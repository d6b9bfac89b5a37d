//! Fire-and-forget sinks provided by the desktop: clipboard and URL opener

use std::borrow::Cow;
use std::process::{Command, Stdio};

use image::RgbaImage;

use crate::error::AppError;

pub trait ClipboardSink: Send {
    fn set_text(&mut self, text: &str) -> Result<(), AppError>;
    fn set_image(&mut self, image: &RgbaImage) -> Result<(), AppError>;
}

pub trait UrlOpener: Send {
    fn open(&mut self, url: &str) -> Result<(), AppError>;
}

/// System clipboard via `arboard`
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    fn connect() -> Result<arboard::Clipboard, AppError> {
        arboard::Clipboard::new()
            .map_err(|e| AppError::Clipboard(format!("Failed to access clipboard: {}", e)))
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), AppError> {
        let mut clipboard = Self::connect()?;
        clipboard
            .set_text(text)
            .map_err(|e| AppError::Clipboard(format!("Failed to copy to clipboard: {}", e)))?;
        Ok(())
    }

    fn set_image(&mut self, image: &RgbaImage) -> Result<(), AppError> {
        let mut clipboard = Self::connect()?;
        let data = arboard::ImageData {
            width: image.width() as usize,
            height: image.height() as usize,
            bytes: Cow::Borrowed(image.as_raw()),
        };
        clipboard
            .set_image(data)
            .map_err(|e| AppError::Clipboard(format!("Failed to copy image: {}", e)))?;
        Ok(())
    }
}

/// Opens URLs with the platform's default handler
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemOpener;

/// Program and arguments that hand `url` to the default handler on `os`.
///
/// The URL is always a single argument to a program that takes it verbatim;
/// no shell sees it.
fn open_command(os: &str, url: &str) -> (&'static str, Vec<String>) {
    match os {
        "macos" => ("open", vec![url.to_string()]),
        "windows" => (
            "rundll32",
            vec!["url.dll,FileProtocolHandler".to_string(), url.to_string()],
        ),
        _ => ("xdg-open", vec![url.to_string()]),
    }
}

impl UrlOpener for SystemOpener {
    fn open(&mut self, url: &str) -> Result<(), AppError> {
        let (program, args) = open_command(std::env::consts::OS, url);
        let mut child = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        // Reap the handler so it doesn't linger as a zombie
        std::thread::spawn(move || {
            if let Err(e) = child.wait() {
                tracing::debug!(error = %e, "URL handler wait failed");
            }
        });
        tracing::info!(%url, program, "Opened URL");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_url_never_goes_through_cmd() {
        let url = "https://x.io/?a=1&calc";
        let (program, args) = open_command("windows", url);
        assert_eq!(program, "rundll32");
        assert_eq!(args, vec!["url.dll,FileProtocolHandler".to_string(), url.to_string()]);
    }

    #[test]
    fn test_unix_openers_take_url_as_one_argument() {
        let url = "https://x.io/?a=1&b=2 c";
        assert_eq!(open_command("macos", url), ("open", vec![url.to_string()]));
        assert_eq!(open_command("linux", url), ("xdg-open", vec![url.to_string()]));
    }
}
