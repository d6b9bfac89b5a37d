//! Command handlers - business logic for processing UI events

use std::path::PathBuf;

use crate::app::state::{Notice, NoticeLevel};
use crate::app::AppState;
use crate::error::AppError;
use crate::messages::scan::ScanSource;
use crate::messages::ui_events::{AppTab, Field, InputMode};
use crate::messages::{NetworkCommand, NetworkResponse, ScanCommand, ScanResponse};
use crate::models::{GenerateMode, ProbeOutcome};
use crate::network::request::prepare;
use crate::qr::{classify, QrPreview};

impl AppState {
    // ========================
    // Navigation
    // ========================

    pub fn switch_tab(&mut self, tab: AppTab) {
        self.active_tab = tab;
        self.input_mode = InputMode::Normal;
        self.normalize_focus();
    }

    pub fn next_field(&mut self) {
        self.step_field(1);
    }

    pub fn prev_field(&mut self) {
        self.step_field(-1);
    }

    fn step_field(&mut self, step: isize) {
        let fields = self.fields();
        if fields.is_empty() {
            return;
        }
        let len = fields.len() as isize;
        let next = match fields.iter().position(|f| *f == self.focus) {
            Some(i) => (i as isize + step).rem_euclid(len) as usize,
            None => 0,
        };
        self.focus = fields[next];
    }

    /// Keep focus on a field that exists on the active tab
    fn normalize_focus(&mut self) {
        let fields = self.fields();
        if !fields.contains(&self.focus) {
            if let Some(first) = fields.first() {
                self.focus = *first;
            }
        }
    }

    pub fn scroll_up(&mut self) {
        self.api.response_scroll = self.api.response_scroll.saturating_sub(1);
    }

    /// Stops with the last body line at the top of the pane
    pub fn scroll_down(&mut self) {
        let last = self.api.response.body.lines().count().saturating_sub(1);
        let last = u16::try_from(last).unwrap_or(u16::MAX);
        self.api.response_scroll = self.api.response_scroll.saturating_add(1).min(last);
    }

    // ========================
    // Input editing
    // ========================

    pub fn start_editing(&mut self) {
        if self.active_tab == AppTab::Scan || !self.focus.is_editable() {
            return;
        }
        self.input_mode = InputMode::Editing;
        self.cursor_position = self.current_input().len();
    }

    pub fn stop_editing(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn move_cursor_left(&mut self) {
        let input = self.current_input();
        if self.cursor_position > 0 {
            let new_pos = input[..self.cursor_position]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.cursor_position = new_pos;
        }
    }

    pub fn move_cursor_right(&mut self) {
        let input = self.current_input();
        if self.cursor_position < input.len() {
            let new_pos = input[self.cursor_position..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor_position + i)
                .unwrap_or(input.len());
            self.cursor_position = new_pos;
        }
    }

    pub fn enter_char(&mut self, c: char) {
        let cursor_pos = self.cursor_position;
        if let Some(input) = self.current_input_mut() {
            if cursor_pos <= input.len() {
                input.insert(cursor_pos, c);
                self.cursor_position = cursor_pos + c.len_utf8();
            }
        }
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position == 0 {
            return;
        }
        let cursor_pos = self.cursor_position;
        if let Some(input) = self.current_input_mut() {
            let prev_pos = input[..cursor_pos]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            input.remove(prev_pos);
            self.cursor_position = prev_pos;
        }
    }

    // ========================
    // Generate
    // ========================

    pub fn cycle_mode(&mut self) {
        self.gen.mode = self.gen.mode.next();
        self.stop_editing();
        self.normalize_focus();
    }

    pub fn cycle_size(&mut self) {
        self.gen.size = self.gen.size.next();
    }

    /// Encode the active form; a failure keeps the previous artifact
    pub fn generate(&mut self) {
        self.stop_editing();
        let size = self.gen.size;

        let outcome = match self.gen.mode {
            GenerateMode::Text => self.emitter.encode(&self.gen.text, size).map(Some),
            GenerateMode::Url => self.emitter.encode(&self.gen.url, size).map(Some),
            GenerateMode::Contact => self.emitter.encode_contact(&self.gen.contact, size),
        };

        match outcome {
            Ok(Some(image)) => {
                self.preview = Some(QrPreview::from_image(image, 1));
                self.notice = None;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "QR generation failed");
                self.notice = Some(Notice::from(&e));
            }
        }
    }

    pub fn save_qr(&mut self) {
        self.notice = Some(match self.emitter.save_png(&self.output_dir) {
            Ok(path) => Notice::success("Success", format!("QR code saved to {}", path.display())),
            Err(e) => {
                tracing::warn!(error = %e, "Saving QR code failed");
                Notice::from(&e)
            }
        });
    }

    pub fn copy_qr(&mut self) {
        self.notice = Some(match self.emitter.copy_image(self.clipboard.as_mut()) {
            Ok(()) => Notice::success("Success", "QR code copied to clipboard"),
            Err(e) => {
                tracing::warn!(error = %e, "Copying QR code failed");
                Notice::from(&e)
            }
        });
    }

    // ========================
    // Scan
    // ========================

    pub fn start_scan(&mut self) -> Option<ScanCommand> {
        if self.scan.scanning {
            return None;
        }
        Some(ScanCommand::Start)
    }

    pub fn stop_scan(&mut self) -> Option<ScanCommand> {
        // Reset locally right away, the actor confirms with Stopped
        self.scan.scanning = false;
        self.scan.flash_on = false;
        Some(ScanCommand::Stop)
    }

    pub fn toggle_flash(&mut self) -> Option<ScanCommand> {
        if self.scan.scanning && self.scan.has_flash {
            Some(ScanCommand::ToggleFlash)
        } else {
            None
        }
    }

    pub fn open_image_input(&mut self) {
        self.show_image_input = true;
    }

    pub fn image_path_char(&mut self, c: char) {
        self.image_path_input.push(c);
    }

    pub fn image_path_backspace(&mut self) {
        self.image_path_input.pop();
    }

    pub fn cancel_image_input(&mut self) {
        self.show_image_input = false;
        self.image_path_input.clear();
    }

    /// Close the path popup and ask the scan actor to decode the file
    pub fn scan_image(&mut self) -> Option<ScanCommand> {
        let input = self.image_path_input.trim().to_string();
        self.cancel_image_input();
        if input.is_empty() {
            return None;
        }

        let path = match input.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&input)),
            None => PathBuf::from(&input),
        };
        Some(ScanCommand::ScanImage(path))
    }

    pub fn handle_scan_response(&mut self, response: ScanResponse) {
        match response {
            ScanResponse::Started { has_flash } => {
                self.scan.scanning = true;
                self.scan.has_flash = has_flash;
                self.scan.flash_on = false;
                self.notice = Some(Notice::new(
                    NoticeLevel::Info,
                    "Scanning",
                    "Point the camera at a QR code",
                ));
            }
            ScanResponse::Stopped => {
                self.scan.scanning = false;
                self.scan.flash_on = false;
            }
            ScanResponse::FlashChanged { on } => {
                self.scan.flash_on = on;
            }
            ScanResponse::Detected { result, source } => {
                if source == ScanSource::Camera {
                    self.scan.scanning = false;
                    self.scan.flash_on = false;
                }
                let message = match source {
                    ScanSource::Camera => "QR code has been successfully scanned!",
                    ScanSource::Image => "QR code has been successfully scanned from image!",
                };
                tracing::info!(category = ?classify(&result.text), "Scan result received");
                self.scan.result = Some(result);
                self.notice = Some(Notice::success("QR Code Detected", message));
            }
            ScanResponse::Failed {
                title,
                message,
                session_ended,
            } => {
                if session_ended {
                    self.scan.scanning = false;
                    self.scan.flash_on = false;
                }
                self.notice = Some(Notice::error(title, message));
            }
        }
    }

    pub fn copy_scan_result(&mut self) {
        let Some(result) = &self.scan.result else {
            return;
        };
        self.notice = Some(match self.clipboard.set_text(&result.text) {
            Ok(()) => Notice::success("Copied", "Result copied to clipboard"),
            Err(e) => Notice::from(&e),
        });
    }

    /// Only offered when the result classifies as a website URL
    pub fn open_scan_url(&mut self) {
        let Some(result) = &self.scan.result else {
            return;
        };
        if !classify(&result.text).can_open() {
            return;
        }
        if let Err(e) = self.opener.open(&result.text) {
            tracing::warn!(error = %e, "Opening URL failed");
            self.notice = Some(Notice::from(&e));
        }
    }

    // ========================
    // HTTP Method
    // ========================

    pub fn cycle_method(&mut self) {
        self.api.request.method = self.api.request.method.next();
        if self.focus == Field::ApiBody && !self.api.request.method.carries_body() {
            self.focus = Field::ApiHeaders;
        }
    }

    // ========================
    // Request lifecycle
    // ========================

    /// Validate the form and issue a new fenced probe.
    ///
    /// Sending while a probe is outstanding is allowed; the new id supersedes
    /// the old one so only the latest request can update the response view.
    pub fn send_request(&mut self) -> Option<NetworkCommand> {
        let request = match prepare(&self.api.request) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "Request rejected before sending");
                self.notice = Some(Notice::from(&e));
                return None;
            }
        };

        let id = self.next_id();
        self.api.pending_request_id = Some(id);
        self.api.is_loading = true;
        self.api.response.status_code = None;
        self.api.response.outcome = None;
        self.api.response.body.clear();
        self.api.response.time_ms = 0;
        self.api.response_scroll = 0;
        self.notice = None;

        Some(NetworkCommand::ExecuteProbe { id, request })
    }

    pub fn cancel_request(&mut self) -> Option<NetworkCommand> {
        self.api.pending_request_id.map(NetworkCommand::CancelProbe)
    }

    pub fn handle_response(&mut self, response: NetworkResponse) {
        let response_id = response.id();
        if self.api.pending_request_id != Some(response_id) {
            tracing::debug!(id = response_id, "Dropping superseded response");
            return;
        }

        match response {
            NetworkResponse::Completed {
                status,
                body,
                time_ms,
                ..
            } => {
                let outcome = ProbeOutcome::from_status(status);
                self.api.response.status_code = Some(status);
                self.api.response.body = body;
                self.api.response.time_ms = time_ms;
                self.api.response.outcome = Some(outcome);
                self.notice = Some(match outcome {
                    ProbeOutcome::HttpError => Notice::new(
                        NoticeLevel::Warning,
                        "API Error",
                        format!("Request failed with status {}", status),
                    ),
                    ProbeOutcome::Success => {
                        Notice::success("Success", format!("API request completed ({})", status))
                    }
                    _ => Notice::new(
                        NoticeLevel::Info,
                        "Response",
                        format!("Request returned status {}", status),
                    ),
                });
            }
            NetworkResponse::Failed {
                message,
                body,
                time_ms,
                ..
            } => {
                tracing::warn!(id = response_id, error = %message, "Probe failed");
                self.api.response.status_code = None;
                self.api.response.body = body;
                self.api.response.time_ms = time_ms;
                self.api.response.outcome = Some(ProbeOutcome::NetworkError);
                let err = AppError::Network(format!("Failed to make API request: {}", message));
                self.notice = Some(Notice::from(&err));
            }
            NetworkResponse::Cancelled { .. } => {
                self.api.response.status_code = None;
                self.api.response.body = String::from("Request cancelled");
                self.api.response.time_ms = 0;
                self.api.response.outcome = None;
            }
        }
        self.finalize_request();
    }

    fn finalize_request(&mut self) {
        self.api.is_loading = false;
        self.api.pending_request_id = None;
    }

    pub fn copy_response(&mut self) {
        if self.api.response.body.is_empty() {
            return;
        }
        self.notice = Some(match self.clipboard.set_text(&self.api.response.body) {
            Ok(()) => Notice::success("Copied", "Response copied to clipboard"),
            Err(e) => Notice::from(&e),
        });
    }

    // ========================
    // Help popup
    // ========================

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }
}
