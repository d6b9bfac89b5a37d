//! App state - pure data structure, I/O only through the injected sinks

use std::path::PathBuf;

use crate::config::Config;
use crate::error::AppError;
use crate::messages::ui_events::{AppTab, Field, InputMode};
use crate::messages::RenderState;
use crate::models::{
    ContactInfo, GenerateMode, HttpMethod, QrSize, RequestSpec, ResponseView, ResultCategory,
    ScanResult,
};
use crate::platform::{ClipboardSink, SystemClipboard, SystemOpener, UrlOpener};
use crate::qr::encoder::MatrixEncoder;
use crate::qr::vcard::extract_fields;
use crate::qr::{classify, QrEmitter, QrPreview};
use crate::storage::Storage;

/// Severity of a notice banner
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient banner shown below the tabs (the terminal's toast)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Notice {
            level,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, message)
    }
}

impl From<&AppError> for Notice {
    fn from(error: &AppError) -> Self {
        Notice::error(error.title(), error.to_string())
    }
}

/// Generate tab form
#[derive(Clone, Debug, Default)]
pub struct GenerateTab {
    pub mode: GenerateMode,
    pub size: QrSize,
    pub text: String,
    pub url: String,
    pub contact: ContactInfo,
}

/// Scan tab session view
#[derive(Clone, Debug, Default)]
pub struct ScanTab {
    pub scanning: bool,
    pub has_flash: bool,
    pub flash_on: bool,
    pub result: Option<ScanResult>,
}

/// API tab request/response
#[derive(Clone, Debug)]
pub struct ApiTab {
    pub request: RequestSpec,
    pub response: ResponseView,
    pub is_loading: bool,
    pub response_scroll: u16,
    pub next_request_id: u64,
    /// Only the response carrying this id may update the view
    pub pending_request_id: Option<u64>,
}

impl ApiTab {
    fn new(default_url: &str) -> Self {
        ApiTab {
            request: RequestSpec::new(HttpMethod::GET, default_url),
            response: ResponseView::default(),
            is_loading: false,
            response_scroll: 0,
            next_request_id: 1,
            pending_request_id: None,
        }
    }
}

/// Main application state
pub struct AppState {
    // Tab navigation
    pub active_tab: AppTab,

    // UI state
    pub focus: Field,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    pub notice: Option<Notice>,

    // Tabs
    pub gen: GenerateTab,
    pub scan: ScanTab,
    pub api: ApiTab,

    // QR artifact and its terminal preview
    pub emitter: QrEmitter,
    pub preview: Option<QrPreview>,
    pub output_dir: PathBuf,

    // Desktop sinks
    pub clipboard: Box<dyn ClipboardSink>,
    pub opener: Box<dyn UrlOpener>,

    // Popups
    pub show_help: bool,
    pub show_image_input: bool,
    pub image_path_input: String,
}

impl AppState {
    pub fn new(config: &Config, storage: &Storage) -> Self {
        Self::with_sinks(
            config,
            storage.output_dir(config),
            Box::new(SystemClipboard),
            Box::new(SystemOpener),
        )
    }

    pub fn with_sinks(
        config: &Config,
        output_dir: PathBuf,
        clipboard: Box<dyn ClipboardSink>,
        opener: Box<dyn UrlOpener>,
    ) -> Self {
        AppState {
            active_tab: AppTab::Generate,
            focus: Field::GenText,
            input_mode: InputMode::Normal,
            cursor_position: 0,
            notice: None,
            gen: GenerateTab {
                size: config.qr.default_size,
                ..Default::default()
            },
            scan: ScanTab::default(),
            api: ApiTab::new(&config.http.default_url),
            emitter: QrEmitter::new(Box::new(MatrixEncoder)),
            preview: None,
            output_dir,
            clipboard,
            opener,
            show_help: false,
            show_image_input: false,
            image_path_input: String::new(),
        }
    }

    /// Generate a unique request ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.api.next_request_id;
        self.api.next_request_id += 1;
        id
    }

    /// Fields reachable with Tab on the active tab, in order
    pub fn fields(&self) -> Vec<Field> {
        match self.active_tab {
            AppTab::Generate => match self.gen.mode {
                GenerateMode::Text => vec![Field::GenText],
                GenerateMode::Url => vec![Field::GenUrl],
                GenerateMode::Contact => vec![
                    Field::ContactName,
                    Field::ContactOrg,
                    Field::ContactPhone,
                    Field::ContactEmail,
                ],
            },
            AppTab::Scan => Vec::new(),
            AppTab::Api => {
                let mut fields = vec![Field::ApiUrl, Field::ApiHeaders];
                if self.api.request.method.carries_body() {
                    fields.push(Field::ApiBody);
                }
                fields.push(Field::ApiResponse);
                fields
            }
        }
    }

    /// Get the current input field content
    pub fn current_input(&self) -> &str {
        match self.focus {
            Field::GenText => &self.gen.text,
            Field::GenUrl => &self.gen.url,
            Field::ContactName => &self.gen.contact.name,
            Field::ContactOrg => &self.gen.contact.organization,
            Field::ContactPhone => &self.gen.contact.phone,
            Field::ContactEmail => &self.gen.contact.email,
            Field::ApiUrl => &self.api.request.url,
            Field::ApiHeaders => &self.api.request.headers,
            Field::ApiBody => &self.api.request.body,
            Field::ApiResponse => "",
        }
    }

    /// Get mutable reference to current input field
    pub fn current_input_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::GenText => Some(&mut self.gen.text),
            Field::GenUrl => Some(&mut self.gen.url),
            Field::ContactName => Some(&mut self.gen.contact.name),
            Field::ContactOrg => Some(&mut self.gen.contact.organization),
            Field::ContactPhone => Some(&mut self.gen.contact.phone),
            Field::ContactEmail => Some(&mut self.gen.contact.email),
            Field::ApiUrl => Some(&mut self.api.request.url),
            Field::ApiHeaders => Some(&mut self.api.request.headers),
            Field::ApiBody => Some(&mut self.api.request.body),
            Field::ApiResponse => None,
        }
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        let scan_category = self.scan.result.as_ref().map(|r| classify(&r.text));
        let scan_contact = match (&self.scan.result, scan_category) {
            (Some(result), Some(ResultCategory::ContactCard)) => Some(extract_fields(&result.text)),
            _ => None,
        };

        RenderState {
            active_tab: self.active_tab,
            focus: self.focus,
            input_mode: self.input_mode,
            cursor_position: self.cursor_position,
            notice: self.notice.clone(),
            gen_mode: self.gen.mode,
            gen_size: self.gen.size,
            gen_text: self.gen.text.clone(),
            gen_url: self.gen.url.clone(),
            contact: self.gen.contact.clone(),
            preview: self.preview.clone(),
            scanning: self.scan.scanning,
            has_flash: self.scan.has_flash,
            flash_on: self.scan.flash_on,
            scan_result: self.scan.result.clone(),
            scan_category,
            scan_contact,
            request: self.api.request.clone(),
            response: self.api.response.clone(),
            response_scroll: self.api.response_scroll,
            is_loading: self.api.is_loading,
            show_help: self.show_help,
            show_image_input: self.show_image_input,
            image_path_input: self.image_path_input.clone(),
        }
    }
}
