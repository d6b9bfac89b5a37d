//! Render state - data structure sent from App layer to UI for rendering

use crate::app::state::Notice;
use crate::messages::ui_events::{AppTab, Field, InputMode};
use crate::models::{
    ContactFields, ContactInfo, GenerateMode, QrSize, RequestSpec, ResponseView, ResultCategory,
    ScanResult,
};
use crate::qr::QrPreview;

/// Complete state needed by the UI to render
#[derive(Debug, Clone)]
pub struct RenderState {
    // Tab
    pub active_tab: AppTab,

    // UI state
    pub focus: Field,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    pub notice: Option<Notice>,

    // Generate
    pub gen_mode: GenerateMode,
    pub gen_size: QrSize,
    pub gen_text: String,
    pub gen_url: String,
    pub contact: ContactInfo,
    pub preview: Option<QrPreview>,

    // Scan
    pub scanning: bool,
    pub has_flash: bool,
    pub flash_on: bool,
    pub scan_result: Option<ScanResult>,
    pub scan_category: Option<ResultCategory>,
    /// Only present when the result is a contact card
    pub scan_contact: Option<ContactFields>,

    // API
    pub request: RequestSpec,
    pub response: ResponseView,
    pub response_scroll: u16,
    pub is_loading: bool,

    // Popups
    pub show_help: bool,
    pub show_image_input: bool,
    pub image_path_input: String,
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState {
            active_tab: AppTab::Generate,
            focus: Field::GenText,
            input_mode: InputMode::Normal,
            cursor_position: 0,
            notice: None,
            gen_mode: GenerateMode::Text,
            gen_size: QrSize::default(),
            gen_text: String::new(),
            gen_url: String::new(),
            contact: ContactInfo::default(),
            preview: None,
            scanning: false,
            has_flash: false,
            flash_on: false,
            scan_result: None,
            scan_category: None,
            scan_contact: None,
            request: RequestSpec::default(),
            response: ResponseView::default(),
            response_scroll: 0,
            is_loading: false,
            show_help: false,
            show_image_input: false,
            image_path_input: String::new(),
        }
    }
}
