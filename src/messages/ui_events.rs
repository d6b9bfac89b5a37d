//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Application tabs
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum AppTab {
    #[default]
    Generate,
    Scan,
    Api,
}

impl AppTab {
    pub const ALL: [AppTab; 3] = [AppTab::Generate, AppTab::Scan, AppTab::Api];

    pub fn title(&self) -> &'static str {
        match self {
            AppTab::Generate => "Generate",
            AppTab::Scan => "Scan",
            AppTab::Api => "API",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            AppTab::Generate => 0,
            AppTab::Scan => 1,
            AppTab::Api => 2,
        }
    }
}

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Tab navigation
    SwitchTab(AppTab),

    // Field navigation
    NextField,
    PrevField,
    ScrollUp,
    ScrollDown,

    // Input editing
    StartEditing,
    StopEditing,
    CharInput(char),
    Backspace,
    CursorLeft,
    CursorRight,

    // Generate
    CycleMode,
    CycleSize,
    Generate,
    SaveQr,
    CopyQr,

    // Scan
    StartScan,
    StopScan,
    ToggleFlash,
    OpenImageInput,
    ImagePathChar(char),
    ImagePathBackspace,
    ScanImage,
    CancelImageInput,
    CopyScanResult,
    OpenScanUrl,

    // API
    SendRequest,
    CancelRequest,
    CycleMethod,
    CopyResponse,

    // Popups
    ToggleHelp,
    CloseHelp,

    // System
    Quit,
}

/// Focusable input field (needed for context-aware event mapping)
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Field {
    GenText,
    GenUrl,
    ContactName,
    ContactOrg,
    ContactPhone,
    ContactEmail,
    ApiUrl,
    ApiHeaders,
    ApiBody,
    ApiResponse,
}

impl Field {
    /// Enter inserts a newline instead of submitting
    pub fn is_multiline(&self) -> bool {
        matches!(self, Field::GenText | Field::ApiHeaders | Field::ApiBody)
    }

    pub fn is_editable(&self) -> bool {
        !matches!(self, Field::ApiResponse)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::GenText => "Text",
            Field::GenUrl => "URL",
            Field::ContactName => "Name",
            Field::ContactOrg => "Organization",
            Field::ContactPhone => "Phone",
            Field::ContactEmail => "Email",
            Field::ApiUrl => "URL",
            Field::ApiHeaders => "Headers (JSON)",
            Field::ApiBody => "Body",
            Field::ApiResponse => "Response",
        }
    }
}

/// Input mode
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Convert a key event to a UiEvent based on current UI context
pub fn key_to_ui_event(
    key: KeyEvent,
    active_tab: AppTab,
    focus: Field,
    input_mode: InputMode,
    show_help: bool,
    show_image_input: bool,
) -> Option<UiEvent> {
    use crossterm::event::KeyEventKind;

    if key.kind != KeyEventKind::Press {
        return None;
    }

    // Global Ctrl shortcuts
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('x') => return Some(UiEvent::CancelRequest),
            KeyCode::Char('c') => return Some(UiEvent::Quit),
            _ => {}
        }
    }

    // Tab switching: 1, 2 and 3 (only in normal mode, not editing)
    if input_mode == InputMode::Normal && !show_help && !show_image_input {
        match key.code {
            KeyCode::Char('1') => return Some(UiEvent::SwitchTab(AppTab::Generate)),
            KeyCode::Char('2') => return Some(UiEvent::SwitchTab(AppTab::Scan)),
            KeyCode::Char('3') => return Some(UiEvent::SwitchTab(AppTab::Api)),
            _ => {}
        }
    }

    // Handle popups first (same for all tabs)
    if show_help {
        return Some(UiEvent::CloseHelp);
    }

    if show_image_input {
        return match key.code {
            KeyCode::Esc => Some(UiEvent::CancelImageInput),
            KeyCode::Enter => Some(UiEvent::ScanImage),
            KeyCode::Backspace => Some(UiEvent::ImagePathBackspace),
            KeyCode::Char(c) => Some(UiEvent::ImagePathChar(c)),
            _ => None,
        };
    }

    if input_mode == InputMode::Editing {
        return handle_editing_keys(key, focus);
    }

    match key.code {
        KeyCode::Char('q') => return Some(UiEvent::Quit),
        KeyCode::Char('?') => return Some(UiEvent::ToggleHelp),
        _ => {}
    }

    // Tab-specific key handling
    match active_tab {
        AppTab::Generate => handle_generate_tab_keys(key),
        AppTab::Scan => handle_scan_tab_keys(key),
        AppTab::Api => handle_api_tab_keys(key, focus),
    }
}

/// Keys while a text field is being edited
fn handle_editing_keys(key: KeyEvent, focus: Field) -> Option<UiEvent> {
    match key.code {
        KeyCode::Esc => Some(UiEvent::StopEditing),
        KeyCode::Left => Some(UiEvent::CursorLeft),
        KeyCode::Right => Some(UiEvent::CursorRight),
        KeyCode::Backspace => Some(UiEvent::Backspace),
        KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
        KeyCode::Enter if focus.is_multiline() => Some(UiEvent::CharInput('\n')),
        KeyCode::Enter => match focus {
            Field::ApiUrl => Some(UiEvent::SendRequest),
            Field::GenUrl
            | Field::ContactName
            | Field::ContactOrg
            | Field::ContactPhone
            | Field::ContactEmail => Some(UiEvent::Generate),
            _ => Some(UiEvent::StopEditing),
        },
        _ => None,
    }
}

/// Handle keys for the Generate tab
fn handle_generate_tab_keys(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Tab => Some(UiEvent::NextField),
        KeyCode::BackTab => Some(UiEvent::PrevField),
        KeyCode::Char('e') | KeyCode::Enter => Some(UiEvent::StartEditing),
        KeyCode::Char('m') => Some(UiEvent::CycleMode),
        KeyCode::Char('z') => Some(UiEvent::CycleSize),
        KeyCode::Char('g') => Some(UiEvent::Generate),
        KeyCode::Char('d') => Some(UiEvent::SaveQr),
        KeyCode::Char('y') => Some(UiEvent::CopyQr),
        _ => None,
    }
}

/// Handle keys for the Scan tab
fn handle_scan_tab_keys(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Char('s') | KeyCode::Enter => Some(UiEvent::StartScan),
        KeyCode::Char('x') | KeyCode::Esc => Some(UiEvent::StopScan),
        KeyCode::Char('f') => Some(UiEvent::ToggleFlash),
        KeyCode::Char('i') => Some(UiEvent::OpenImageInput),
        KeyCode::Char('y') => Some(UiEvent::CopyScanResult),
        KeyCode::Char('o') => Some(UiEvent::OpenScanUrl),
        _ => None,
    }
}

/// Handle keys for the API tab
fn handle_api_tab_keys(key: KeyEvent, focus: Field) -> Option<UiEvent> {
    match key.code {
        KeyCode::Tab => Some(UiEvent::NextField),
        KeyCode::BackTab => Some(UiEvent::PrevField),
        KeyCode::Char('e') | KeyCode::Enter if focus.is_editable() => Some(UiEvent::StartEditing),
        KeyCode::Char('m') => Some(UiEvent::CycleMethod),
        KeyCode::Char('s') => Some(UiEvent::SendRequest),
        KeyCode::Char('y') => Some(UiEvent::CopyResponse),
        KeyCode::Up if focus == Field::ApiResponse => Some(UiEvent::ScrollUp),
        KeyCode::Down if focus == Field::ApiResponse => Some(UiEvent::ScrollDown),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn normal(tab: AppTab, focus: Field, code: KeyCode) -> Option<UiEvent> {
        key_to_ui_event(press(code), tab, focus, InputMode::Normal, false, false)
    }

    #[test]
    fn test_tab_switching_only_in_normal_mode() {
        assert_eq!(
            normal(AppTab::Generate, Field::GenText, KeyCode::Char('3')),
            Some(UiEvent::SwitchTab(AppTab::Api))
        );
        let editing = key_to_ui_event(
            press(KeyCode::Char('3')),
            AppTab::Generate,
            Field::GenText,
            InputMode::Editing,
            false,
            false,
        );
        assert_eq!(editing, Some(UiEvent::CharInput('3')));
    }

    #[test]
    fn test_ctrl_x_cancels_everywhere() {
        let key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL);
        let event = key_to_ui_event(key, AppTab::Api, Field::ApiBody, InputMode::Editing, false, false);
        assert_eq!(event, Some(UiEvent::CancelRequest));
    }

    #[test]
    fn test_same_key_differs_by_tab() {
        assert_eq!(
            normal(AppTab::Generate, Field::GenText, KeyCode::Char('m')),
            Some(UiEvent::CycleMode)
        );
        assert_eq!(
            normal(AppTab::Api, Field::ApiUrl, KeyCode::Char('m')),
            Some(UiEvent::CycleMethod)
        );
        assert_eq!(
            normal(AppTab::Scan, Field::GenText, KeyCode::Char('s')),
            Some(UiEvent::StartScan)
        );
        assert_eq!(
            normal(AppTab::Api, Field::ApiUrl, KeyCode::Char('s')),
            Some(UiEvent::SendRequest)
        );
    }

    #[test]
    fn test_enter_while_editing() {
        let enter = |focus| {
            key_to_ui_event(press(KeyCode::Enter), AppTab::Api, focus, InputMode::Editing, false, false)
        };
        assert_eq!(enter(Field::ApiUrl), Some(UiEvent::SendRequest));
        assert_eq!(enter(Field::ApiBody), Some(UiEvent::CharInput('\n')));
        assert_eq!(enter(Field::GenUrl), Some(UiEvent::Generate));
    }

    #[test]
    fn test_image_popup_captures_keys() {
        let event = key_to_ui_event(
            press(KeyCode::Char('q')),
            AppTab::Scan,
            Field::GenText,
            InputMode::Normal,
            false,
            true,
        );
        assert_eq!(event, Some(UiEvent::ImagePathChar('q')));
    }

    #[test]
    fn test_response_is_not_editable() {
        assert_eq!(normal(AppTab::Api, Field::ApiResponse, KeyCode::Char('e')), None);
        assert_eq!(
            normal(AppTab::Api, Field::ApiResponse, KeyCode::Down),
            Some(UiEvent::ScrollDown)
        );
    }
}
