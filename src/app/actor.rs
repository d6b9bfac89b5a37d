//! App actor - message loop processing UI events, network and scan responses

use tokio::sync::mpsc;

use crate::app::state::AppState;
use crate::messages::ui_events::InputMode;
use crate::messages::{
    NetworkCommand, NetworkResponse, RenderState, ScanCommand, ScanResponse, UiEvent,
};

/// App actor that processes UI events and actor responses
pub struct AppActor {
    state: AppState,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    scan_tx: mpsc::UnboundedSender<ScanCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        state: AppState,
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        scan_tx: mpsc::UnboundedSender<ScanCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            state,
            network_tx,
            scan_tx,
            render_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
        mut scan_rx: mpsc::UnboundedReceiver<ScanResponse>,
    ) {
        // Send initial render state
        let _ = self.render_tx.send(self.state.to_render_state());

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.handle_ui_event(event) {
                        // Quit signal received
                        let _ = self.network_tx.send(NetworkCommand::Shutdown);
                        let _ = self.scan_tx.send(ScanCommand::Shutdown);
                        break;
                    }
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                Some(response) = net_rx.recv() => {
                    self.state.handle_response(response);
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                Some(response) = scan_rx.recv() => {
                    self.state.handle_scan_response(response);
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                else => break,
            }
        }
    }

    fn send_network(&self, cmd: Option<NetworkCommand>) {
        if let Some(cmd) = cmd {
            let _ = self.network_tx.send(cmd);
        }
    }

    fn send_scan(&self, cmd: Option<ScanCommand>) {
        if let Some(cmd) = cmd {
            let _ = self.scan_tx.send(cmd);
        }
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        match event {
            // Tab switching
            UiEvent::SwitchTab(tab) => self.state.switch_tab(tab),

            // Field navigation
            UiEvent::NextField => self.state.next_field(),
            UiEvent::PrevField => self.state.prev_field(),
            UiEvent::ScrollUp => self.state.scroll_up(),
            UiEvent::ScrollDown => self.state.scroll_down(),

            // Input editing
            UiEvent::StartEditing => self.state.start_editing(),
            UiEvent::StopEditing => self.state.stop_editing(),
            UiEvent::CharInput(c) => self.state.enter_char(c),
            UiEvent::Backspace => self.state.delete_char(),
            UiEvent::CursorLeft => self.state.move_cursor_left(),
            UiEvent::CursorRight => self.state.move_cursor_right(),

            // Generate
            UiEvent::CycleMode => self.state.cycle_mode(),
            UiEvent::CycleSize => self.state.cycle_size(),
            UiEvent::Generate => self.state.generate(),
            UiEvent::SaveQr => self.state.save_qr(),
            UiEvent::CopyQr => self.state.copy_qr(),

            // Scan
            UiEvent::StartScan => {
                let cmd = self.state.start_scan();
                self.send_scan(cmd);
            }
            UiEvent::StopScan => {
                let cmd = self.state.stop_scan();
                self.send_scan(cmd);
            }
            UiEvent::ToggleFlash => {
                let cmd = self.state.toggle_flash();
                self.send_scan(cmd);
            }
            UiEvent::OpenImageInput => self.state.open_image_input(),
            UiEvent::ImagePathChar(c) => self.state.image_path_char(c),
            UiEvent::ImagePathBackspace => self.state.image_path_backspace(),
            UiEvent::ScanImage => {
                let cmd = self.state.scan_image();
                self.send_scan(cmd);
            }
            UiEvent::CancelImageInput => self.state.cancel_image_input(),
            UiEvent::CopyScanResult => self.state.copy_scan_result(),
            UiEvent::OpenScanUrl => self.state.open_scan_url(),

            // API
            UiEvent::CycleMethod => self.state.cycle_method(),
            UiEvent::SendRequest => {
                // Stop editing first if in URL field
                if self.state.input_mode == InputMode::Editing {
                    self.state.stop_editing();
                }
                let cmd = self.state.send_request();
                self.send_network(cmd);
            }
            UiEvent::CancelRequest => {
                let cmd = self.state.cancel_request();
                self.send_network(cmd);
            }
            UiEvent::CopyResponse => self.state.copy_response(),

            // Popups
            UiEvent::ToggleHelp => self.state.toggle_help(),
            UiEvent::CloseHelp => self.state.close_help(),

            // System
            UiEvent::Quit => return true,
        }

        false
    }
}
