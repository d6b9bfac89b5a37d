//! QR Probe TUI - QR generator/scanner and HTTP request tester
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - central state machine processing events
//! - Network Layer (Tokio) - async HTTP execution
//! - Scan Layer - camera session and frame decoding

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc;

use qrprobe::app::{AppActor, AppState};
use qrprobe::config::Config;
use qrprobe::constants::{API_URL_PLACEHOLDER, APP_NAME, APP_VERSION};
use qrprobe::messages::ui_events::{key_to_ui_event, AppTab, Field, InputMode};
use qrprobe::messages::{
    NetworkCommand, NetworkResponse, RenderState, ScanCommand, ScanResponse, UiEvent,
};
use qrprobe::models::{GenerateMode, QrSize};
use qrprobe::network::NetworkActor;
use qrprobe::qr::camera::FrameDirCamera;
use qrprobe::qr::decoder::GridDecoder;
use qrprobe::qr::{ScanActor, ScanController};
use qrprobe::storage::Storage;
use qrprobe::ui::{
    category_color, cursor_in_field, field_border, highlight_json, method_color, notice_color,
    outcome_color, render_input, render_tabs,
};

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let storage = Storage::new();
    let loaded = storage.load_config();
    let defaults = Config::default();

    // Initialize logging to file
    let log_path = storage.log_file(loaded.as_ref().unwrap_or(&defaults));
    let log_dir = log_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| ".".into());
    std::fs::create_dir_all(&log_dir)?;
    let log_name = log_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "qrprobe.log".into());
    let file_appender = tracing_appender::rolling::never(log_dir, log_name);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "Invalid config, using defaults");
            defaults
        }
    };
    match storage.write_default_config(&config) {
        Ok(true) => tracing::info!(path = %storage.config_path().display(), "Wrote default config"),
        Ok(false) => {}
        Err(e) => tracing::warn!(error = %format!("{:#}", e), "Could not write default config"),
    }
    tracing::info!(version = APP_VERSION, "Starting {}", APP_NAME);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _terminal_guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (scan_cmd_tx, scan_cmd_rx) = mpsc::unbounded_channel::<ScanCommand>();
    let (scan_resp_tx, scan_resp_rx) = mpsc::unbounded_channel::<ScanResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn network actor
    let network_actor = NetworkActor::new(net_resp_tx, config.http.timeout());
    tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn scan actor
    let camera = FrameDirCamera::new(storage.frames_dir(&config));
    let (controller, loop_rx) = ScanController::new(
        Box::new(camera),
        Arc::new(GridDecoder),
        config.camera.scan_interval(),
    );
    let scan_actor = ScanActor::new(controller, loop_rx, scan_resp_tx);
    tokio::spawn(scan_actor.run(scan_cmd_rx));

    // Spawn app actor
    let app_actor = AppActor::new(
        AppState::new(&config, &storage),
        net_cmd_tx,
        scan_cmd_tx,
        render_tx,
    );
    tokio::spawn(app_actor.run(ui_rx, net_resp_rx, scan_resp_rx));

    // Run UI loop (synchronous with async polling)
    run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await?;

    Ok(())
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();

    loop {
        // Draw with current state
        terminal.draw(|f| draw_ui(f, &current_state))?;

        // Poll for events with timeout
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Some(event) = key_to_ui_event(
                    key,
                    current_state.active_tab,
                    current_state.focus,
                    current_state.input_mode,
                    current_state.show_help,
                    current_state.show_image_input,
                ) {
                    let quit = matches!(event, UiEvent::Quit);
                    let _ = ui_tx.send(event);
                    if quit {
                        break;
                    }
                }
            }
        }

        // Check for state updates (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
        }
    }

    // Let the actors see the shutdown before the runtime goes away
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Length(1), // Notice
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_tab_bar(f, state, main_chunks[0]);
    draw_notice(f, state, main_chunks[1]);

    match state.active_tab {
        AppTab::Generate => draw_generate_tab(f, state, main_chunks[2]),
        AppTab::Scan => draw_scan_tab(f, state, main_chunks[2]),
        AppTab::Api => draw_api_tab(f, state, main_chunks[2]),
    }

    draw_status_bar(f, state, main_chunks[3]);

    // Popups
    if state.show_help {
        draw_help_popup(f, area);
    }

    if state.show_image_input {
        draw_image_input_popup(f, state, area);
    }
}

fn draw_tab_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let mut spans = Vec::new();
    for tab in AppTab::ALL {
        let style = if state.active_tab == tab {
            Style::default().fg(Color::Black).bg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {}:{} ", tab.index() + 1, tab.title()), style));
        spans.push(Span::raw(" "));
    }
    if state.scanning {
        spans.push(Span::styled("[scanning]", Style::default().fg(Color::Green)));
    }
    if state.is_loading {
        spans.push(Span::styled("[request...]", Style::default().fg(Color::Yellow)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_notice(f: &mut Frame, state: &RenderState, area: Rect) {
    let Some(notice) = &state.notice else {
        return;
    };
    let color = notice_color(notice.level);
    let line = Line::from(vec![
        Span::styled(format!(" {} ", notice.title), Style::default().fg(Color::Black).bg(color).bold()),
        Span::styled(format!(" {}", notice.message), Style::default().fg(color)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn editing(state: &RenderState, field: Field) -> bool {
    state.focus == field && state.input_mode == InputMode::Editing
}

/// Draw one input and place the cursor in it while editing
fn draw_field(
    f: &mut Frame,
    state: &RenderState,
    field: Field,
    content: &str,
    placeholder: &str,
    area: Rect,
) {
    let border = field_border(state.focus == field, editing(state, field));
    f.render_widget(render_input(content, field.label(), placeholder, border), area);
    if editing(state, field) {
        f.set_cursor_position(cursor_in_field(area, content, state.cursor_position));
    }
}

// ---------------------------------------------------------------------------
// Generate tab
// ---------------------------------------------------------------------------

fn draw_generate_tab(f: &mut Frame, state: &RenderState, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let form = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Mode tabs
            Constraint::Min(3),    // Inputs
            Constraint::Length(3), // Size selector
        ])
        .split(columns[0]);

    f.render_widget(render_tabs(&["Text", "URL", "Contact"], state.gen_mode.index()), form[0]);

    match state.gen_mode {
        GenerateMode::Text => draw_field(
            f,
            state,
            Field::GenText,
            &state.gen_text,
            "Enter text to encode...",
            form[1],
        ),
        GenerateMode::Url => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(0)])
                .split(form[1]);
            draw_field(f, state, Field::GenUrl, &state.gen_url, "https://example.com", rows[0]);
        }
        GenerateMode::Contact => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Length(3),
                    Constraint::Length(3),
                    Constraint::Length(3),
                    Constraint::Min(0),
                ])
                .split(form[1]);
            let contact = &state.contact;
            draw_field(f, state, Field::ContactName, &contact.name, "John Doe", rows[0]);
            draw_field(f, state, Field::ContactOrg, &contact.organization, "Company Inc.", rows[1]);
            draw_field(f, state, Field::ContactPhone, &contact.phone, "+1 555 123 4567", rows[2]);
            draw_field(f, state, Field::ContactEmail, &contact.email, "john@example.com", rows[3]);
        }
    }

    let sizes: Vec<Span> = QrSize::ALL
        .iter()
        .flat_map(|size| {
            let style = if *size == state.gen_size {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            [Span::styled(format!("{}px", size.pixels()), style), Span::raw("  ")]
        })
        .collect();
    let size_bar = Paragraph::new(Line::from(sizes))
        .block(Block::default().borders(Borders::ALL).title(" Size (z) "));
    f.render_widget(size_bar, form[2]);

    draw_preview(f, state, columns[1]);
}

fn draw_preview(f: &mut Frame, state: &RenderState, area: Rect) {
    let Some(preview) = &state.preview else {
        let empty = Paragraph::new("No QR code yet.\n\nPress 'g' to generate.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" QR Code "));
        f.render_widget(empty, area);
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" QR Code {}px ", preview.size.pixels()))
        .title_bottom(Line::from(" d:save  y:copy ").right_aligned());

    let symbol = Style::default().fg(Color::Black).bg(Color::White);
    let lines: Vec<Line> = preview
        .lines
        .iter()
        .map(|l| Line::from(Span::styled(l.clone(), symbol)))
        .collect();

    let widget = Paragraph::new(lines).block(block).alignment(Alignment::Center);
    f.render_widget(widget, area);
}

// ---------------------------------------------------------------------------
// Scan tab
// ---------------------------------------------------------------------------

fn draw_scan_tab(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(5)])
        .split(area);

    let (status, color) = if state.scanning {
        ("Scanning... point the camera at a QR code", Color::Green)
    } else {
        ("Camera idle", Color::DarkGray)
    };
    let flash = match (state.has_flash, state.flash_on) {
        (false, _) => "Flash: unavailable",
        (true, true) => "Flash: on (f)",
        (true, false) => "Flash: off (f)",
    };
    let session = Paragraph::new(vec![
        Line::from(Span::styled(status, Style::default().fg(color).bold())),
        Line::from(Span::styled(flash, Style::default().fg(Color::Gray))),
    ])
    .block(Block::default().borders(Borders::ALL).title(" Camera (s:start x:stop i:image) "));
    f.render_widget(session, chunks[0]);

    draw_scan_result(f, state, chunks[1]);
}

fn draw_scan_result(f: &mut Frame, state: &RenderState, area: Rect) {
    let (Some(result), Some(category)) = (&state.scan_result, state.scan_category) else {
        let empty = Paragraph::new("No result yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Scan Result "));
        f.render_widget(empty, area);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            category.label(),
            Style::default().fg(category_color(category)).bold(),
        )),
        Line::from(Span::styled(
            format!("Scanned at {}", result.scanned_at.with_timezone(&chrono::Local).format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        )),
        Line::default(),
    ];

    if let Some(contact) = &state.scan_contact {
        for (label, value) in [
            ("Name", &contact.name),
            ("Organization", &contact.organization),
            ("Phone", &contact.phone),
            ("Email", &contact.email),
        ] {
            if !value.is_empty() {
                lines.push(Line::from(vec![
                    Span::styled(format!("{:<14}", label), Style::default().fg(Color::Gray)),
                    Span::raw(value.clone()),
                ]));
            }
        }
        lines.push(Line::default());
    }

    lines.extend(result.text.lines().map(|l| Line::from(l.to_string())));

    let mut actions = Vec::new();
    if category.can_copy() {
        actions.push("y:copy");
    }
    if category.can_open() {
        actions.push("o:open");
    }

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Scan Result ")
                .title_bottom(Line::from(format!(" {} ", actions.join("  "))).right_aligned()),
        );
    f.render_widget(widget, area);
}

// ---------------------------------------------------------------------------
// API tab
// ---------------------------------------------------------------------------

fn draw_api_tab(f: &mut Frame, state: &RenderState, area: Rect) {
    let has_body = state.request.method.carries_body();
    let mut constraints = vec![Constraint::Length(3), Constraint::Length(5)];
    if has_body {
        constraints.push(Constraint::Length(6));
    }
    constraints.push(Constraint::Min(5));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    draw_url_bar(f, state, chunks[0]);
    draw_field(
        f,
        state,
        Field::ApiHeaders,
        &state.request.headers,
        r#"{"Authorization": "Bearer your-token"}"#,
        chunks[1],
    );
    if has_body {
        draw_field(
            f,
            state,
            Field::ApiBody,
            &state.request.body,
            r#"{"key": "value"}"#,
            chunks[2],
        );
    }
    draw_response(f, state, chunks[chunks.len() - 1]);
}

fn draw_url_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let method = state.request.method.as_str();
    let loading = if state.is_loading { " [...]" } else { "" };
    let border = field_border(state.focus == Field::ApiUrl, editing(state, Field::ApiUrl));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" {}{} ", method, loading))
        .title_style(Style::default().fg(method_color(method)).bold());

    let text = if state.request.url.is_empty() {
        Span::styled(API_URL_PLACEHOLDER, Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(state.request.url.as_str())
    };
    f.render_widget(Paragraph::new(text).block(block), area);

    if editing(state, Field::ApiUrl) {
        f.set_cursor_position(cursor_in_field(area, &state.request.url, state.cursor_position));
    }
}

fn draw_response(f: &mut Frame, state: &RenderState, area: Rect) {
    let border = field_border(state.focus == Field::ApiResponse, false);
    let marker = Style::default().fg(outcome_color(state.response.outcome)).bold();

    let status_text = match state.response.status_code {
        Some(code) => Span::styled(format!(" {} ", code), marker),
        None if state.response.outcome.is_some() => Span::styled(" Error ", marker),
        None => Span::raw(" Response "),
    };

    let time_text = if state.response.time_ms > 0 {
        format!(" {}ms ", state.response.time_ms)
    } else {
        String::new()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(status_text)
        .title_bottom(Line::from(time_text).right_aligned());

    let body = if state.is_loading {
        vec![Line::from(Span::styled("Sending...", Style::default().fg(Color::Yellow)))]
    } else {
        highlight_json(&state.response.body)
    };
    let response = Paragraph::new(body)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((state.response_scroll, 0));
    f.render_widget(response, area);
}

// ---------------------------------------------------------------------------
// Status bar and popups
// ---------------------------------------------------------------------------

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let status = if state.input_mode == InputMode::Editing {
        " ESC:stop editing | arrows:move | Enter:submit "
    } else {
        match state.active_tab {
            AppTab::Generate => " Tab:field | e:edit | m:mode | z:size | g:generate | d:save | y:copy | ?:help | q:quit ",
            AppTab::Scan => " s:start | x:stop | f:flash | i:image | y:copy | o:open | ?:help | q:quit ",
            AppTab::Api if state.is_loading => " Loading... Ctrl+X:cancel ",
            AppTab::Api => " Tab:field | e:edit | m:method | s:send | y:copy | ?:help | q:quit ",
        }
    };

    let bar = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));
    f.render_widget(bar, area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 80, area);

    let help_text = r#"
 GLOBAL
   1 / 2 / 3          Generate / Scan / API tab
   ?                  Toggle this help
   q / Ctrl+C         Quit

 GENERATE
   Tab / Shift+Tab    Next / previous field
   e / Enter          Edit field (Esc to stop)
   m                  Cycle Text / URL / Contact
   z                  Cycle size
   g                  Generate QR code
   d                  Save PNG
   y                  Copy image to clipboard

 SCAN
   s / x              Start / stop camera
   f                  Toggle flash
   i                  Scan an image file
   y / o              Copy result / open URL

 API
   m                  Cycle HTTP method
   s                  Send request
   Ctrl+X             Cancel request
   y                  Copy response
   Up / Down          Scroll response

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} {} ", APP_NAME, APP_VERSION))
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text).block(block).wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}

fn draw_image_input_popup(f: &mut Frame, state: &RenderState, area: Rect) {
    let popup_area = centered_rect(60, 20, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Scan Image (Enter to scan, Esc to cancel) ")
        .style(Style::default().bg(Color::Black));

    let content = if state.image_path_input.is_empty() {
        "Enter image file path...\n\nExample: ~/Pictures/qr.png"
    } else {
        state.image_path_input.as_str()
    };

    let input = Paragraph::new(content).block(block).wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(input, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
