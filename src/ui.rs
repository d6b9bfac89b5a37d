//! Widget helpers shared by the tab renderers

use ratatui::{prelude::*, widgets::*};

use crate::app::state::NoticeLevel;
use crate::models::{ProbeOutcome, ResultCategory};

/// Border style for a field given focus and edit state
pub fn field_border(is_focused: bool, is_editing: bool) -> Style {
    if is_focused && is_editing {
        Style::default().fg(Color::Yellow)
    } else if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

/// Renders a text input field, dimmed placeholder when empty
pub fn render_input<'a>(
    content: &'a str,
    title: &'a str,
    placeholder: &'a str,
    border_style: Style,
) -> Paragraph<'a> {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(" {} ", title));

    let text = if content.is_empty() {
        Text::from(Span::styled(placeholder, Style::default().fg(Color::DarkGray)))
    } else {
        Text::from(content)
    };

    Paragraph::new(text).block(block).wrap(Wrap { trim: false })
}

/// Terminal cell of the cursor inside a bordered field
pub fn cursor_in_field(area: Rect, content: &str, cursor: usize) -> Position {
    let before = &content[..cursor.min(content.len())];
    let row = before.matches('\n').count() as u16;
    let col = before
        .rsplit('\n')
        .next()
        .map(|line| line.chars().count())
        .unwrap_or(0) as u16;

    let max_x = area.x + area.width.saturating_sub(2);
    let max_y = area.y + area.height.saturating_sub(2);
    Position::new((area.x + 1 + col).min(max_x), (area.y + 1 + row).min(max_y))
}

/// Renders tabs
pub fn render_tabs<'a>(titles: &[&'a str], selected: usize) -> Tabs<'a> {
    let titles: Vec<Line> = titles.iter().map(|t| Line::from(*t)).collect();

    Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Yellow).bold())
        .divider("|")
}

/// Simple JSON syntax highlighting
pub fn highlight_json(text: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for line in text.lines() {
        let mut spans = Vec::new();
        let mut current = String::new();
        let mut in_string = false;
        let mut escaped = false;
        let is_key_line = line.trim_start().starts_with('"') && line.contains("\":");
        let mut seen_colon = false;

        for c in line.chars() {
            if in_string {
                current.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    let color = if is_key_line && !seen_colon {
                        Color::Cyan
                    } else {
                        Color::Green
                    };
                    spans.push(Span::styled(std::mem::take(&mut current), Style::default().fg(color)));
                    in_string = false;
                }
                continue;
            }

            match c {
                '"' => {
                    flush_plain(&mut spans, &mut current);
                    in_string = true;
                    current.push(c);
                }
                ':' => {
                    flush_plain(&mut spans, &mut current);
                    seen_colon = true;
                    spans.push(Span::styled(":", Style::default().fg(Color::White)));
                }
                '{' | '}' | '[' | ']' => {
                    flush_plain(&mut spans, &mut current);
                    spans.push(Span::styled(c.to_string(), Style::default().fg(Color::Yellow)));
                }
                ',' => {
                    flush_plain(&mut spans, &mut current);
                    spans.push(Span::raw(","));
                }
                _ => current.push(c),
            }
        }

        if in_string {
            spans.push(Span::styled(current, Style::default().fg(Color::Green)));
        } else {
            flush_plain(&mut spans, &mut current);
        }
        lines.push(Line::from(spans));
    }

    lines
}

/// Push a run of non-string text, colouring numbers and literals
fn flush_plain(spans: &mut Vec<Span<'static>>, current: &mut String) {
    if current.is_empty() {
        return;
    }
    let token = std::mem::take(current);
    let trimmed = token.trim();
    let color = if matches!(trimmed, "true" | "false" | "null") {
        Some(Color::Magenta)
    } else if !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
    {
        Some(Color::Yellow)
    } else {
        None
    };

    match color {
        Some(color) => spans.push(Span::styled(token, Style::default().fg(color))),
        None => spans.push(Span::raw(token)),
    }
}

/// Outcome marker colour: success green, HTTP error red, anything else neutral
pub fn outcome_color(outcome: Option<ProbeOutcome>) -> Color {
    match outcome {
        Some(ProbeOutcome::Success) => Color::Green,
        Some(ProbeOutcome::HttpError) | Some(ProbeOutcome::NetworkError) => Color::Red,
        Some(ProbeOutcome::Other) | None => Color::Gray,
    }
}

/// Method color
pub fn method_color(method: &str) -> Color {
    match method {
        "GET" => Color::Green,
        "POST" => Color::Yellow,
        "PUT" => Color::Blue,
        "PATCH" => Color::Cyan,
        "DELETE" => Color::Red,
        _ => Color::White,
    }
}

pub fn category_color(category: ResultCategory) -> Color {
    match category {
        ResultCategory::ContactCard => Color::Magenta,
        ResultCategory::WebsiteUrl => Color::Cyan,
        ResultCategory::EmailAddress => Color::Blue,
        ResultCategory::PhoneNumber => Color::Green,
        ResultCategory::PlainText => Color::White,
    }
}

pub fn notice_color(level: NoticeLevel) -> Color {
    match level {
        NoticeLevel::Info => Color::Cyan,
        NoticeLevel::Success => Color::Green,
        NoticeLevel::Warning => Color::Yellow,
        NoticeLevel::Error => Color::Red,
    }
}
