use agent_chat_core::{Message, Role};
use chrono::{DateTime, Local};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::input::InputState;

/// Everything drawn around the transcript
pub struct Chrome<'a> {
    pub title: &'a str,
    pub input: &'a InputState,
    pub submit_enabled: bool,
    pub notice: Option<&'a str>,
}

/// Render-time clock label shown next to every message
pub fn format_time(time: DateTime<Local>) -> String {
    time.format("%H:%M").to_string()
}

fn role_icon(role: Role) -> &'static str {
    match role {
        Role::User => "●",
        Role::Assistant => "◆",
    }
}

fn role_color(role: Role) -> Color {
    match role {
        Role::User => Color::Cyan,
        Role::Assistant => Color::Yellow,
    }
}

/// User messages sit on the right, assistant messages on the left
fn role_alignment(role: Role) -> Alignment {
    match role {
        Role::User => Alignment::Right,
        Role::Assistant => Alignment::Left,
    }
}

/// Word-wrap a single line of text to `width` columns. Leading indentation
/// is repeated on every wrapped line.
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let body = text.trim_start();
    let indent = &text[..text.len() - body.len()];
    let indent_len = indent.chars().count();
    // Indentation that leaves no room for text is dropped
    let (indent, indent_len) = if indent_len < width {
        (indent, indent_len)
    } else {
        ("", 0)
    };
    let width = width - indent_len;

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in body.split_whitespace() {
        let word_len = word.chars().count();

        if current_len == 0 {
            current_line = word.to_string();
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current_line.push(' ');
            current_line.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(format!("{indent}{current_line}"));
            current_line = word.to_string();
            current_len = word_len;
        }
    }

    if !current_line.is_empty() {
        lines.push(format!("{indent}{current_line}"));
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            chars.next();

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;

            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                if !current_text.is_empty() {
                    spans.push(Span::raw(std::mem::take(&mut current_text)));
                }
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
                if found_close {
                    current_text.push_str("**");
                }
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

/// Project the transcript into pre-wrapped lines.
///
/// Every message gets a header (icon, role label, render time) followed by
/// its text and a blank separator line.
pub fn transcript_lines(messages: &[Message], time_label: &str, width: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in messages {
        let alignment = role_alignment(msg.role);
        let color = role_color(msg.role);

        lines.push(
            Line::from(vec![
                Span::styled(role_icon(msg.role), Style::default().fg(color)),
                Span::raw(" "),
                Span::styled(
                    msg.role.label(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(time_label.to_string(), Style::default().fg(Color::DarkGray)),
            ])
            .alignment(alignment),
        );

        let raw_lines: Vec<&str> = if msg.content.is_empty() {
            vec![""]
        } else {
            msg.content.lines().collect()
        };
        for raw in raw_lines {
            for wrapped in wrap_text_to_width(raw, width) {
                let line = match msg.role {
                    Role::User => Line::from(wrapped),
                    Role::Assistant => parse_markdown_line(&wrapped),
                };
                lines.push(line.alignment(alignment));
            }
        }

        lines.push(Line::default());
    }

    lines
}

/// Redraw the whole widget from the transcript.
pub fn draw(frame: &mut Frame, chrome: &Chrome, messages: &[Message], time_label: &str) {
    let area = frame.area();

    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(chrome, frame, header_area);
    render_transcript(messages, time_label, frame, chat_area);
    render_input(chrome, frame, input_area);
    render_footer(chrome, frame, footer_area);

    if let Some(notice) = chrome.notice {
        render_notice(notice, frame, area);
    }
}

fn render_header(chrome: &Chrome, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Agent Chat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(chrome.title.to_string(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_transcript(messages: &[Message], time_label: &str, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;
    let lines = transcript_lines(messages, time_label, inner_width);

    // Keep the newest message in view
    let scroll = lines.len().saturating_sub(inner_height);
    let scroll = u16::try_from(scroll).unwrap_or(u16::MAX);

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(chrome: &Chrome, frame: &mut Frame, area: Rect) {
    let (border_color, title) = if chrome.submit_enabled {
        (Color::Yellow, " Message (Enter to send) ")
    } else {
        (Color::DarkGray, " Waiting for reply... ")
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = chrome.input.cursor();

    // Scroll horizontally to keep the cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = chrome.input
        .value()
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    if chrome.notice.is_none() {
        let cursor_x = u16::try_from(cursor_pos - scroll_offset).unwrap_or(0);
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(chrome: &Chrome, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = if chrome.notice.is_some() {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" dismiss ", label_style),
        ]
    } else {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Ctrl-C ", key_style),
            Span::styled(" quit ", label_style),
        ]
    };

    let status = if chrome.submit_enabled {
        Span::styled(" READY ", Style::default().bg(Color::Blue).fg(Color::White))
    } else {
        Span::styled(" WAITING ", Style::default().bg(Color::Yellow).fg(Color::Black))
    };

    let footer_content = Line::from(
        vec![status, Span::styled(" ", label_style)]
            .into_iter()
            .chain(hints)
            .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_notice(notice: &str, frame: &mut Frame, area: Rect) {
    // Calculate popup size and position (centered)
    let popup_width = 60.min(area.width.saturating_sub(4));
    let text_width = popup_width.saturating_sub(2) as usize;
    let text_lines = wrap_text_to_width(notice, text_width).len() as u16;
    let popup_height = (text_lines + 4).min(area.height);

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Error ");

    let mut lines = vec![Line::from(notice.to_string())];
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Press Enter to dismiss",
        Style::default().fg(Color::DarkGray),
    )));

    let popup = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(popup, popup_area);
}
