//! Status bar rendering with keybindings and evaluation state

use crate::editor::FailedLine;
use crate::ui::theme::DEFAULT_THEME;
use crate::vm::VmConfig;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub struct StatusRenderData<'a> {
    pub message: &'a str,
    pub config: VmConfig,
    pub failure: Option<&'a FailedLine>,
    /// An edit is waiting for the debounce delay
    pub is_pending: bool,
    pub has_template: bool,
}

/// Render the status bar at the bottom
pub fn render_status_bar(frame: &mut Frame, area: Rect, data: &StatusRenderData) {
    // Split status bar into left and right
    let layout = ratatui::layout::Layout::default()
        .direction(ratatui::layout::Direction::Horizontal)
        .constraints([
            ratatui::layout::Constraint::Percentage(50),
            ratatui::layout::Constraint::Percentage(50),
        ])
        .split(area);

    // Left side: network and evaluation state
    let state_bg = if data.failure.is_some() {
        DEFAULT_THEME.error
    } else if data.is_pending {
        DEFAULT_THEME.secondary
    } else {
        DEFAULT_THEME.primary
    };

    let mut left_spans = vec![
        Span::styled(
            format!(" {} ", data.config),
            Style::default()
                .bg(state_bg)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            " | ",
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(DEFAULT_THEME.comment),
        ),
    ];

    let message = match data.failure {
        Some(failure) => format!(" Line {}: {} ", failure.line, failure.message),
        None => format!(" {} ", data.message),
    };
    left_spans.push(Span::styled(
        message,
        Style::default()
            .bg(DEFAULT_THEME.current_line_bg)
            .fg(if data.failure.is_some() {
                DEFAULT_THEME.error
            } else {
                DEFAULT_THEME.fg
            }),
    ));

    let left_paragraph = Paragraph::new(Line::from(left_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Left);

    frame.render_widget(left_paragraph, layout[0]);

    // Right side: Keybinds with visual grouping
    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.fg);
    let sep_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.comment);

    let bindings = [
        ("Tab", "pane"),
        ("^B", "compile"),
        ("^T", "template"),
        ("^←↑↓→", "resize"),
        ("^␣", "complete"),
        ("F1", "hover"),
        ("^Q", "quit"),
    ];

    let mut right_spans = Vec::with_capacity(bindings.len() * 4 + 2);
    for (i, (key, desc)) in bindings.iter().enumerate() {
        if i > 0 {
            right_spans.push(Span::styled("│", sep_style));
            right_spans.push(Span::styled(" ", desc_style));
        }
        right_spans.push(Span::styled(format!(" {} ", key), key_style));
        right_spans.push(Span::styled(format!(" {} ", desc), desc_style));
    }

    if data.has_template {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(Span::styled(
            " TX ",
            Style::default()
                .bg(DEFAULT_THEME.success)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let right_paragraph = Paragraph::new(Line::from(right_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Right);

    frame.render_widget(right_paragraph, layout[1]);
}
