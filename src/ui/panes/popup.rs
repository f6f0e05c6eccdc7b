//! Modals and cursor popups drawn over the panes
//!
//! - compile modal: bytecode hex and its disassembly
//! - transaction template modal: a JSON editor
//! - completion list and hover box anchored at the editor cursor

use crate::editor::{Evaluation, TextBuffer};
use crate::language::{CompletionItem, Hover};
use crate::ui::theme::DEFAULT_THEME;
use crate::vm::compile::disassemble;
use crate::vm::opcodes::OpcodeTable;
use ratatui::{
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Visible rows of the completion list
pub const COMPLETION_ROWS: usize = 8;

/// A rectangle of `percent_x` by `percent_y` centered in `area`
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// A `width` x `height` box just below `anchor`, kept inside `bounds`
fn anchored_rect(anchor: Position, width: u16, height: u16, bounds: Rect) -> Rect {
    let width = width.min(bounds.width);
    let height = height.min(bounds.height);
    let x = anchor.x.min(bounds.right().saturating_sub(width)).max(bounds.x);
    let below = anchor.y.saturating_add(1);
    let y = if below + height <= bounds.bottom() {
        below
    } else {
        anchor.y.saturating_sub(height).max(bounds.y)
    };
    Rect::new(x, y, width, height)
}

fn modal_block(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(
            Style::default()
                .fg(DEFAULT_THEME.border_focused)
                .add_modifier(Modifier::BOLD),
        )
        .style(Style::default().bg(DEFAULT_THEME.popup_bg))
}

fn key_hint(key: &str, desc: &str) -> Vec<Span<'static>> {
    vec![
        Span::styled(
            format!(" {} ", key),
            Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black),
        ),
        Span::styled(format!(" {}  ", desc), Style::default().fg(DEFAULT_THEME.fg)),
    ]
}

/// Render the compiled bytecode modal
pub fn render_compile_modal(
    frame: &mut Frame,
    area: Rect,
    evaluation: &Evaluation,
    opcodes: &OpcodeTable,
) {
    let rect = centered_rect(80, 70, area);
    frame.render_widget(Clear, rect);

    let label = Style::default()
        .fg(DEFAULT_THEME.secondary)
        .add_modifier(Modifier::BOLD);
    let value = Style::default().fg(DEFAULT_THEME.hex);
    let or_empty = |s: &str| if s.is_empty() { "(empty)".to_string() } else { s.to_string() };

    let mut lines = vec![
        Line::from(Span::styled("Bytecode", label)),
        Line::from(Span::styled(or_empty(&evaluation.bytecode()), value)),
        Line::default(),
        Line::from(Span::styled("Unlocking (stack elements)", label)),
        Line::from(Span::styled(or_empty(&evaluation.unlocking_bytecode), value)),
        Line::default(),
        Line::from(Span::styled("Witness script", label)),
        Line::from(Span::styled(or_empty(&evaluation.witness_bytecode), value)),
        Line::default(),
        Line::from(Span::styled("Disassembly", label)),
    ];

    let bytes = hex::decode(evaluation.witness_bytecode.as_bytes()).unwrap_or_default();
    let asm = disassemble(&bytes, opcodes).join(" ");
    lines.push(Line::from(Span::styled(
        if asm.is_empty() { "(empty)".to_string() } else { asm },
        Style::default().fg(DEFAULT_THEME.fg),
    )));

    if let Some(message) = evaluation.error_message() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("Evaluation failed: {}", message),
            Style::default().fg(DEFAULT_THEME.error),
        )));
    }

    lines.push(Line::default());
    lines.push(Line::from(key_hint("Esc", "close")));

    let paragraph = Paragraph::new(lines)
        .block(modal_block("Compile"))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, rect);
}

/// Render the transaction template editor modal
pub fn render_template_modal(
    frame: &mut Frame,
    area: Rect,
    editor: &TextBuffer,
    error: Option<&str>,
) {
    let rect = centered_rect(70, 80, area);
    frame.render_widget(Clear, rect);

    // borders (2) + blank + error + hints
    let text_height = rect.height.saturating_sub(5) as usize;
    let mut lines: Vec<Line> = editor
        .lines()
        .iter()
        .skip(editor.scroll())
        .take(text_height)
        .map(|line| Line::from(Span::styled(line.as_str(), Style::default().fg(DEFAULT_THEME.fg))))
        .collect();
    lines.resize(text_height, Line::default());

    lines.push(Line::default());
    lines.push(match error {
        Some(message) => Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(DEFAULT_THEME.error),
        )),
        None => Line::default(),
    });
    let mut hints = key_hint("^S", "apply");
    hints.extend(key_hint("^D", "clear template"));
    hints.extend(key_hint("Esc", "cancel"));
    lines.push(Line::from(hints));

    frame.render_widget(Paragraph::new(lines).block(modal_block("Transaction Template")), rect);

    let (row, _) = editor.cursor();
    if let Some(visible_row) = row.checked_sub(editor.scroll()).filter(|r| *r < text_height) {
        let x = rect.x + 1 + editor.cursor_char_column() as u16;
        let y = rect.y + 1 + visible_row as u16;
        if x < rect.right().saturating_sub(1) {
            frame.set_cursor_position(Position::new(x, y));
        }
    }
}

/// Render the completion list below the cursor
pub fn render_completion_popup(
    frame: &mut Frame,
    anchor: Position,
    bounds: Rect,
    items: &[&CompletionItem],
    selected: usize,
) {
    if items.is_empty() {
        return;
    }

    let first = selected.saturating_sub(COMPLETION_ROWS - 1);
    let visible: Vec<&&CompletionItem> = items.iter().skip(first).take(COMPLETION_ROWS).collect();
    let label_width = visible.iter().map(|i| i.label.len()).max().unwrap_or(0);

    let mut lines: Vec<Line> = visible
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let marker = if item.is_snippet { "⎘" } else { " " };
            let style = if first + i == selected {
                Style::default()
                    .bg(DEFAULT_THEME.primary)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.fg)
            };
            Line::from(Span::styled(
                format!("{} {:width$} ", marker, item.label, width = label_width),
                style,
            ))
        })
        .collect();

    let doc = items
        .get(selected)
        .and_then(|item| item.documentation.as_deref())
        .unwrap_or("");
    if !doc.is_empty() {
        lines.push(Line::from(Span::styled(
            doc.to_string(),
            Style::default()
                .fg(DEFAULT_THEME.comment)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let width = lines.iter().map(|l| l.width()).max().unwrap_or(0) as u16 + 2;
    let height = lines.len() as u16 + 2;
    let rect = anchored_rect(anchor, width, height, bounds);

    frame.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DEFAULT_THEME.border_normal))
        .style(Style::default().bg(DEFAULT_THEME.popup_bg));
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

/// Render a hover box below the cursor
///
/// `**bold**` blocks are drawn bold without the markers.
pub fn render_hover_popup(frame: &mut Frame, anchor: Position, bounds: Rect, hover: &Hover) {
    let lines: Vec<Line> = hover
        .contents
        .iter()
        .map(|block| {
            let spans: Vec<Span> = block
                .split("**")
                .enumerate()
                .filter(|(_, part)| !part.is_empty())
                .map(|(i, part)| {
                    let style = if i % 2 == 1 {
                        Style::default()
                            .fg(DEFAULT_THEME.opcode)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(DEFAULT_THEME.fg)
                    };
                    Span::styled(part.replace('`', ""), style)
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let width = lines.iter().map(|l| l.width()).max().unwrap_or(0) as u16 + 2;
    let height = lines.len() as u16 + 2;
    let rect = anchored_rect(anchor, width, height, bounds);

    frame.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DEFAULT_THEME.secondary))
        .style(Style::default().bg(DEFAULT_THEME.popup_bg));
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 50);
        assert_eq!(centered_rect(80, 70, area), Rect::new(10, 7, 80, 35));
    }

    #[test]
    fn test_anchored_rect_flips_above_near_bottom() {
        let bounds = Rect::new(0, 0, 80, 24);
        assert_eq!(
            anchored_rect(Position::new(10, 5), 20, 6, bounds),
            Rect::new(10, 6, 20, 6)
        );
        assert_eq!(
            anchored_rect(Position::new(70, 20), 20, 6, bounds),
            Rect::new(60, 14, 20, 6)
        );
    }
}
