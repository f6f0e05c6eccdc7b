//! Script editor pane rendering with syntax highlighting
//!
//! Lines are highlighted with the language tokenizer. Identifiers are looked
//! up in the active opcode table so unknown words and disabled opcodes stand
//! out. The line that failed the last evaluation is drawn in the error style.

use super::border_style;
use crate::editor::TextBuffer;
use crate::language::tokenizer::{tokenize_line, LexState, TokenKind};
use crate::ui::theme::DEFAULT_THEME;
use crate::vm::opcodes::OpcodeTable;
use ratatui::{
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Width of the line number gutter
pub const GUTTER_WIDTH: u16 = 5;

fn token_style(kind: TokenKind, text: &str, opcodes: &OpcodeTable) -> Style {
    match kind {
        TokenKind::Identifier => match opcodes.byte(text) {
            Some(byte) if opcodes.is_disabled(byte) => Style::default()
                .fg(DEFAULT_THEME.disabled_opcode)
                .add_modifier(Modifier::CROSSED_OUT),
            Some(_) => Style::default()
                .fg(DEFAULT_THEME.opcode)
                .add_modifier(Modifier::BOLD),
            None => Style::default().fg(DEFAULT_THEME.fg),
        },
        TokenKind::HexLiteral => Style::default().fg(DEFAULT_THEME.hex),
        TokenKind::BigIntLiteral => Style::default().fg(DEFAULT_THEME.number),
        TokenKind::PushDelimiter | TokenKind::EvaluationDelimiter => {
            Style::default().fg(DEFAULT_THEME.delimiter)
        }
        TokenKind::String => Style::default().fg(DEFAULT_THEME.string),
        TokenKind::Comment => Style::default()
            .fg(DEFAULT_THEME.comment)
            .add_modifier(Modifier::ITALIC),
        TokenKind::Whitespace => Style::default(),
        TokenKind::Invalid => Style::default()
            .fg(DEFAULT_THEME.error)
            .add_modifier(Modifier::UNDERLINED),
    }
}

fn highlight_line<'a>(line: &'a str, state: LexState, opcodes: &OpcodeTable) -> (Line<'a>, LexState) {
    let (tokens, next) = tokenize_line(line, state);
    let spans: Vec<Span> = tokens
        .iter()
        .map(|token| {
            let text = token.text(line);
            Span::styled(text, token_style(token.kind, text, opcodes))
        })
        .collect();
    (Line::from(spans), next)
}

/// Render an editor pane
///
/// `failed_line` is 1-based within this pane. The terminal cursor is placed
/// only when `show_cursor` is set.
#[allow(clippy::too_many_arguments)]
pub fn render_editor_pane(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    buffer: &TextBuffer,
    opcodes: &OpcodeTable,
    failed_line: Option<usize>,
    is_focused: bool,
    show_cursor: bool,
) {
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders
    let scroll = buffer.scroll();
    let (cursor_row, _) = buffer.cursor();

    // Lexer state has to run through the lines scrolled out of view
    let mut state = LexState::Root;
    for line in buffer.lines().iter().take(scroll) {
        state = tokenize_line(line, state).1;
    }

    let mut visible_lines: Vec<Line> = Vec::with_capacity(visible_height);
    for (idx, line) in buffer
        .lines()
        .iter()
        .enumerate()
        .skip(scroll)
        .take(visible_height)
    {
        let line_num = idx + 1;
        let is_failed = failed_line == Some(line_num);
        let is_current = is_focused && idx == cursor_row;

        let (highlighted, next) = highlight_line(line, state, opcodes);
        state = next;

        let num_style = if is_failed {
            Style::default()
                .fg(DEFAULT_THEME.error)
                .add_modifier(Modifier::BOLD)
        } else if is_current {
            Style::default()
                .fg(DEFAULT_THEME.secondary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(DEFAULT_THEME.comment)
        };

        let mut spans = vec![Span::styled(format!("{:4} ", line_num), num_style)];
        if is_failed {
            // Failed line: white on red, overriding token colors
            let error_style = Style::default()
                .bg(DEFAULT_THEME.error)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD);
            spans.extend(
                highlighted
                    .spans
                    .into_iter()
                    .map(|span| span.style(error_style)),
            );
        } else if is_current {
            let bg = Style::default().bg(DEFAULT_THEME.current_line_bg);
            spans.extend(highlighted.spans.into_iter().map(|span| {
                let style = span.style.patch(bg);
                span.style(style)
            }));
        } else {
            spans.extend(highlighted.spans);
        }
        visible_lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);

    if show_cursor {
        if let Some(position) = cursor_position(area, buffer) {
            frame.set_cursor_position(position);
        }
    }
}

/// Screen position of the buffer cursor inside an editor pane, if visible
pub fn cursor_position(area: Rect, buffer: &TextBuffer) -> Option<Position> {
    let (row, _) = buffer.cursor();
    let visible_row = row.checked_sub(buffer.scroll())?;
    let inner_height = area.height.saturating_sub(2) as usize;
    if visible_row >= inner_height {
        return None;
    }

    let column = u16::try_from(buffer.cursor_char_column()).ok()?;
    let x = area.x + 1 + GUTTER_WIDTH + column;
    let y = area.y + 1 + u16::try_from(visible_row).ok()?;
    if x >= area.right().saturating_sub(1) {
        return None;
    }
    Some(Position::new(x, y))
}

/// Buffer (row, character column) under a screen position inside an editor pane
pub fn buffer_position(area: Rect, buffer: &TextBuffer, column: u16, row: u16) -> Option<(usize, usize)> {
    let inner_top = area.y + 1;
    let text_left = area.x + 1 + GUTTER_WIDTH;
    if row < inner_top || row >= area.bottom().saturating_sub(1) {
        return None;
    }
    let line = buffer.scroll() + usize::from(row - inner_top);
    let char_column = usize::from(column.saturating_sub(text_left));
    Some((line, char_column))
}
