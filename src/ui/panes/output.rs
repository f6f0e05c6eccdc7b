//! Stack output pane rendering
//!
//! One row per editor line, scrolled together with the editor beside it, so
//! row `n` always shows the stack after line `n`. Elements are drawn bottom
//! to top from left to right, alternating colors. The row of the editor
//! cursor gets a footer with the raw hex of each element.

use super::border_style;
use crate::editor::LineSnapshot;
use crate::ui::theme::DEFAULT_THEME;
use crate::vm::StackData;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{block::Title, Block, Borders, Paragraph},
    Frame,
};

/// Everything the output pane shows
pub struct OutputRenderData<'a> {
    pub title: &'a str,
    pub snapshots: &'a [LineSnapshot],
    /// Number of lines in the matching editor
    pub line_count: usize,
    /// Failing line, 1-based within this pane, with its message
    pub failure: Option<(usize, &'a str)>,
    /// Stack carried in from the other pane, shown in the title
    pub carried_stack: Option<&'a [StackData]>,
    /// Editor cursor row whose hex is shown in the footer
    pub cursor_row: Option<usize>,
    /// Scroll offset of the matching editor
    pub scroll: usize,
}

fn element_spans(elements: &[StackData]) -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(elements.len() * 2);
    for (i, element) in elements.iter().enumerate() {
        let color = if i % 2 == 0 {
            DEFAULT_THEME.stack_item
        } else {
            DEFAULT_THEME.stack_item_alt
        };
        if i > 0 {
            spans.push(Span::styled(" ", Style::default()));
        }
        spans.push(Span::styled(element.display_value(), Style::default().fg(color)));
    }
    spans
}

/// Raw hex of every element, the footer of the cursor row
fn hex_footer(elements: &[StackData]) -> String {
    let hex: Vec<String> = elements
        .iter()
        .map(|e| if e.is_empty() { "(empty)".to_string() } else { e.hex() })
        .collect();
    format!(" hex: {} ", hex.join(" "))
}

/// Render a stack output pane
pub fn render_output_pane(frame: &mut Frame, area: Rect, data: &OutputRenderData) {
    let mut block = Block::default()
        .title(format!(" {} ", data.title))
        .borders(Borders::ALL)
        .border_style(border_style(false));

    if let Some(stack) = data.carried_stack {
        let mut spans = vec![Span::styled(" [", Style::default().fg(DEFAULT_THEME.comment))];
        spans.extend(element_spans(stack));
        spans.push(Span::styled("] ", Style::default().fg(DEFAULT_THEME.comment)));
        block = block.title(Title::from(Line::from(spans)).alignment(Alignment::Right));
    }

    let cursor_snapshot = data
        .cursor_row
        .and_then(|row| data.snapshots.get(row))
        .filter(|snapshot| !snapshot.is_blank());
    if let Some(snapshot) = cursor_snapshot {
        block = block.title_bottom(
            Line::from(Span::styled(
                hex_footer(snapshot.elements()),
                Style::default().fg(DEFAULT_THEME.comment),
            ))
            .right_aligned(),
        );
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders

    let rows: Vec<Line> = (0..data.line_count.max(data.snapshots.len()))
        .skip(data.scroll)
        .take(visible_height)
        .map(|idx| {
            let line_num = idx + 1;
            if let Some((failed, message)) = data.failure {
                if failed == line_num {
                    return Line::from(Span::styled(
                        format!(" {} ", message),
                        Style::default()
                            .bg(DEFAULT_THEME.error)
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ));
                }
            }
            match data.snapshots.get(idx) {
                Some(LineSnapshot::Stack(elements)) if elements.is_empty() => Line::from(
                    Span::styled("(empty stack)", Style::default().fg(DEFAULT_THEME.comment)),
                ),
                Some(snapshot) => {
                    let mut line = Line::from(element_spans(snapshot.elements()));
                    if data.cursor_row == Some(idx) {
                        line = line.style(Style::default().bg(DEFAULT_THEME.current_line_bg));
                    }
                    line
                }
                None => Line::default(),
            }
        })
        .collect();

    let paragraph = Paragraph::new(rows).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_footer() {
        let elements = vec![
            StackData::from_number(5),
            StackData::from_text("hi"),
            StackData::from_number(0),
        ];
        assert_eq!(hex_footer(&elements), " hex: 05 6869 (empty) ");
    }
}
