//! Four-quadrant pane layout
//!
//! Editors sit on the left, their outputs on the right; stack elements on top,
//! witness script below. A [`PaneOffset`] moves the column split (x) and the
//! row split (y) away from the centre, in percentage points.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Largest distance of a split from the centre, in percentage points
pub const MAX_OFFSET: i16 = 40;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaneOffset {
    x: i16,
    y: i16,
}

impl PaneOffset {
    pub fn new(x: i16, y: i16) -> Self {
        PaneOffset {
            x: x.clamp(-MAX_OFFSET, MAX_OFFSET),
            y: y.clamp(-MAX_OFFSET, MAX_OFFSET),
        }
    }

    pub fn x(&self) -> i16 {
        self.x
    }

    pub fn y(&self) -> i16 {
        self.y
    }

    /// Accumulate a movement delta
    pub fn shift(&mut self, dx: i16, dy: i16) {
        *self = PaneOffset::new(self.x.saturating_add(dx), self.y.saturating_add(dy));
    }

    /// Put the column split under terminal column `column` of `area`
    pub fn drag_column(&mut self, column: u16, area: Rect) {
        if let Some(percent) = percent_within(column, area.x, area.width) {
            *self = PaneOffset::new(percent - 50, self.y);
        }
    }

    /// Put the row split under terminal row `row` of `area`
    pub fn drag_row(&mut self, row: u16, area: Rect) {
        if let Some(percent) = percent_within(row, area.y, area.height) {
            *self = PaneOffset::new(self.x, percent - 50);
        }
    }

    pub fn column_constraints(&self) -> [Constraint; 2] {
        split_constraints(self.x)
    }

    pub fn row_constraints(&self) -> [Constraint; 2] {
        split_constraints(self.y)
    }
}

fn percent_within(pos: u16, start: u16, len: u16) -> Option<i16> {
    if len == 0 {
        return None;
    }
    let rel = i32::from(pos.saturating_sub(start).min(len));
    i16::try_from(rel * 100 / i32::from(len)).ok()
}

fn split_constraints(offset: i16) -> [Constraint; 2] {
    // offset is clamped to +/-40, so both sides stay within 10..=90
    let first = (50 + offset).unsigned_abs();
    [
        Constraint::Percentage(first),
        Constraint::Percentage(100 - first),
    ]
}

/// Which split a drag is moving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Divider {
    /// Between editors and outputs
    Column,
    /// Between the stack and witness rows
    Row,
}

/// Areas of the four panes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quadrants {
    pub stack_editor: Rect,
    pub stack_output: Rect,
    pub witness_editor: Rect,
    pub witness_output: Rect,
}

impl Quadrants {
    pub fn split(area: Rect, offset: PaneOffset) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(offset.row_constraints())
            .split(area);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(offset.column_constraints())
            .split(rows[0]);
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(offset.column_constraints())
            .split(rows[1]);

        Quadrants {
            stack_editor: top[0],
            stack_output: top[1],
            witness_editor: bottom[0],
            witness_output: bottom[1],
        }
    }

    /// Divider under a mouse position; borders on either side of a split count
    pub fn divider_at(&self, column: u16, row: u16) -> Option<Divider> {
        let split_x = self.stack_output.x;
        let split_y = self.witness_editor.y;
        if column + 1 >= split_x && column <= split_x {
            return Some(Divider::Column);
        }
        if row + 1 >= split_y && row <= split_y {
            return Some(Divider::Row);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_clamps() {
        let mut offset = PaneOffset::default();
        offset.shift(25, -10);
        assert_eq!((offset.x(), offset.y()), (25, -10));
        offset.shift(100, -100);
        assert_eq!((offset.x(), offset.y()), (MAX_OFFSET, -MAX_OFFSET));
    }

    #[test]
    fn test_constraints_follow_offset() {
        let offset = PaneOffset::new(10, -20);
        assert_eq!(
            offset.column_constraints(),
            [Constraint::Percentage(60), Constraint::Percentage(40)]
        );
        assert_eq!(
            offset.row_constraints(),
            [Constraint::Percentage(30), Constraint::Percentage(70)]
        );
    }

    #[test]
    fn test_drag_to_position() {
        let area = Rect::new(0, 0, 100, 40);
        let mut offset = PaneOffset::default();
        offset.drag_column(70, area);
        offset.drag_row(10, area);
        assert_eq!((offset.x(), offset.y()), (20, -25));

        offset.drag_column(99, area);
        assert_eq!(offset.x(), MAX_OFFSET);
    }

    #[test]
    fn test_quadrants_and_dividers() {
        let area = Rect::new(0, 0, 100, 40);
        let quads = Quadrants::split(area, PaneOffset::default());

        assert_eq!(quads.stack_editor, Rect::new(0, 0, 50, 20));
        assert_eq!(quads.witness_output, Rect::new(50, 20, 50, 20));
        assert_eq!(quads.divider_at(50, 5), Some(Divider::Column));
        assert_eq!(quads.divider_at(10, 19), Some(Divider::Row));
        assert_eq!(quads.divider_at(10, 5), None);
    }
}
