//! Editable text of one pane
//!
//! A line-based buffer with a single cursor. Typing applies the language's
//! auto-closing pairs and Enter applies its on-enter rules, the way a code
//! editing widget would.

use crate::language::completions::Expansion;
use crate::language::grammar::{closing_pair_for, on_enter_action, IndentAction};
use crate::language::tokenizer::{tokenize_line, LexState};

/// Single-character pairs removed together by backspace
const CHAR_PAIRS: &[(char, char)] = &[('<', '>'), ('(', ')'), ('"', '"'), ('\'', '\'')];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<String>,
    row: usize,
    /// Byte offset into the cursor line, always on a char boundary
    col: usize,
    scroll: usize,
}

impl TextBuffer {
    pub fn new(text: &str) -> Self {
        TextBuffer {
            lines: split_lines(text),
            row: 0,
            col: 0,
            scroll: 0,
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Cursor as (row, byte offset)
    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    /// Cursor column counted in characters, for placing the terminal cursor
    pub fn cursor_char_column(&self) -> usize {
        self.current()[..self.col].chars().count()
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Keep the cursor row inside a viewport of `height` rows
    pub fn scroll_to_cursor(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.row < self.scroll {
            self.scroll = self.row;
        } else if self.row >= self.scroll + height {
            self.scroll = self.row + 1 - height;
        }
    }

    /// Move the cursor to a row and character column, clamped to the text
    pub fn goto(&mut self, row: usize, char_column: usize) {
        self.row = row.min(self.lines.len() - 1);
        self.col = byte_offset(self.current(), char_column);
    }

    fn current(&self) -> &str {
        &self.lines[self.row]
    }

    /// Tokenizer state at the start of `row`
    fn state_at(&self, row: usize) -> LexState {
        self.lines[..row]
            .iter()
            .fold(LexState::Root, |state, line| tokenize_line(line, state).1)
    }

    fn indent_of(&self, row: usize) -> String {
        self.lines[row]
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect()
    }

    /// Type one character
    pub fn insert_char(&mut self, c: char) {
        if c == '\n' {
            self.newline();
            return;
        }
        // typing a closing character over the one already there
        if matches!(c, '>' | ')' | '"' | '\'') && self.current()[self.col..].starts_with(c) {
            self.col += c.len_utf8();
            return;
        }

        self.lines[self.row].insert(self.col, c);
        self.col += c.len_utf8();
        self.auto_close();
    }

    fn auto_close(&mut self) {
        let state = self.state_at(self.row);
        let before = &self.lines[self.row][..self.col];
        let Some(pair) = closing_pair_for(before, state) else {
            return;
        };

        if pair.closes_on_new_line() {
            let close = format!("{}{}", self.indent_of(self.row), pair.close.trim_start());
            self.lines.insert(self.row + 1, close);
        } else {
            self.lines[self.row].insert_str(self.col, pair.close);
        }
    }

    /// Insert text verbatim, leaving the cursor after it
    pub fn insert_str(&mut self, text: &str) {
        let tail = self.lines[self.row].split_off(self.col);
        let mut parts = text.split('\n');
        if let Some(first) = parts.next() {
            self.lines[self.row].push_str(first);
        }
        for part in parts {
            self.row += 1;
            self.lines.insert(self.row, part.to_string());
        }
        self.col = self.lines[self.row].len();
        self.lines[self.row].push_str(&tail);
    }

    /// Split the line at the cursor, applying on-enter rules
    pub fn newline(&mut self) {
        let indent = self.indent_of(self.row);
        let after = self.lines[self.row].split_off(self.col);
        let before = self.lines[self.row].clone();

        match on_enter_action(&before, &after) {
            Some(action) if action.indent == IndentAction::IndentOutdent => {
                let middle = format!("{}{}", indent, action.append_text);
                self.lines.insert(self.row + 1, middle);
                self.lines.insert(self.row + 2, format!("{}{}", indent, after));
                self.row += 1;
                self.col = self.lines[self.row].len();
            }
            Some(action) => {
                let keep = indent.len().saturating_sub(action.remove_text);
                let line = format!("{}{}", &indent[..keep], action.append_text);
                self.col = line.len();
                self.row += 1;
                self.lines.insert(self.row, format!("{}{}", line, after));
            }
            None => {
                self.col = indent.len();
                self.row += 1;
                self.lines.insert(self.row, format!("{}{}", indent, after));
            }
        }
    }

    pub fn backspace(&mut self) {
        if self.col > 0 {
            let line = &self.lines[self.row];
            let prev = line[..self.col].chars().next_back();
            let next = line[self.col..].chars().next();
            let Some(prev) = prev else { return };

            let start = self.col - prev.len_utf8();
            let end = match next {
                Some(next) if CHAR_PAIRS.contains(&(prev, next)) => self.col + next.len_utf8(),
                _ => self.col,
            };
            self.lines[self.row].replace_range(start..end, "");
            self.col = start;
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.lines[self.row].len();
            self.lines[self.row].push_str(&line);
        }
    }

    pub fn delete(&mut self) {
        if let Some(next) = self.current()[self.col..].chars().next() {
            let end = self.col + next.len_utf8();
            self.lines[self.row].replace_range(self.col..end, "");
        } else if self.row + 1 < self.lines.len() {
            let line = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&line);
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.current()[..self.col].chars().next_back() {
            self.col -= prev.len_utf8();
        } else if self.row > 0 {
            self.row -= 1;
            self.col = self.current().len();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.current()[self.col..].chars().next() {
            self.col += next.len_utf8();
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.row > 0 {
            let column = self.cursor_char_column();
            self.goto(self.row - 1, column);
        }
    }

    pub fn move_down(&mut self) {
        if self.row + 1 < self.lines.len() {
            let column = self.cursor_char_column();
            self.goto(self.row + 1, column);
        }
    }

    pub fn move_home(&mut self) {
        self.col = 0;
    }

    pub fn move_end(&mut self) {
        self.col = self.current().len();
    }

    /// Completion prefix: the word before the cursor, with a leading `<`
    pub fn completion_prefix(&self) -> &str {
        let before = &self.current()[..self.col];
        let word_len: usize = before
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .map(char::len_utf8)
            .sum();
        let mut start = self.col - word_len;
        if before[..start].ends_with('<') {
            start -= 1;
        }
        &before[start..]
    }

    /// Replace the completion prefix with an expanded suggestion
    ///
    /// Continuation lines get the cursor line's indentation and the cursor
    /// lands on the expansion's first stop.
    pub fn apply_completion(&mut self, expansion: &Expansion) {
        let prefix_len = self.completion_prefix().len();
        let start = self.col - prefix_len;
        self.lines[self.row].replace_range(start..self.col, "");
        self.col = start;

        let newline = format!("\n{}", self.indent_of(self.row));
        let (head, tail) = expansion.text.split_at(expansion.cursor);
        self.insert_str(&head.replace('\n', &newline));
        let stop = (self.row, self.col);
        self.insert_str(&tail.replace('\n', &newline));
        (self.row, self.col) = stop;
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        TextBuffer::new("")
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
        .collect()
}

fn byte_offset(line: &str, char_column: usize) -> usize {
    line.char_indices()
        .nth(char_column)
        .map_or(line.len(), |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::completions::expand_snippet;

    fn typed(text: &str) -> TextBuffer {
        let mut buffer = TextBuffer::default();
        for c in text.chars() {
            buffer.insert_char(c);
        }
        buffer
    }

    #[test]
    fn test_push_brackets_auto_close() {
        let buffer = typed("<0x01");
        assert_eq!(buffer.text(), "<0x01>");
        assert_eq!(buffer.cursor(), (0, 5));

        // typing the closer steps over it
        let buffer = typed("<0x01>");
        assert_eq!(buffer.text(), "<0x01>");
        assert_eq!(buffer.cursor(), (0, 6));
    }

    #[test]
    fn test_quotes_auto_close() {
        let buffer = typed("<'ab");
        assert_eq!(buffer.text(), "<'ab'>");

        let buffer = typed("<'ab'>");
        assert_eq!(buffer.text(), "<'ab'>");
        assert_eq!(buffer.cursor(), (0, 6));
    }

    #[test]
    fn test_conditional_closes_on_next_line() {
        let buffer = typed("  OP_IF");
        assert_eq!(buffer.lines(), &["  OP_IF", "  OP_ENDIF"]);
        assert_eq!(buffer.cursor(), (0, 7));

        let buffer = typed("// OP_IF");
        assert_eq!(buffer.lines(), &["// OP_IF"]);
    }

    #[test]
    fn test_newline_keeps_indent() {
        let mut buffer = TextBuffer::new("  <1>");
        buffer.move_end();
        buffer.newline();
        assert_eq!(buffer.lines(), &["  <1>", "  "]);
        assert_eq!(buffer.cursor(), (1, 2));
    }

    #[test]
    fn test_doc_comment_continuation() {
        let mut buffer = typed("/**");
        assert_eq!(buffer.text(), "/** */");
        buffer.newline();
        assert_eq!(buffer.lines(), &["/**", " * ", " */"]);
        assert_eq!(buffer.cursor(), (1, 3));
    }

    #[test]
    fn test_backspace_removes_pair_and_joins() {
        let mut buffer = typed("<");
        assert_eq!(buffer.text(), "<>");
        buffer.backspace();
        assert_eq!(buffer.text(), "");

        let mut buffer = TextBuffer::new("<1>\n<2>");
        buffer.goto(1, 0);
        buffer.backspace();
        assert_eq!(buffer.text(), "<1><2>");
        assert_eq!(buffer.cursor(), (0, 3));
    }

    #[test]
    fn test_vertical_motion_clamps() {
        let mut buffer = TextBuffer::new("OP_CHECKSIG\n<1>");
        buffer.goto(0, 8);
        buffer.move_down();
        assert_eq!(buffer.cursor(), (1, 3));
        buffer.move_up();
        assert_eq!(buffer.cursor(), (0, 3));
    }

    #[test]
    fn test_completion_replaces_prefix() {
        let mut buffer = TextBuffer::new("  OP_AD");
        buffer.move_end();
        assert_eq!(buffer.completion_prefix(), "OP_AD");

        buffer.apply_completion(&expand_snippet("OP_ADD"));
        assert_eq!(buffer.text(), "  OP_ADD");
        assert_eq!(buffer.cursor(), (0, 8));
    }

    #[test]
    fn test_multiline_snippet_indents() {
        let mut buffer = TextBuffer::new("  OP_I");
        buffer.move_end();
        buffer.apply_completion(&expand_snippet("OP_IF\n  ${1}\nOP_ENDIF"));

        assert_eq!(buffer.lines(), &["  OP_IF", "    ", "  OP_ENDIF"]);
        assert_eq!(buffer.cursor(), (1, 4));
    }

    #[test]
    fn test_hex_prefix_includes_bracket() {
        let mut buffer = TextBuffer::new("<0");
        buffer.move_end();
        assert_eq!(buffer.completion_prefix(), "<0");
    }
}
