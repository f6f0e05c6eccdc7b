//! Editor text to executable lines

use crate::language::tokenizer::{tokenize_line, LexState, TokenKind};

/// Split pane text into editor lines
///
/// Comments are blanked and surrounding whitespace trimmed. The line count is
/// preserved, so index `i` of the result is editor line `i + 1`. A line that
/// held only a comment becomes an empty placeholder.
pub fn editor_lines(text: &str) -> Vec<String> {
    let mut state = LexState::Root;
    text.split('\n')
        .map(|raw| {
            let raw = raw.strip_suffix('\r').unwrap_or(raw);
            let (tokens, next) = tokenize_line(raw, state);
            state = next;

            let mut line = String::with_capacity(raw.len());
            for token in tokens.iter().filter(|t| t.kind != TokenKind::Comment) {
                line.push_str(token.text(raw));
            }
            line.trim().to_string()
        })
        .collect()
}
