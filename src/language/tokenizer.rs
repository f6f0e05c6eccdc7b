//! Line tokenizer for the script language
//!
//! Splits editor text into [`Token`]s for highlighting and for deciding whether
//! the cursor sits inside a string or comment. Block comments and strings may
//! span lines, so tokenizing a line takes the [`LexState`] left by the previous
//! one and returns the state for the next.
//!
//! Rules, tried in order at each position:
//! - identifiers `[a-zA-Z_][.a-zA-Z0-9_-]+` (two characters or more)
//! - hex literals `0x` followed by hex digits, underscores allowed between digits
//! - integers `-?\d+(_+\d+)*`
//! - whitespace, `//` line comments and `/* */` block comments
//! - brackets `<`, `>`, `$(`, `)`
//! - `"` and `'` strings

/// Classification of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    HexLiteral,
    BigIntLiteral,
    /// `<` or `>`
    PushDelimiter,
    /// `$(` or `)`
    EvaluationDelimiter,
    String,
    Comment,
    Whitespace,
    /// Anything no rule matched
    Invalid,
}

/// A token as a byte range of its line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn text<'a>(&self, line: &'a str) -> &'a str {
        &line[self.start..self.end]
    }
}

/// Tokenizer state carried across lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexState {
    #[default]
    Root,
    BlockComment,
    DoubleString,
    SingleString,
}

/// Tokenize one line starting in `state`
pub fn tokenize_line(line: &str, mut state: LexState) -> (Vec<Token>, LexState) {
    let bytes = line.as_bytes();
    let mut tokens: Vec<Token> = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let (kind, end, next_state) = match state {
            LexState::BlockComment => {
                let end = match line[pos..].find("*/") {
                    Some(i) => pos + i + 2,
                    None => bytes.len(),
                };
                let next = if line[pos..end].ends_with("*/") {
                    LexState::Root
                } else {
                    LexState::BlockComment
                };
                (TokenKind::Comment, end, next)
            }
            LexState::DoubleString | LexState::SingleString => {
                let quote = if state == LexState::DoubleString {
                    b'"'
                } else {
                    b'\''
                };
                match bytes[pos..].iter().position(|b| *b == quote) {
                    Some(i) => (TokenKind::String, pos + i + 1, LexState::Root),
                    None => (TokenKind::String, bytes.len(), state),
                }
            }
            LexState::Root => root_token(line, pos),
        };

        push_token(&mut tokens, kind, pos, end);
        pos = end;
        state = next_state;
    }

    (tokens, state)
}

/// Tokenize a whole document, one token list per line
pub fn tokenize<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<Vec<Token>> {
    let mut state = LexState::Root;
    lines
        .into_iter()
        .map(|line| {
            let (tokens, next) = tokenize_line(line, state);
            state = next;
            tokens
        })
        .collect()
}

/// Merge adjacent tokens of the same kind
fn push_token(tokens: &mut Vec<Token>, kind: TokenKind, start: usize, end: usize) {
    if let Some(last) = tokens.last_mut() {
        if last.kind == kind && last.end == start && kind != TokenKind::PushDelimiter {
            last.end = end;
            return;
        }
    }
    tokens.push(Token { kind, start, end });
}

fn root_token(line: &str, pos: usize) -> (TokenKind, usize, LexState) {
    let bytes = line.as_bytes();
    let rest = &line[pos..];
    let c = bytes[pos];

    if let Some(end) = match_identifier(bytes, pos) {
        return (TokenKind::Identifier, end, LexState::Root);
    }
    if rest.starts_with("0x") {
        if let Some(end) = match_hex(bytes, pos + 2) {
            return (TokenKind::HexLiteral, end, LexState::Root);
        }
    }
    if let Some(end) = match_bigint(bytes, pos) {
        return (TokenKind::BigIntLiteral, end, LexState::Root);
    }
    if c == b' ' || c == b'\t' || c == b'\r' || c == b'\n' {
        let len = bytes[pos..]
            .iter()
            .take_while(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
            .count();
        return (TokenKind::Whitespace, pos + len, LexState::Root);
    }
    if rest.starts_with("/*") {
        return (TokenKind::Comment, pos + 2, LexState::BlockComment);
    }
    if rest.starts_with("//") {
        return (TokenKind::Comment, bytes.len(), LexState::Root);
    }
    if rest.starts_with("$(") {
        return (TokenKind::EvaluationDelimiter, pos + 2, LexState::Root);
    }
    match c {
        b'<' | b'>' => (TokenKind::PushDelimiter, pos + 1, LexState::Root),
        b')' => (TokenKind::EvaluationDelimiter, pos + 1, LexState::Root),
        b'"' => (TokenKind::String, pos + 1, LexState::DoubleString),
        b'\'' => (TokenKind::String, pos + 1, LexState::SingleString),
        _ => {
            // consume a whole UTF-8 character
            let len = rest.chars().next().map(|ch| ch.len_utf8()).unwrap_or(1);
            (TokenKind::Invalid, pos + len, LexState::Root)
        }
    }
}

fn match_identifier(bytes: &[u8], pos: usize) -> Option<usize> {
    let first = bytes[pos];
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return None;
    }
    let len = bytes[pos + 1..]
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
        .count();
    if len == 0 {
        return None;
    }
    Some(pos + 1 + len)
}

/// Hex digits with inner underscores; at least two digits, ending on a digit
fn match_hex(bytes: &[u8], pos: usize) -> Option<usize> {
    let run = bytes[pos..]
        .iter()
        .take_while(|b| b.is_ascii_hexdigit() || **b == b'_')
        .count();
    let slice = &bytes[pos..pos + run];
    if slice.first().is_some_and(|b| *b == b'_') {
        return None;
    }
    let last_digit = slice.iter().rposition(|b| b.is_ascii_hexdigit())?;
    let digits = slice[..=last_digit]
        .iter()
        .filter(|b| b.is_ascii_hexdigit())
        .count();
    if digits < 2 {
        return None;
    }
    Some(pos + last_digit + 1)
}

fn match_bigint(bytes: &[u8], pos: usize) -> Option<usize> {
    let mut i = pos;
    if bytes[i] == b'-' {
        i += 1;
    }
    let digits = bytes[i..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    i += digits;

    // (_+\d+)*
    loop {
        let underscores = bytes[i..].iter().take_while(|b| **b == b'_').count();
        if underscores == 0 {
            break;
        }
        let more = bytes[i + underscores..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if more == 0 {
            break;
        }
        i += underscores + more;
    }

    Some(i)
}
