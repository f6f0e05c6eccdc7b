//! Declarative editing rules for the script language
//!
//! Comment markers, bracket pairs, auto-closing pairs and on-enter rules, in
//! the shape code-editing widgets expect. The editor buffer applies them with
//! the help of the [tokenizer](super::tokenizer) to know whether the cursor is
//! inside a string or comment.

use super::tokenizer::{tokenize_line, LexState, TokenKind};

/// Token context an auto-closing pair is suppressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenContext {
    String,
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentRule {
    pub line_comment: &'static str,
    pub block_comment: (&'static str, &'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoClosingPair {
    pub open: &'static str,
    pub close: &'static str,
    pub not_in: &'static [TokenContext],
}

impl AutoClosingPair {
    /// Opcode pairs close on their own line instead of inline
    pub fn closes_on_new_line(&self) -> bool {
        self.close.starts_with(' ') && self.close.trim_start().starts_with("OP_")
    }
}

/// Indentation change applied when Enter is pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentAction {
    None,
    /// Put the cursor on an indented line and the rest on its own line
    IndentOutdent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnterAction {
    pub indent: IndentAction,
    pub append_text: &'static str,
    /// Characters removed from the start of the new line's indentation
    pub remove_text: usize,
}

/// A rule matched against the text before and after the cursor on Enter
#[derive(Debug, Clone, Copy)]
pub struct OnEnterRule {
    pub before_text: fn(&str) -> bool,
    pub after_text: Option<fn(&str) -> bool>,
    pub action: EnterAction,
}

impl OnEnterRule {
    pub fn matches(&self, before: &str, after: &str) -> bool {
        (self.before_text)(before) && self.after_text.map_or(true, |rule| rule(after))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LanguageConfiguration {
    pub comments: CommentRule,
    pub brackets: &'static [(&'static str, &'static str)],
    pub auto_closing_pairs: &'static [AutoClosingPair],
    pub on_enter_rules: &'static [OnEnterRule],
}

const IN_STRING: &[TokenContext] = &[TokenContext::String];
const IN_STRING_OR_COMMENT: &[TokenContext] = &[TokenContext::String, TokenContext::Comment];

pub const LANGUAGE: LanguageConfiguration = LanguageConfiguration {
    comments: CommentRule {
        line_comment: "//",
        block_comment: ("/*", "*/"),
    },
    brackets: &[("<", ">"), ("$(", ")")],
    auto_closing_pairs: &[
        AutoClosingPair {
            open: "<",
            close: ">",
            not_in: &[],
        },
        AutoClosingPair {
            open: "$(",
            close: ")",
            not_in: &[],
        },
        AutoClosingPair {
            open: "\"",
            close: "\"",
            not_in: IN_STRING,
        },
        AutoClosingPair {
            open: "'",
            close: "'",
            not_in: IN_STRING_OR_COMMENT,
        },
        AutoClosingPair {
            open: "/**",
            close: " */",
            not_in: IN_STRING,
        },
        AutoClosingPair {
            open: "OP_IF",
            close: " OP_ENDIF",
            not_in: IN_STRING_OR_COMMENT,
        },
        AutoClosingPair {
            open: "OP_NOTIF",
            close: " OP_ENDIF",
            not_in: IN_STRING_OR_COMMENT,
        },
    ],
    on_enter_rules: &[
        // /** | */
        OnEnterRule {
            before_text: is_doc_comment_open,
            after_text: Some(is_block_comment_close),
            action: EnterAction {
                indent: IndentAction::IndentOutdent,
                append_text: " * ",
                remove_text: 0,
            },
        },
        // /** ...|
        OnEnterRule {
            before_text: is_doc_comment_open,
            after_text: None,
            action: EnterAction {
                indent: IndentAction::None,
                append_text: " * ",
                remove_text: 0,
            },
        },
        //  * ...|
        OnEnterRule {
            before_text: is_doc_comment_body,
            after_text: Some(is_doc_comment_continuation),
            action: EnterAction {
                indent: IndentAction::None,
                append_text: "* ",
                remove_text: 0,
            },
        },
        //  */|
        OnEnterRule {
            before_text: is_doc_comment_end,
            after_text: None,
            action: EnterAction {
                indent: IndentAction::None,
                append_text: "",
                remove_text: 1,
            },
        },
        //  *-----*/|
        OnEnterRule {
            before_text: is_doc_comment_rule_end,
            after_text: None,
            action: EnterAction {
                indent: IndentAction::None,
                append_text: "",
                remove_text: 1,
            },
        },
    ],
};

/// `^\s*/\*\*(?!/)([^*]|\*(?!/))*$`
fn is_doc_comment_open(before: &str) -> bool {
    let trimmed = before.trim_start();
    match trimmed.strip_prefix("/**") {
        Some(rest) => !rest.starts_with('/') && !rest.contains("*/"),
        None => false,
    }
}

/// `^\s*\*/$`
fn is_block_comment_close(after: &str) -> bool {
    after.trim_start() == "*/"
}

/// Indentation of spaces/tabs ending in a space, returning the rest
fn after_indent(line: &str) -> Option<&str> {
    let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
    if indent == 0 || !line[..indent].ends_with(' ') {
        return None;
    }
    Some(&line[indent..])
}

/// `^(\t|[ ])*[ ]\*([ ]([^*]|\*(?!/))*)?$`
fn is_doc_comment_body(before: &str) -> bool {
    match after_indent(before).and_then(|rest| rest.strip_prefix('*')) {
        Some("") => true,
        Some(rest) => rest.starts_with(' ') && !rest.contains("*/"),
        None => false,
    }
}

/// `^(\s*(\/\*\*|\*)).*`
fn is_doc_comment_continuation(after: &str) -> bool {
    let trimmed = after.trim_start();
    trimmed.starts_with("/**") || trimmed.starts_with('*')
}

/// `^(\t|[ ])*[ ]\*\/\s*$`
fn is_doc_comment_end(before: &str) -> bool {
    after_indent(before).is_some_and(|rest| rest.trim_end() == "*/")
}

/// `^(\t|[ ])*[ ]\*[^/]*\*\/\s*$`
fn is_doc_comment_rule_end(before: &str) -> bool {
    match after_indent(before).and_then(|rest| rest.strip_prefix('*')) {
        Some(rest) => match rest.trim_end().strip_suffix("*/") {
            Some(middle) => !middle.contains('/'),
            None => false,
        },
        None => false,
    }
}

/// Token context at the end of `before`, given the state the line started in
pub fn context_at(before: &str, line_state: LexState) -> Option<TokenContext> {
    let (tokens, state) = tokenize_line(before, line_state);
    match state {
        LexState::BlockComment => return Some(TokenContext::Comment),
        LexState::DoubleString | LexState::SingleString => return Some(TokenContext::String),
        LexState::Root => {}
    }
    match tokens.last().map(|t| t.kind) {
        Some(TokenKind::Comment) if before.trim_start().contains("//") => {
            Some(TokenContext::Comment)
        }
        _ => None,
    }
}

/// The auto-closing pair completed by the text just typed, if any
pub fn closing_pair_for(
    before: &str,
    line_state: LexState,
) -> Option<&'static AutoClosingPair> {
    // Longest opener first so `/**` wins over shorter candidates
    let mut candidates: Vec<&'static AutoClosingPair> = LANGUAGE
        .auto_closing_pairs
        .iter()
        .filter(|pair| before.ends_with(pair.open))
        .collect();
    candidates.sort_by_key(|pair| std::cmp::Reverse(pair.open.len()));

    for pair in candidates {
        let prefix = &before[..before.len() - pair.open.len()];
        if let Some(context) = context_at(prefix, line_state) {
            if pair.not_in.contains(&context) {
                continue;
            }
        }
        // opcode openers only count as whole words
        if pair.open.starts_with("OP_")
            && prefix
                .chars()
                .last()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            continue;
        }
        return Some(pair);
    }
    None
}

/// The first on-enter rule matching the cursor position
pub fn on_enter_action(before: &str, after: &str) -> Option<EnterAction> {
    LANGUAGE
        .on_enter_rules
        .iter()
        .find(|rule| rule.matches(before, after))
        .map(|rule| rule.action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closing_pairs() {
        assert_eq!(closing_pair_for("<", LexState::Root).map(|p| p.close), Some(">"));
        assert_eq!(
            closing_pair_for("OP_IF", LexState::Root).map(|p| p.close),
            Some(" OP_ENDIF")
        );
        assert_eq!(
            closing_pair_for("OP_NOTIF", LexState::Root).map(|p| p.close),
            Some(" OP_ENDIF")
        );
        assert!(closing_pair_for("OP_IF", LexState::Root)
            .is_some_and(|p| p.closes_on_new_line()));
    }

    #[test]
    fn test_closing_pairs_suppressed_in_context() {
        assert!(closing_pair_for("// OP_IF", LexState::Root).is_none());
        assert!(closing_pair_for("<'it'", LexState::Root).is_none());
        assert!(closing_pair_for("<\"abc '", LexState::Root).is_none());
        assert!(closing_pair_for("OP_IF", LexState::BlockComment).is_none());
    }

    #[test]
    fn test_on_enter_rules() {
        let action = on_enter_action("/** docs", "").unwrap();
        assert_eq!(action.append_text, " * ");

        let action = on_enter_action("/**", " */").unwrap();
        assert_eq!(action.indent, IndentAction::IndentOutdent);

        let action = on_enter_action("   * more", "* next").unwrap();
        assert_eq!(action.append_text, "* ");

        let action = on_enter_action("   */", "").unwrap();
        assert_eq!(action.remove_text, 1);

        assert!(on_enter_action("OP_ADD", "").is_none());
    }
}
