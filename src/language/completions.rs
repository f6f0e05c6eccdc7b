//! Completion suggestions for the script editor
//!
//! Every opcode word known to the active rule set is offered as plain text.
//! A handful of snippets add multi-line constructs and literal pushes with
//! `${n:placeholder}` cursor stops.

use super::hover::opcode_summary;
use crate::vm::opcodes::OpcodeTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    Text,
    Keyword,
    Snippet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: String,
    pub kind: CompletionKind,
    pub insert_text: String,
    /// `insert_text` contains snippet placeholders
    pub is_snippet: bool,
    pub documentation: Option<String>,
}

/// Snippet text expanded for insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub text: String,
    /// Byte offset of the first cursor stop
    pub cursor: usize,
    /// Byte length of the placeholder at the cursor, selected on insert
    pub selection: usize,
}

const SNIPPETS: &[(&str, &str, &str)] = &[
    (
        "OP_IF",
        "OP_IF\n  ${1}\nOP_ELSE\n  $0\nOP_ENDIF",
        "If-Else block",
    ),
    ("OP_NOTIF", "OP_NOTIF\n  ${1}\nOP_ENDIF", "If-not block"),
    ("<0x", "<0x${1:00}>", "Push hex bytes"),
    ("<0b", "<0b${1:00000001}>", "Push binary bytes"),
    ("<'", "<'${1:text}'>", "Push UTF-8 text"),
    ("<n>", "<${1:0}>", "Push a number"),
];

/// The full suggestion list for one rule set
pub fn suggestions(table: &OpcodeTable) -> Vec<CompletionItem> {
    let mut items: Vec<CompletionItem> = table
        .names()
        .iter()
        .map(|&name| CompletionItem {
            label: name.to_string(),
            kind: if table.byte(name).is_some_and(|b| table.is_disabled(b)) {
                CompletionKind::Text
            } else {
                CompletionKind::Keyword
            },
            insert_text: name.to_string(),
            is_snippet: false,
            documentation: opcode_summary(name).map(str::to_string),
        })
        .collect();

    items.extend(SNIPPETS.iter().map(|&(label, body, doc)| CompletionItem {
        label: label.to_string(),
        kind: CompletionKind::Snippet,
        insert_text: body.to_string(),
        is_snippet: true,
        documentation: Some(doc.to_string()),
    }));
    items
}

/// Items whose label starts with `prefix`, case-insensitively
///
/// Snippets sort ahead of plain words with the same label, then shorter labels
/// first so `OP_ADD` comes before `OP_ADD64`.
pub fn suggest<'a>(items: &'a [CompletionItem], prefix: &str) -> Vec<&'a CompletionItem> {
    if prefix.is_empty() {
        return Vec::new();
    }
    let prefix = prefix.to_ascii_uppercase();
    let mut matches: Vec<&CompletionItem> = items
        .iter()
        .filter(|item| item.label.to_ascii_uppercase().starts_with(&prefix))
        .collect();
    matches.sort_by(|a, b| {
        a.label
            .len()
            .cmp(&b.label.len())
            .then((b.kind == CompletionKind::Snippet).cmp(&(a.kind == CompletionKind::Snippet)))
            .then(a.label.cmp(&b.label))
    });
    matches
}

/// Render snippet syntax to plain text
///
/// Supports `$n`, `${n}` and `${n:placeholder}`; `\$` is a literal dollar. The
/// cursor lands on the lowest numbered stop above zero, or `$0`, or the end.
pub fn expand_snippet(snippet: &str) -> Expansion {
    let mut text = String::with_capacity(snippet.len());
    // (stop number, offset, placeholder length)
    let mut stops: Vec<(u32, usize, usize)> = Vec::new();
    let mut chars = snippet.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'$') => {
                chars.next();
                text.push('$');
            }
            '$' => match chars.peek().copied() {
                Some('{') => {
                    chars.next();
                    let mut number = String::new();
                    while let Some(&d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                        number.push(d);
                        chars.next();
                    }
                    let mut placeholder = String::new();
                    if chars.peek() == Some(&':') {
                        chars.next();
                        for p in chars.by_ref() {
                            if p == '}' {
                                break;
                            }
                            placeholder.push(p);
                        }
                    } else if chars.peek() == Some(&'}') {
                        chars.next();
                    }
                    let offset = text.len();
                    text.push_str(&placeholder);
                    if let Ok(n) = number.parse() {
                        stops.push((n, offset, placeholder.len()));
                    }
                }
                Some(d) if d.is_ascii_digit() => {
                    let mut number = String::new();
                    while let Some(&d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                        number.push(d);
                        chars.next();
                    }
                    if let Ok(n) = number.parse() {
                        stops.push((n, text.len(), 0));
                    }
                }
                _ => text.push('$'),
            },
            _ => text.push(c),
        }
    }

    let first = stops
        .iter()
        .filter(|(n, _, _)| *n > 0)
        .min_by_key(|(n, _, _)| *n)
        .or_else(|| stops.iter().find(|(n, _, _)| *n == 0));
    let (cursor, selection) = first.map_or((text.len(), 0), |&(_, offset, len)| (offset, len));

    Expansion {
        text,
        cursor,
        selection,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::VmConfig;

    #[test]
    fn test_expand_placeholders() {
        let expansion = expand_snippet("<0x${1:00}>");
        assert_eq!(expansion.text, "<0x00>");
        assert_eq!(expansion.cursor, 3);
        assert_eq!(expansion.selection, 2);

        let expansion = expand_snippet("OP_IF\n  ${1}\nOP_ELSE\n  $0\nOP_ENDIF");
        assert_eq!(expansion.text, "OP_IF\n  \nOP_ELSE\n  \nOP_ENDIF");
        assert_eq!(expansion.cursor, 8);
        assert_eq!(expansion.selection, 0);
    }

    #[test]
    fn test_expand_without_stops() {
        let expansion = expand_snippet("OP_ADD");
        assert_eq!(expansion.text, "OP_ADD");
        assert_eq!(expansion.cursor, 6);

        assert_eq!(expand_snippet("\\$5 $").text, "$5 $");
    }

    #[test]
    fn test_suggest_by_prefix() {
        let items = suggestions(&OpcodeTable::new(VmConfig::default()));

        let matches = suggest(&items, "op_ad");
        assert_eq!(matches[0].label, "OP_ADD");
        assert!(matches.iter().all(|m| m.label.starts_with("OP_ADD")));

        let matches = suggest(&items, "OP_IF");
        assert_eq!(matches[0].kind, CompletionKind::Snippet);
        assert_eq!(matches[1].label, "OP_IF");

        assert!(suggest(&items, "").is_empty());
        assert!(suggest(&items, "zzz").is_empty());
    }

    #[test]
    fn test_disabled_words_are_plain_text() {
        let items = suggestions(&OpcodeTable::new(VmConfig::default()));
        let mul = items.iter().find(|i| i.label == "OP_MUL").unwrap();
        assert_eq!(mul.kind, CompletionKind::Text);
        assert!(mul.documentation.is_some());
    }
}
