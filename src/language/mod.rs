//! Script language support for the editor panes
//!
//! # Modules
//!
//! - [`tokenizer`]: stateful line tokenizer used for highlighting
//! - [`grammar`]: comments, brackets, auto-closing pairs and on-enter rules
//! - [`completions`]: opcode suggestions and snippet expansion
//! - [`hover`]: opcode summaries under the cursor

pub mod completions;
pub mod grammar;
pub mod hover;
pub mod tokenizer;

pub use completions::{expand_snippet, suggest, suggestions, CompletionItem};
pub use grammar::LANGUAGE;
pub use hover::{hover_at, Hover};
pub use tokenizer::{tokenize, tokenize_line, LexState, Token, TokenKind};
