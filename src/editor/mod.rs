//! Editor-side logic, independent of the terminal
//!
//! - [`lines`]: pane text to executable editor lines
//! - [`parse`]: one line into one machine call
//! - [`pipeline`]: both panes into per-line stack snapshots
//! - [`debounce`]: the quiet-period gate between edits and evaluation
//! - [`buffer`]: the editable text of a pane
//! - [`layout`]: the four-pane split and its drag offset
//! - [`presets`]: starting pane contents per network

pub mod buffer;
pub mod debounce;
pub mod layout;
pub mod lines;
pub mod parse;
pub mod pipeline;
pub mod presets;

pub use buffer::TextBuffer;
pub use debounce::{Debouncer, DEBOUNCE_DELAY};
pub use lines::editor_lines;
pub use parse::{parse_input, InputError, PUSH_ONLY_ERROR};
pub use pipeline::{evaluate, Evaluation, FailedLine, LineSnapshot, Pane};
