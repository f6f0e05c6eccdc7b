//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into three layers:
//!
//! - **[`app`]**: application state, event loop, pane focus, debounced evaluation
//! - **[`panes`]**: stateless render functions for the editors, their stack
//!   outputs, the status bar and the popups
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with a
//! [`ScriptMachine`] and call [`App::run`] to start the event loop.
//!
//! [`ScriptMachine`]: crate::vm::ScriptMachine
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
