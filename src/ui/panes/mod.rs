//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`editor`]: script editor with syntax highlighting and failed line marker
//! - [`output`]: per-line stack snapshots aligned with an editor
//! - [`status`]: status bar with keybindings and evaluation state
//! - [`popup`]: compile and template modals, completion and hover popups
//!
//! Each module exports a `render_*` function taking the frame, its area and
//! borrowed state; none of them own data.

pub mod editor;
pub mod output;
pub mod popup;
pub mod status;

pub use editor::render_editor_pane;
pub use output::{render_output_pane, OutputRenderData};
pub use popup::{
    render_compile_modal, render_completion_popup, render_hover_popup, render_template_modal,
};
pub use status::{render_status_bar, StatusRenderData};

use crate::ui::theme::DEFAULT_THEME;
use ratatui::style::{Modifier, Style};

/// Border style shared by all panes
pub(crate) fn border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    }
}
