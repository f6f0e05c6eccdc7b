//! Main TUI application state and logic

use crate::editor::layout::{Divider, PaneOffset, Quadrants};
use crate::editor::{editor_lines, evaluate, Debouncer, Evaluation, Pane, TextBuffer};
use crate::language::completions::{expand_snippet, suggest, suggestions, CompletionItem};
use crate::language::hover::{hover_at, Hover};
use crate::vm::{ScriptMachine, TxTemplate};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

use super::panes::{self, editor::buffer_position, editor::cursor_position};

/// Longest wait for input before checking the debounce gate again
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Percentage points moved per Ctrl+Arrow press
const RESIZE_STEP: i16 = 2;

/// Which editor is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    StackElements,
    WitnessScript,
}

impl FocusedPane {
    pub fn next(self) -> Self {
        match self {
            FocusedPane::StackElements => FocusedPane::WitnessScript,
            FocusedPane::WitnessScript => FocusedPane::StackElements,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    Compile,
    Template,
}

/// Editor lines of both panes, as handed to the pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaneLines {
    pub stack: Vec<String>,
    pub witness: Vec<String>,
}

impl PaneLines {
    pub fn from_buffers(stack: &TextBuffer, witness: &TextBuffer) -> Self {
        PaneLines {
            stack: editor_lines(&stack.text()),
            witness: editor_lines(&witness.text()),
        }
    }
}

/// Open completion list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionState {
    pub prefix: String,
    pub selected: usize,
}

/// The main application state
pub struct App {
    /// The machine every evaluation runs against
    pub vm: ScriptMachine,

    pub stack_editor: TextBuffer,
    pub witness_editor: TextBuffer,

    /// Lines of the last committed edit
    pub lines: PaneLines,

    /// Result of the last evaluation
    pub evaluation: Evaluation,

    /// Edits waiting out the quiet period
    pub debouncer: Debouncer<PaneLines>,

    pub tx_template: Option<TxTemplate>,
    pub template_editor: TextBuffer,
    pub template_error: Option<String>,

    pub focused_pane: FocusedPane,
    pub modal: Option<Modal>,

    /// Split positions and the divider being dragged
    pub offset: PaneOffset,
    pub dragging: Option<Divider>,

    /// Areas of the last render, for mouse hit testing
    pub pane_area: Rect,
    pub quadrants: Option<Quadrants>,

    /// Every suggestion for the active rule set
    pub suggestions: Vec<CompletionItem>,
    pub completion: Option<CompletionState>,
    pub hover: Option<Hover>,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,
}

impl App {
    /// Create the app and evaluate the initial pane contents
    pub fn new(
        vm: ScriptMachine,
        stack_text: &str,
        witness_text: &str,
        tx_template: Option<TxTemplate>,
    ) -> Self {
        let stack_editor = TextBuffer::new(stack_text);
        let witness_editor = TextBuffer::new(witness_text);
        let lines = PaneLines::from_buffers(&stack_editor, &witness_editor);
        let suggestions = suggestions(vm.opcodes());

        let mut app = App {
            vm,
            stack_editor,
            witness_editor,
            lines,
            evaluation: Evaluation::default(),
            debouncer: Debouncer::default(),
            tx_template,
            template_editor: TextBuffer::default(),
            template_error: None,
            focused_pane: FocusedPane::StackElements,
            modal: None,
            offset: PaneOffset::default(),
            dragging: None,
            pane_area: Rect::default(),
            quadrants: None,
            suggestions,
            completion: None,
            hover: None,
            should_quit: false,
            status_message: String::from("Ready!"),
        };
        app.evaluate();
        app
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            // Wake up in time for a pending evaluation
            let timeout = self
                .debouncer
                .time_until_due(Instant::now())
                .map_or(POLL_INTERVAL, |due| due.min(POLL_INTERVAL));

            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key_event(key, Instant::now());
                    }
                    Event::Mouse(mouse) => self.handle_mouse_event(mouse),
                    _ => {}
                }
            }

            self.tick(Instant::now());
        }

        Ok(())
    }

    /// Run the pipeline on the committed lines
    fn evaluate(&mut self) {
        self.evaluation = evaluate(
            &mut self.vm,
            &self.lines.stack,
            &self.lines.witness,
            self.tx_template.as_ref(),
        );
        self.status_message = match &self.evaluation.failure {
            Some(failure) => format!("Failed at line {}", failure.line),
            None => format!("Evaluated {} line(s)", self.evaluation.executed_count()),
        };
    }

    /// Commit a debounced edit once its quiet period is over
    pub fn tick(&mut self, now: Instant) {
        if let Some(lines) = self.debouncer.poll(now) {
            self.commit(lines);
        }
    }

    /// Commit any pending edit right away
    pub fn flush(&mut self) {
        if let Some(lines) = self.debouncer.flush() {
            self.commit(lines);
        }
    }

    fn commit(&mut self, lines: PaneLines) {
        self.lines = lines;
        self.evaluate();
    }

    /// Called after every change to an editor's text
    fn on_edit(&mut self, now: Instant) {
        self.evaluation.failure = None;
        self.hover = None;
        let lines = PaneLines::from_buffers(&self.stack_editor, &self.witness_editor);
        self.debouncer.schedule(lines, now);
    }

    pub fn focused_editor(&self) -> &TextBuffer {
        match self.focused_pane {
            FocusedPane::StackElements => &self.stack_editor,
            FocusedPane::WitnessScript => &self.witness_editor,
        }
    }

    fn focused_editor_mut(&mut self) -> &mut TextBuffer {
        match self.focused_pane {
            FocusedPane::StackElements => &mut self.stack_editor,
            FocusedPane::WitnessScript => &mut self.witness_editor,
        }
    }

    fn focused_area(&self) -> Option<Rect> {
        let quads = self.quadrants?;
        Some(match self.focused_pane {
            FocusedPane::StackElements => quads.stack_editor,
            FocusedPane::WitnessScript => quads.witness_editor,
        })
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Four panes plus status bar at bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let pane_area = main_chunks[0];
        let status_area = main_chunks[1];
        let quads = Quadrants::split(pane_area, self.offset);
        self.pane_area = pane_area;
        self.quadrants = Some(quads);

        self.stack_editor
            .scroll_to_cursor(quads.stack_editor.height.saturating_sub(2) as usize);
        self.witness_editor
            .scroll_to_cursor(quads.witness_editor.height.saturating_sub(2) as usize);

        let failed = self.evaluation.failed_pane_line();
        let failed_in = |pane: Pane| failed.and_then(|(p, line)| (p == pane).then_some(line));
        let message = self.evaluation.error_message();
        let show_cursor = self.modal.is_none();
        let stack_focused = self.focused_pane == FocusedPane::StackElements;

        panes::render_editor_pane(
            frame,
            quads.stack_editor,
            "Stack Elements",
            &self.stack_editor,
            self.vm.opcodes(),
            failed_in(Pane::StackElements),
            stack_focused,
            show_cursor && stack_focused,
        );

        panes::render_editor_pane(
            frame,
            quads.witness_editor,
            "Witness Script",
            &self.witness_editor,
            self.vm.opcodes(),
            failed_in(Pane::WitnessScript),
            !stack_focused,
            show_cursor && !stack_focused,
        );

        panes::render_output_pane(
            frame,
            quads.stack_output,
            &panes::OutputRenderData {
                title: "Stack Elements Output",
                snapshots: self.evaluation.stack_pane(),
                line_count: self.stack_editor.lines().len(),
                failure: failed_in(Pane::StackElements).zip(message),
                carried_stack: None,
                cursor_row: stack_focused.then(|| self.stack_editor.cursor().0),
                scroll: self.stack_editor.scroll(),
            },
        );

        panes::render_output_pane(
            frame,
            quads.witness_output,
            &panes::OutputRenderData {
                title: "Witness Script Output",
                snapshots: self.evaluation.witness_pane(),
                line_count: self.witness_editor.lines().len(),
                failure: failed_in(Pane::WitnessScript).zip(message),
                carried_stack: Some(self.evaluation.first_editor_stack.as_slice()),
                cursor_row: (!stack_focused).then(|| self.witness_editor.cursor().0),
                scroll: self.witness_editor.scroll(),
            },
        );

        panes::render_status_bar(
            frame,
            status_area,
            &panes::StatusRenderData {
                message: &self.status_message,
                config: self.vm.config(),
                failure: self.evaluation.failure.as_ref(),
                is_pending: self.debouncer.is_pending(),
                has_template: self.tx_template.is_some(),
            },
        );

        match self.modal {
            Some(Modal::Compile) => {
                panes::render_compile_modal(frame, size, &self.evaluation, self.vm.opcodes());
            }
            Some(Modal::Template) => {
                let popup = panes::popup::centered_rect(70, 80, size);
                self.template_editor
                    .scroll_to_cursor(popup.height.saturating_sub(5) as usize);
                panes::render_template_modal(
                    frame,
                    size,
                    &self.template_editor,
                    self.template_error.as_deref(),
                );
            }
            None => self.render_cursor_popups(frame, pane_area),
        }
    }

    fn render_cursor_popups(&self, frame: &mut Frame, bounds: Rect) {
        let Some(area) = self.focused_area() else {
            return;
        };
        let Some(anchor) = cursor_position(area, self.focused_editor()) else {
            return;
        };

        if let Some(state) = &self.completion {
            let items = suggest(&self.suggestions, &state.prefix);
            panes::render_completion_popup(frame, anchor, bounds, &items, state.selected);
        } else if let Some(hover) = &self.hover {
            panes::render_hover_popup(frame, anchor, bounds, hover);
        }
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent, now: Instant) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c')) {
            self.should_quit = true;
            return;
        }

        match self.modal {
            Some(Modal::Compile) => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter)
                    || (ctrl && key.code == KeyCode::Char('b'))
                {
                    self.modal = None;
                }
                return;
            }
            Some(Modal::Template) => {
                self.handle_template_key(key);
                return;
            }
            None => {}
        }

        if ctrl {
            match key.code {
                KeyCode::Char('b') => self.open_compile(),
                KeyCode::Char('t') => self.open_template(),
                KeyCode::Char(' ') => self.complete(now),
                KeyCode::Left => self.offset.shift(-RESIZE_STEP, 0),
                KeyCode::Right => self.offset.shift(RESIZE_STEP, 0),
                KeyCode::Up => self.offset.shift(0, -RESIZE_STEP),
                KeyCode::Down => self.offset.shift(0, RESIZE_STEP),
                _ => {}
            }
            return;
        }

        if let Some(state) = &mut self.completion {
            let count = suggest(&self.suggestions, &state.prefix).len();
            match key.code {
                KeyCode::Up => {
                    state.selected = state.selected.checked_sub(1).unwrap_or(count.saturating_sub(1));
                    return;
                }
                KeyCode::Down => {
                    state.selected = if state.selected + 1 >= count { 0 } else { state.selected + 1 };
                    return;
                }
                KeyCode::Esc => {
                    self.completion = None;
                    return;
                }
                _ => {}
            }
        }

        match key.code {
            KeyCode::Esc => {
                self.hover = None;
            }
            // Some terminals report Ctrl+Space as NUL
            KeyCode::Null => self.complete(now),
            KeyCode::F(1) => self.toggle_hover(),
            KeyCode::Tab | KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.next();
                self.completion = None;
                self.hover = None;
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down | KeyCode::Home
            | KeyCode::End => {
                let editor = self.focused_editor_mut();
                match key.code {
                    KeyCode::Left => editor.move_left(),
                    KeyCode::Right => editor.move_right(),
                    KeyCode::Up => editor.move_up(),
                    KeyCode::Down => editor.move_down(),
                    KeyCode::Home => editor.move_home(),
                    _ => editor.move_end(),
                }
                self.completion = None;
                self.hover = None;
            }
            KeyCode::Enter => {
                self.focused_editor_mut().newline();
                self.completion = None;
                self.on_edit(now);
            }
            KeyCode::Backspace => {
                self.focused_editor_mut().backspace();
                self.on_edit(now);
                self.refresh_completion(false);
            }
            KeyCode::Delete => {
                self.focused_editor_mut().delete();
                self.on_edit(now);
                self.refresh_completion(false);
            }
            KeyCode::Char(c) => {
                self.focused_editor_mut().insert_char(c);
                self.on_edit(now);
                self.refresh_completion(false);
            }
            _ => {}
        }
    }

    /// Open, narrow or close the completion list for the word at the cursor
    ///
    /// Typing opens the list from two characters on; `force` opens it for any
    /// non-empty prefix.
    fn refresh_completion(&mut self, force: bool) {
        let prefix = self.focused_editor().completion_prefix().to_string();
        let min_len = if force { 1 } else { 2 };
        let has_matches = prefix.len() >= min_len && !suggest(&self.suggestions, &prefix).is_empty();

        self.completion = if has_matches {
            let selected = match &self.completion {
                Some(state) if state.prefix == prefix => state.selected,
                _ => 0,
            };
            Some(CompletionState { prefix, selected })
        } else {
            None
        };
    }

    /// Accept the selected suggestion, or open the list when none is shown
    fn complete(&mut self, now: Instant) {
        let Some(state) = self.completion.take() else {
            self.refresh_completion(true);
            if self.completion.is_none() {
                self.status_message = "No suggestions".to_string();
            }
            return;
        };

        let expansion = suggest(&self.suggestions, &state.prefix)
            .get(state.selected)
            .map(|item| expand_snippet(&item.insert_text));
        if let Some(expansion) = expansion {
            self.focused_editor_mut().apply_completion(&expansion);
            self.on_edit(now);
        }
    }

    fn toggle_hover(&mut self) {
        if self.hover.take().is_some() {
            return;
        }
        self.completion = None;
        let editor = self.focused_editor();
        let (row, col) = editor.cursor();
        self.hover = Some(hover_at(editor.lines(), row, col, self.vm.opcodes()));
    }

    fn open_compile(&mut self) {
        self.flush();
        self.completion = None;
        self.hover = None;
        self.modal = Some(Modal::Compile);
        self.status_message = "Compiled".to_string();
    }

    fn open_template(&mut self) {
        let json = self.tx_template.clone().unwrap_or_default().to_json_pretty();
        self.template_editor = TextBuffer::new(&json);
        self.template_error = None;
        self.completion = None;
        self.hover = None;
        self.modal = Some(Modal::Template);
    }

    fn handle_template_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let editor = &mut self.template_editor;

        match key.code {
            KeyCode::Esc => {
                self.modal = None;
                self.template_error = None;
            }
            KeyCode::Char('s') if ctrl => self.apply_template(),
            KeyCode::Char('d') if ctrl => {
                self.tx_template = None;
                self.modal = None;
                log::info!("transaction template cleared");
                self.flush();
                self.evaluate();
                self.status_message = "Transaction template cleared".to_string();
            }
            _ if ctrl => {}
            KeyCode::Enter => editor.insert_str("\n"),
            KeyCode::Tab => editor.insert_str("  "),
            KeyCode::Backspace => editor.backspace(),
            KeyCode::Delete => editor.delete(),
            KeyCode::Left => editor.move_left(),
            KeyCode::Right => editor.move_right(),
            KeyCode::Up => editor.move_up(),
            KeyCode::Down => editor.move_down(),
            KeyCode::Home => editor.move_home(),
            KeyCode::End => editor.move_end(),
            KeyCode::Char(c) => editor.insert_str(c.encode_utf8(&mut [0; 4])),
            _ => {}
        }
    }

    fn apply_template(&mut self) {
        match TxTemplate::from_json(&self.template_editor.text()) {
            Ok(tx) => {
                log::info!(
                    "transaction template loaded: {} input(s), {} output(s)",
                    tx.inputs.len(),
                    tx.outputs.len()
                );
                self.tx_template = Some(tx);
                self.template_error = None;
                self.modal = None;
                self.flush();
                self.evaluate();
                self.status_message = "Transaction template applied".to_string();
            }
            Err(e) => {
                self.template_error = Some(e.to_string());
            }
        }
    }

    /// Handle mouse events: focus and cursor placement, divider dragging
    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        let Some(quads) = self.quadrants else {
            return;
        };
        if self.modal.is_some() {
            return;
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(divider) = quads.divider_at(mouse.column, mouse.row) {
                    self.dragging = Some(divider);
                    return;
                }

                let position = Position::new(mouse.column, mouse.row);
                let clicked = [
                    (FocusedPane::StackElements, quads.stack_editor),
                    (FocusedPane::WitnessScript, quads.witness_editor),
                ]
                .into_iter()
                .find(|(_, area)| area.contains(position));

                if let Some((pane, area)) = clicked {
                    self.focused_pane = pane;
                    self.completion = None;
                    self.hover = None;
                    let editor = self.focused_editor_mut();
                    if let Some((row, column)) =
                        buffer_position(area, editor, mouse.column, mouse.row)
                    {
                        editor.goto(row, column);
                    }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => match self.dragging {
                Some(Divider::Column) => self.offset.drag_column(mouse.column, self.pane_area),
                Some(Divider::Row) => self.offset.drag_row(mouse.row, self.pane_area),
                None => {}
            },
            MouseEventKind::Up(MouseButton::Left) => {
                self.dragging = None;
            }
            MouseEventKind::ScrollUp => self.focused_editor_mut().move_up(),
            MouseEventKind::ScrollDown => self.focused_editor_mut().move_down(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::DEBOUNCE_DELAY;
    use crate::vm::VmConfig;

    fn app(stack: &str, witness: &str) -> App {
        App::new(ScriptMachine::new(VmConfig::default()), stack, witness, None)
    }

    fn press(app: &mut App, code: KeyCode, now: Instant) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE), now);
    }

    fn type_text(app: &mut App, text: &str, now: Instant) {
        for c in text.chars() {
            press(app, KeyCode::Char(c), now);
        }
    }

    #[test]
    fn test_initial_evaluation() {
        let app = app("<0x01>\n<5>", "OP_ADD");
        assert_eq!(app.evaluation.snapshots.len(), 3);
        assert!(app.evaluation.failure.is_none());
    }

    #[test]
    fn test_edits_are_debounced() {
        let start = Instant::now();
        let mut app = app("<1>", "");
        app.focused_pane = FocusedPane::WitnessScript;

        type_text(&mut app, "OP_DUP", start);
        app.tick(start + Duration::from_millis(100));
        assert!(app.evaluation.snapshots[1].is_blank());
        assert!(app.debouncer.is_pending());

        app.tick(start + DEBOUNCE_DELAY);
        assert_eq!(app.lines.witness, vec!["OP_DUP"]);
        assert_eq!(app.evaluation.snapshots.len(), 2);
        assert_eq!(app.evaluation.snapshots[1].elements().len(), 2);
    }

    #[test]
    fn test_edit_clears_error() {
        let start = Instant::now();
        let mut app = app("OP_ADD", "");
        assert!(app.evaluation.failure.is_some());

        press(&mut app, KeyCode::End, start);
        press(&mut app, KeyCode::Backspace, start);
        assert!(app.evaluation.failure.is_none());

        app.tick(start + DEBOUNCE_DELAY);
        assert!(app.evaluation.failure.is_some());
    }

    #[test]
    fn test_completion_accept() {
        let start = Instant::now();
        let mut app = app("", "");
        app.focused_pane = FocusedPane::WitnessScript;

        type_text(&mut app, "OP_EQUALV", start);
        assert!(app.completion.is_some());
        app.handle_key_event(
            KeyEvent::new(KeyCode::Char(' '), KeyModifiers::CONTROL),
            start,
        );

        assert_eq!(app.witness_editor.text(), "OP_EQUALVERIFY");
        assert!(app.completion.is_none());
    }

    #[test]
    fn test_template_apply_and_clear() {
        let mut app = app("<0>", "OP_CHECKLOCKTIMEVERIFY");
        assert!(app.evaluation.failure.is_some());

        let mut tx = TxTemplate::default();
        tx.inputs[0].sequence = 0xffff_fffe;
        app.open_template();
        app.template_editor = TextBuffer::new(&tx.to_json_pretty());
        app.apply_template();
        assert_eq!(app.tx_template, Some(tx));
        assert!(app.modal.is_none());
        assert!(app.evaluation.failure.is_none());

        app.open_template();
        app.handle_key_event(
            KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL),
            Instant::now(),
        );
        assert!(app.tx_template.is_none());
        assert!(app.evaluation.failure.is_some());
    }

    #[test]
    fn test_invalid_template_stays_open() {
        let mut app = app("", "");
        app.open_template();
        app.template_editor = TextBuffer::new("{ not json");
        app.apply_template();

        assert_eq!(app.modal, Some(Modal::Template));
        assert!(app.template_error.is_some());
        assert!(app.tx_template.is_none());
    }

    #[test]
    fn test_ctrl_arrows_resize() {
        let mut app = app("", "");
        app.handle_key_event(
            KeyEvent::new(KeyCode::Right, KeyModifiers::CONTROL),
            Instant::now(),
        );
        assert_eq!(app.offset.x(), RESIZE_STEP);
    }
}
