//! Evaluation pipeline
//!
//! Runs both panes as one program against a [`ScriptVm`] and records the stack
//! after every line. Pane 1 (stack elements) runs push-only; pane 2 (witness
//! script) may use any opcode. The run stops at the first failing line.
//!
//! # Snapshots
//!
//! There is one [`LineSnapshot`] per editor line up to the first failure:
//! [`LineSnapshot::Blank`] for empty lines, [`LineSnapshot::Stack`] for
//! executed ones. The failing line itself gets no snapshot, so for a failure
//! on line `n` exactly `n - 1` snapshots exist.

use super::parse::parse_input;
use crate::vm::{ScriptVm, StackData, TxTemplate};

/// Stack state after one editor line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineSnapshot {
    /// Placeholder for an empty line
    Blank,
    Stack(Vec<StackData>),
}

impl LineSnapshot {
    pub fn elements(&self) -> &[StackData] {
        match self {
            LineSnapshot::Blank => &[],
            LineSnapshot::Stack(elements) => elements,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, LineSnapshot::Blank)
    }
}

/// First error of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedLine {
    /// 1-based index over both panes
    pub line: usize,
    pub message: String,
}

/// Which editor pane a line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    StackElements,
    WitnessScript,
}

/// Result of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub snapshots: Vec<LineSnapshot>,
    pub failure: Option<FailedLine>,
    /// Stack after the last pane 1 line, empty if pane 1 failed
    pub first_editor_stack: Vec<StackData>,
    /// Number of pane 1 lines
    pub boundary: usize,
    /// Compiled pane 1 bytecode (hex)
    pub unlocking_bytecode: String,
    /// Compiled pane 2 bytecode (hex)
    pub witness_bytecode: String,
}

impl Evaluation {
    /// Snapshots of pane 1 lines
    pub fn stack_pane(&self) -> &[LineSnapshot] {
        &self.snapshots[..self.boundary.min(self.snapshots.len())]
    }

    /// Snapshots of pane 2 lines
    pub fn witness_pane(&self) -> &[LineSnapshot] {
        &self.snapshots[self.boundary.min(self.snapshots.len())..]
    }

    /// Snapshots taken for executed (non-empty) lines
    pub fn executed_count(&self) -> usize {
        self.snapshots.iter().filter(|s| !s.is_blank()).count()
    }

    /// The failing line as a pane and a 1-based line within that pane
    pub fn failed_pane_line(&self) -> Option<(Pane, usize)> {
        let failure = self.failure.as_ref()?;
        if failure.line <= self.boundary {
            Some((Pane::StackElements, failure.line))
        } else {
            Some((Pane::WitnessScript, failure.line - self.boundary))
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.failure.as_ref().map(|f| f.message.as_str())
    }

    /// Full compiled program, unlocking bytecode followed by the witness script
    pub fn bytecode(&self) -> String {
        format!("{}{}", self.unlocking_bytecode, self.witness_bytecode)
    }
}

/// Evaluate both panes from a clean machine
///
/// `tx` is injected after the reset and before any line runs.
pub fn evaluate<V: ScriptVm + ?Sized>(
    vm: &mut V,
    stack_lines: &[String],
    witness_lines: &[String],
    tx: Option<&TxTemplate>,
) -> Evaluation {
    vm.clear_stack();
    if let Some(tx) = tx {
        vm.set_tx_template(tx);
    }

    let boundary = stack_lines.len();
    let mut evaluation = Evaluation {
        boundary,
        ..Evaluation::default()
    };

    let mut first_editor_done = false;

    for (index, line) in stack_lines.iter().chain(witness_lines).enumerate() {
        if index == boundary {
            finish_first_editor(vm, &mut evaluation);
            first_editor_done = true;
        }

        if line.is_empty() {
            evaluation.snapshots.push(LineSnapshot::Blank);
            continue;
        }

        let failure = match parse_input(vm, line, index < boundary) {
            Err(e) => Some(e.to_string()),
            Ok(()) => vm.error_message(),
        };
        if let Some(message) = failure {
            log::debug!("line {} failed: {}", index + 1, message);
            evaluation.failure = Some(FailedLine {
                line: index + 1,
                message,
            });
            break;
        }

        evaluation
            .snapshots
            .push(LineSnapshot::Stack(vm.stack().to_vec()));
    }

    if !first_editor_done && evaluation.failure.is_none() {
        finish_first_editor(vm, &mut evaluation);
        first_editor_done = true;
    }

    let compiled = vm.compile();
    if first_editor_done {
        let split = evaluation.unlocking_bytecode.len().min(compiled.len());
        evaluation.witness_bytecode = compiled[split..].to_string();
    } else {
        // pane 1 failed: everything compiled so far belongs to it
        evaluation.unlocking_bytecode = compiled;
    }

    log::debug!(
        "evaluated {} lines, {} snapshots, failure: {:?}",
        stack_lines.len() + witness_lines.len(),
        evaluation.snapshots.len(),
        evaluation.failure
    );
    evaluation
}

fn finish_first_editor<V: ScriptVm + ?Sized>(vm: &V, evaluation: &mut Evaluation) {
    evaluation.first_editor_stack = vm.stack().to_vec();
    evaluation.unlocking_bytecode = vm.compile();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::parse::PUSH_ONLY_ERROR;
    use crate::vm::{ScriptMachine, VmConfig};

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    fn displayed(snapshot: &LineSnapshot) -> Vec<String> {
        snapshot
            .elements()
            .iter()
            .map(|d| d.display_value())
            .collect()
    }

    #[test]
    fn test_two_pane_program() {
        let mut vm = ScriptMachine::new(VmConfig::default());
        let eval = evaluate(&mut vm, &lines(&["<0x01>", "<5>"]), &lines(&["OP_ADD"]), None);

        assert!(eval.failure.is_none());
        assert_eq!(eval.snapshots.len(), 3);
        assert_eq!(displayed(&eval.snapshots[0]), vec!["0x01"]);
        assert_eq!(displayed(&eval.snapshots[1]), vec!["0x01", "5"]);
        assert_eq!(displayed(&eval.snapshots[2]), vec!["6"]);
        assert_eq!(eval.stack_pane().len(), 2);
        assert_eq!(eval.witness_pane().len(), 1);
        assert_eq!(eval.first_editor_stack.len(), 2);
        assert_eq!(eval.unlocking_bytecode, "5155");
        assert_eq!(eval.witness_bytecode, "93");
    }

    #[test]
    fn test_push_only_violation() {
        let mut vm = ScriptMachine::new(VmConfig::default());
        let eval = evaluate(&mut vm, &lines(&["OP_ADD"]), &[], None);

        let failure = eval.failure.as_ref().unwrap();
        assert_eq!(failure.line, 1);
        assert_eq!(failure.message, PUSH_ONLY_ERROR);
        assert!(eval.snapshots.is_empty());
        assert_eq!(eval.failed_pane_line(), Some((Pane::StackElements, 1)));
    }

    #[test]
    fn test_blank_lines_are_placeholders() {
        let mut vm = ScriptMachine::new(VmConfig::default());
        let eval = evaluate(
            &mut vm,
            &lines(&["<1>", "", "<2>"]),
            &lines(&["", "OP_ADD"]),
            None,
        );

        assert_eq!(eval.snapshots.len(), 5);
        assert!(eval.snapshots[1].is_blank());
        assert!(eval.snapshots[3].is_blank());
        assert_eq!(eval.executed_count(), 3);
        assert_eq!(displayed(&eval.snapshots[4]), vec!["3"]);
    }

    #[test]
    fn test_machine_error_stops_run() {
        let mut vm = ScriptMachine::new(VmConfig::default());
        let eval = evaluate(
            &mut vm,
            &lines(&["<1>"]),
            &lines(&["OP_ADD", "<2>", ""]),
            None,
        );

        let failure = eval.failure.as_ref().unwrap();
        assert_eq!(failure.line, 2);
        assert!(failure.message.starts_with("OP_ADD Error"));
        assert_eq!(eval.snapshots.len(), 1);
        assert_eq!(eval.failed_pane_line(), Some((Pane::WitnessScript, 1)));
        assert_eq!(eval.first_editor_stack[0].display_value(), "1");
    }

    #[test]
    fn test_rerun_starts_clean() {
        let mut vm = ScriptMachine::new(VmConfig::default());
        let stack = lines(&["<2>", "<3>"]);
        let witness = lines(&["OP_ADD", "<5>", "OP_EQUAL"]);

        let first = evaluate(&mut vm, &stack, &witness, None);
        let second = evaluate(&mut vm, &stack, &witness, None);
        assert_eq!(first, second);

        let failed = evaluate(&mut vm, &lines(&["OP_DUP"]), &[], None);
        assert!(failed.failure.is_some());
        let recovered = evaluate(&mut vm, &stack, &witness, None);
        assert_eq!(recovered, first);
    }

    #[test]
    fn test_only_stack_pane() {
        let mut vm = ScriptMachine::new(VmConfig::default());
        let eval = evaluate(&mut vm, &lines(&["<7>"]), &[], None);

        assert_eq!(eval.first_editor_stack.len(), 1);
        assert_eq!(eval.unlocking_bytecode, "57");
        assert_eq!(eval.witness_bytecode, "");
    }
}
