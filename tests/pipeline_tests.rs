// Integration tests for the editor evaluation pipeline

use std::time::{Duration, Instant};

use stackwiz::editor::presets::preset_for;
use stackwiz::editor::{
    editor_lines, evaluate, Debouncer, LineSnapshot, Pane, DEBOUNCE_DELAY, PUSH_ONLY_ERROR,
};
use stackwiz::vm::compile::disassemble;
use stackwiz::vm::{Network, ScriptMachine, ScriptVersion, TxTemplate, VmConfig};

fn run(stack: &str, witness: &str) -> stackwiz::editor::Evaluation {
    let mut vm = ScriptMachine::new(VmConfig::default());
    evaluate(&mut vm, &editor_lines(stack), &editor_lines(witness), None)
}

fn top(snapshot: &LineSnapshot) -> Vec<String> {
    snapshot
        .elements()
        .iter()
        .map(|d| d.display_value())
        .collect()
}

#[test]
fn test_add_across_panes() {
    let eval = run("<0x01>\n<5>", "OP_ADD");

    assert!(eval.failure.is_none());
    assert_eq!(top(&eval.snapshots[0]), vec!["0x01"]);
    assert_eq!(top(&eval.snapshots[1]), vec!["0x01", "5"]);
    assert_eq!(top(&eval.snapshots[2]), vec!["6"]);
    assert_eq!(eval.bytecode(), "515593");
}

#[test]
fn test_comments_keep_line_alignment() {
    let eval = run(
        "// inputs\n<2> // first\n/* spans\n two lines */\n<3>",
        "OP_ADD\n<5>\nOP_EQUAL",
    );

    assert!(eval.failure.is_none());
    assert_eq!(eval.stack_pane().len(), 5);
    assert!(eval.stack_pane()[0].is_blank());
    assert!(eval.stack_pane()[2].is_blank());
    assert_eq!(top(&eval.stack_pane()[4]), vec!["2", "3"]);
    assert_eq!(top(&eval.witness_pane()[2]), vec!["1"]);
}

#[test]
fn test_snapshots_stop_at_failure() {
    let eval = run("<1>\n\n<2>", "OP_DROP\nOP_DROP\nOP_DROP\nOP_1");

    let failure = eval.failure.as_ref().unwrap();
    assert_eq!(failure.line, 6);
    assert_eq!(eval.failed_pane_line(), Some((Pane::WitnessScript, 3)));
    // one snapshot per line before the failing one
    assert_eq!(eval.snapshots.len(), failure.line - 1);
    assert_eq!(eval.executed_count(), 4);
    assert!(top(eval.snapshots.last().unwrap()).is_empty());
}

#[test]
fn test_stack_pane_is_push_only() {
    let eval = run("<1>\nOP_DUP", "");

    let failure = eval.failure.as_ref().unwrap();
    assert_eq!(failure.line, 2);
    assert_eq!(eval.failed_pane_line(), Some((Pane::StackElements, 2)));
    assert!(eval.first_editor_stack.is_empty());
}

#[test]
fn test_pushed_opcode_refused_in_stack_pane() {
    let eval = run("<OP_ADD>", "");

    let failure = eval.failure.as_ref().unwrap();
    assert_eq!(failure.line, 1);
    assert_eq!(failure.message, PUSH_ONLY_ERROR);
    assert!(eval.snapshots.is_empty());
}

#[test]
fn test_pushed_opcode_in_witness_pane() {
    let eval = run("", "<OP_ADD>");

    assert!(eval.failure.is_none());
    assert_eq!(top(&eval.witness_pane()[0]), vec!["0x93"]);
}

#[test]
fn test_literal_forms() {
    let eval = run("<0xdeadbeef>\n<0b00000101>\n<'abc'>\n<-3>\n<>\n<1e3>\n<'>", "");

    assert!(eval.failure.is_none(), "{:?}", eval.failure);
    assert_eq!(
        top(eval.stack_pane().last().unwrap()),
        vec!["0xdeadbeef", "0x05", "abc", "-3", "0", "1000", "'"]
    );
    // the empty witness pane is one blank line
    assert!(eval.witness_pane()[0].is_blank());
}

#[test]
fn test_unrecognized_line_is_an_error() {
    let eval = run("", "OP_1\nnonsense");

    let failure = eval.failure.as_ref().unwrap();
    assert_eq!(failure.line, 3);
    assert!(failure.message.contains("nonsense"));
}

#[test]
fn test_disassemble_compiled_program() {
    let mut vm = ScriptMachine::new(VmConfig::default());
    let eval = evaluate(
        &mut vm,
        &editor_lines("<'abc'>"),
        &editor_lines("OP_SIZE\nOP_NIP"),
        None,
    );
    assert!(eval.failure.is_none());
    assert_eq!(eval.unlocking_bytecode, "03616263");

    let bytes = hex::decode(eval.bytecode()).unwrap();
    assert_eq!(
        disassemble(&bytes, vm.opcodes()),
        vec!["<0x616263>", "OP_SIZE", "OP_NIP"]
    );
}

#[test]
fn test_evaluation_is_repeatable() {
    let mut vm = ScriptMachine::new(VmConfig::default());
    let stack = editor_lines("<'hello'>");
    let witness = editor_lines("OP_SHA256\nOP_SIZE");

    let first = evaluate(&mut vm, &stack, &witness, None);
    let second = evaluate(&mut vm, &stack, &witness, None);
    assert_eq!(first, second);
}

#[test]
fn test_template_enables_locktime() {
    let mut vm = ScriptMachine::new(VmConfig::default());
    let stack = editor_lines("<100>");
    let witness = editor_lines("OP_CHECKLOCKTIMEVERIFY");

    let without = evaluate(&mut vm, &stack, &witness, None);
    assert!(without.failure.is_some());

    let mut tx = TxTemplate::default();
    tx.locktime = 150;
    tx.inputs[0].sequence = 0xffff_fffe;
    let with = evaluate(&mut vm, &stack, &witness, Some(&tx));
    assert!(with.failure.is_none(), "{:?}", with.failure);

    // the template does not outlive the evaluation it was given to
    let again = evaluate(&mut vm, &stack, &witness, None);
    assert!(again.failure.is_some());
}

#[test]
fn test_presets_run_clean() {
    for network in [Network::Bitcoin, Network::Liquid] {
        for version in [ScriptVersion::Segwit, ScriptVersion::Tapscript] {
            let config = VmConfig::new(network, version);
            let preset = preset_for(config);
            let mut vm = ScriptMachine::new(config);
            let eval = evaluate(
                &mut vm,
                &editor_lines(preset.stack_elements),
                &editor_lines(preset.witness_script),
                None,
            );
            assert!(eval.failure.is_none(), "{}: {:?}", config, eval.failure);
        }
    }
}

#[test]
fn test_rapid_edits_evaluate_once() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new(DEBOUNCE_DELAY);
    let mut evaluations = Vec::new();

    for (i, text) in ["<1", "<1>", "<1>\n<2>"].into_iter().enumerate() {
        let now = start + Duration::from_millis(i as u64 * 100);
        if let Some(text) = debouncer.poll(now) {
            evaluations.push(text);
        }
        debouncer.schedule(text, now);
    }

    let last_edit = start + Duration::from_millis(200);
    assert_eq!(debouncer.poll(last_edit + Duration::from_millis(249)), None);
    if let Some(text) = debouncer.poll(last_edit + DEBOUNCE_DELAY) {
        evaluations.push(text);
    }

    assert_eq!(evaluations, vec!["<1>\n<2>"]);
    assert_eq!(run(evaluations[0], "").stack_pane().len(), 2);
}
