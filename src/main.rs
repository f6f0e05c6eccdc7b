// stackwiz: two-pane Bitcoin/Liquid script editor with per-line stack snapshots

use std::fs;
use std::io;
use std::path::Path;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use stackwiz::config::{usage, Config, ConfigError};
use stackwiz::editor::presets::preset_for;
use stackwiz::editor::{editor_lines, evaluate, LineSnapshot};
use stackwiz::ui::App;
use stackwiz::vm::{ScriptMachine, TxTemplate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args();
    let program_name = args.next().unwrap_or_else(|| "stackwiz".to_string());

    let config = match Config::from_args(args) {
        Ok(config) => config,
        Err(ConfigError::HelpRequested) => {
            println!("{}", usage(&program_name));
            return Ok(());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            eprintln!("{}", usage(&program_name));
            std::process::exit(2);
        }
    };

    if config.check {
        simple_logger::init_with_level(log::Level::Info)?;
    }

    // Pane contents: files when given, otherwise the preset for the rule set
    let preset = preset_for(config.vm);
    let stack_text = match &config.stack_file {
        Some(path) => read_source(path),
        None => preset.stack_elements.to_string(),
    };
    let witness_text = match &config.witness_file {
        Some(path) => read_source(path),
        None if config.stack_file.is_some() => String::new(),
        None => preset.witness_script.to_string(),
    };

    let tx_template = match &config.tx_path {
        Some(path) => match TxTemplate::from_json(&read_source(path)) {
            Ok(tx) => {
                log::info!("loaded transaction template from {}", path.display());
                Some(tx)
            }
            Err(e) => {
                eprintln!("Error: {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => None,
    };

    let mut vm = ScriptMachine::new(config.vm);
    log::info!("script rules: {}", config.vm);

    if config.check {
        return run_check(&mut vm, &stack_text, &witness_text, tx_template.as_ref());
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create and run app
    let mut app = App::new(vm, &stack_text, &witness_text, tx_template);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn read_source(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

/// Evaluate both panes once and print every line's stack
fn run_check(
    vm: &mut ScriptMachine,
    stack_text: &str,
    witness_text: &str,
    tx: Option<&TxTemplate>,
) -> Result<(), Box<dyn std::error::Error>> {
    let stack_lines = editor_lines(stack_text);
    let witness_lines = editor_lines(witness_text);
    let evaluation = evaluate(vm, &stack_lines, &witness_lines, tx);

    for (index, line) in stack_lines.iter().chain(&witness_lines).enumerate() {
        if index == evaluation.boundary {
            println!("----");
        }
        match evaluation.snapshots.get(index) {
            Some(LineSnapshot::Stack(stack)) => {
                let items: Vec<String> = stack.iter().map(|d| d.display_value()).collect();
                println!("{:>4} {:<32} [{}]", index + 1, line, items.join(", "));
            }
            Some(LineSnapshot::Blank) => println!("{:>4}", index + 1),
            None => break,
        }
    }

    println!("bytecode: {}", evaluation.bytecode());

    if let Some(failure) = &evaluation.failure {
        eprintln!("Error at line {}: {}", failure.line, failure.message);
        std::process::exit(1);
    }
    Ok(())
}
