//! # Introduction
//!
//! stackwiz is a terminal editor for Bitcoin and Liquid scripts. The left
//! column holds two editors: one for push-only stack elements, one for the
//! witness script. Every line is run through a script VM and the stack after
//! that line is shown beside it.
//!
//! ## Evaluation pipeline
//!
//! ```text
//! Pane text → editor lines → input parser → VM → per-line snapshots → TUI
//! ```
//!
//! 1. [`language`]: tokenizer, editing rules, completion and hover tables.
//! 2. [`editor`]: text buffers, line extraction, input parsing, the
//!    evaluation pipeline and the 250 ms edit debouncer.
//! 3. [`vm`]: the script machine: opcode tables per network and script
//!    version, stack data, transaction templates and compilation.
//! 4. [`ui`]: ratatui-based TUI; not part of the stable library API.
//! 5. [`config`]: command-line options.

pub mod config;
pub mod editor;
pub mod language;
pub mod ui;
pub mod vm;
