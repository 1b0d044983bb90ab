//! xlsm2xlsx: interactive XLSM to XLSX converter
//!
//! Lists the `.xlsm` files in `./src`, converts the chosen one into
//! `./converted/<timestamp>/` and strips its protection.

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::Parser;

use xlsm2xlsx::cli::{
    acknowledge_exit, reveal_directory, run_session, Cli, InterruptFlag, Prompt, Prompter,
    TerminalPrompter,
};
use xlsm2xlsx::pipeline::Layout;
use xlsm2xlsx::utils::{print_banner, print_error, print_warning};

fn main() -> Result<()> {
    let _cli = Cli::parse();

    print_banner(env!("CARGO_PKG_VERSION"));

    let interrupt = InterruptFlag::new();
    if let Err(e) = interrupt.install_ctrlc() {
        print_warning(&format!("{:#}", e));
    }

    let layout = Layout::default();
    if console::user_attended() && io::stdin().is_terminal() {
        run(&mut TerminalPrompter::new(interrupt), &layout)
    } else {
        run(&mut Prompter::stdio(interrupt), &layout)
    }
}

fn run<P: Prompt>(prompter: &mut P, layout: &Layout) -> Result<()> {
    // Errors outside the conversion itself (unreadable source dir, broken
    // terminal) still end at the exit pause.
    if let Err(e) = run_session(prompter, layout, reveal_directory) {
        print_error(&format!("{:#}", e));
    }

    acknowledge_exit(prompter)
}
