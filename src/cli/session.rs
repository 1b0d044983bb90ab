//! Interactive conversion session
//!
//! One run of the tool is a small state machine:
//!
//! ```text
//! Selecting -> Confirming -> Converting -> Success -> OpeningOutput -> Done
//!                                       \-> Failed ----------------/
//! ```
//!
//! Any state may jump straight to `Done`: nothing selected, confirmation
//! declined, or input interrupted. The final "press Enter" pause happens after
//! `Done` and is handled by [`acknowledge_exit`].

use std::path::{Path, PathBuf};

use anyhow::Result;
use console::style;

use super::prompts::{Prompt, Reply};
use super::selector::{select_file, Selection};
use crate::pipeline::{convert_xlsm_to_xlsx, list_xlsm_files, prepare_source_dir, Layout};
use crate::report::ConversionSummary;
use crate::utils::{
    print_completion, print_error, print_manual_path, print_troubleshooting, print_warning,
};

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// No candidate files, or the user quit the menu.
    NothingSelected,
    /// The user declined the conversion.
    Cancelled,
    /// Ctrl-C or end of input before a conversion was attempted.
    Interrupted,
    /// A converted workbook was written here.
    Converted(PathBuf),
    /// Conversion failed with this message.
    Failed(String),
}

#[derive(Debug)]
enum State {
    Selecting,
    Confirming(PathBuf),
    Converting(PathBuf),
    Success(PathBuf),
    OpeningOutput(PathBuf),
    Done(SessionOutcome),
}

/// Run one selection-to-conversion session.
///
/// `reveal` opens a directory in the file browser; its failure is reported
/// and otherwise ignored.
pub fn run_session<P, F>(prompter: &mut P, layout: &Layout, mut reveal: F) -> Result<SessionOutcome>
where
    P: Prompt,
    F: FnMut(&Path) -> Result<()>,
{
    let mut state = State::Selecting;

    loop {
        state = match state {
            State::Selecting => select(prompter, layout)?,

            State::Confirming(input) => {
                prompter.say("")?;
                prompter.say(format!(
                    "    Selected file: {}",
                    style(display_name(&input)).cyan().bold()
                ))?;
                match prompter.confirm("    Proceed with conversion?")? {
                    Some(true) => State::Converting(input),
                    Some(false) => {
                        prompter.say("    Conversion cancelled.")?;
                        State::Done(SessionOutcome::Cancelled)
                    }
                    None => interrupted(prompter, SessionOutcome::Interrupted)?,
                }
            }

            State::Converting(input) => match convert_xlsm_to_xlsx(&input, layout) {
                Ok(conversion) => {
                    let summary = ConversionSummary {
                        input,
                        output: conversion.output_path.clone(),
                        output_size_bytes: output_size(&conversion.output_path),
                        protection: conversion.report,
                    };
                    print_completion();
                    prompter.say(summary.render())?;
                    State::Success(conversion.output_path)
                }
                Err(e) => {
                    print_error(&e.to_string());
                    print_troubleshooting();
                    State::Done(SessionOutcome::Failed(e.to_string()))
                }
            },

            State::Success(output) => {
                prompter.say("")?;
                match prompter.confirm("    Open output directory?")? {
                    Some(true) => State::OpeningOutput(output),
                    Some(false) => State::Done(SessionOutcome::Converted(output)),
                    None => interrupted(prompter, SessionOutcome::Converted(output))?,
                }
            }

            State::OpeningOutput(output) => {
                let dir = output
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                match reveal(&dir) {
                    Ok(()) => prompter.say(format!("    Opened: {}", dir.display()))?,
                    Err(e) => {
                        prompter.say(format!(
                            "    {}",
                            style(format!("Could not open directory: {:#}", e)).yellow()
                        ))?;
                        print_manual_path(&dir);
                    }
                }
                State::Done(SessionOutcome::Converted(output))
            }

            State::Done(outcome) => return Ok(outcome),
        };
    }
}

/// Block on the final "press Enter" pause before the process exits.
pub fn acknowledge_exit<P: Prompt>(prompter: &mut P) -> Result<()> {
    prompter.say("")?;
    if let Reply::Interrupted = prompter.ask("Press Enter to exit...")? {
        prompter.say("")?;
    }
    Ok(())
}

fn select<P: Prompt>(prompter: &mut P, layout: &Layout) -> Result<State> {
    if prepare_source_dir(&layout.source_dir)? {
        prompter.say(format!(
            "    Created '{}' directory. Please place your XLSM files there and run again.",
            layout.source_dir.display()
        ))?;
        return nothing_selected(prompter);
    }

    let candidates = list_xlsm_files(&layout.source_dir)?;
    match select_file(prompter, &layout.source_dir, &candidates)? {
        Selection::Chosen(path) => Ok(State::Confirming(path)),
        Selection::None => nothing_selected(prompter),
    }
}

fn nothing_selected<P: Prompt>(prompter: &mut P) -> Result<State> {
    prompter.say("    No file selected or no files available. Exiting...")?;
    Ok(State::Done(SessionOutcome::NothingSelected))
}

fn interrupted<P: Prompt>(prompter: &mut P, outcome: SessionOutcome) -> Result<State> {
    prompter.say("")?;
    prompter.say("    Operation cancelled by user.")?;
    Ok(State::Done(outcome))
}

/// Size of the written file, or `None` with a warning when it cannot be read.
fn output_size(path: &Path) -> Option<u64> {
    match std::fs::metadata(path) {
        Ok(metadata) => Some(metadata.len()),
        Err(e) => {
            print_warning(&format!(
                "Could not read the size of {}: {}",
                path.display(),
                e
            ));
            None
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
