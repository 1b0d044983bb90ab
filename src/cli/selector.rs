//! Numbered file selection menu

use std::path::{Path, PathBuf};

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Table};
use console::style;

use super::prompts::{Prompt, Reply};
use crate::pipeline::XlsmCandidate;

/// Token that leaves the menu without choosing a file.
pub const QUIT_TOKEN: &str = "q";

/// Result of the selection menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Chosen(PathBuf),
    /// Quit, interrupted, or nothing to choose from.
    None,
}

/// Interpretation of one line typed at the menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// Zero-based index into the candidate list.
    Index(usize),
    Quit,
    /// Rejected input, with the message to show before re-prompting.
    Invalid(String),
}

/// Parse a menu answer against `count` candidates.
pub fn parse_choice(input: &str, count: usize) -> Choice {
    let input = input.trim().to_lowercase();
    if input == QUIT_TOKEN {
        return Choice::Quit;
    }

    let digits = input
        .strip_prefix(&['+', '-'][..])
        .unwrap_or(input.as_str());
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Choice::Invalid("Please enter a valid number or 'q' to quit".to_string());
    }
    // Any integer is a number, however large; only the range is wrong.
    match input.strip_prefix('+').unwrap_or(input.as_str()).parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Choice::Index(n - 1),
        _ => Choice::Invalid(format!("Please enter a number between 1 and {}", count)),
    }
}

/// Render the candidates as a numbered table.
pub fn render_menu(candidates: &[XlsmCandidate]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("File").add_attribute(Attribute::Bold),
        Cell::new("Size").add_attribute(Attribute::Bold),
        Cell::new("Modified").add_attribute(Attribute::Bold),
    ]);

    for (i, candidate) in candidates.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1).set_alignment(CellAlignment::Right),
            Cell::new(candidate.file_name()),
            Cell::new(format!("{:.1} KB", candidate.size_kib())).set_alignment(CellAlignment::Right),
            Cell::new(candidate.modified.format("%Y-%m-%d %H:%M")),
        ]);
    }

    table
        .to_string()
        .lines()
        .map(|line| format!("    {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Show the menu and read until a file is chosen or the user quits.
pub fn select_file<P: Prompt>(
    prompter: &mut P,
    source_dir: &Path,
    candidates: &[XlsmCandidate],
) -> Result<Selection> {
    if candidates.is_empty() {
        prompter.say(format!(
            "    No XLSM files found in '{}' directory.",
            source_dir.display()
        ))?;
        prompter.say(format!(
            "    Please place your XLSM files in the '{}' folder and run again.",
            source_dir.display()
        ))?;
        return Ok(Selection::None);
    }

    prompter.say("")?;
    prompter.say(format!(
        "    Found {} XLSM file(s) in '{}':",
        style(candidates.len()).yellow().bold(),
        source_dir.display()
    ))?;
    prompter.say(render_menu(candidates))?;

    let prompt = format!(
        "    Select file (1-{}) or '{}' to quit: ",
        candidates.len(),
        QUIT_TOKEN
    );
    loop {
        let answer = match prompter.ask(&prompt)? {
            Reply::Line(answer) => answer,
            Reply::Interrupted => {
                prompter.say("")?;
                prompter.say("    Operation cancelled.")?;
                return Ok(Selection::None);
            }
        };

        match parse_choice(&answer, candidates.len()) {
            Choice::Index(i) => return Ok(Selection::Chosen(candidates[i].path.clone())),
            Choice::Quit => return Ok(Selection::None),
            Choice::Invalid(message) => {
                prompter.say(format!("    {}", style(message).yellow()))?;
            }
        }
    }
}
