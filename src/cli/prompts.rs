//! Interactive prompts
//!
//! On a terminal, prompts go through dialoguer. When input is piped, or in
//! tests, [`Prompter`] reads whole lines instead. Both report end of input
//! (Ctrl-D, or Ctrl-Z then Enter on Windows) and Ctrl-C as
//! [`Reply::Interrupted`], which callers treat as a cancellation.

use std::fmt::Display;
use std::io::{self, BufRead, BufReader, Stdout, Write};

use anyhow::{Context, Result};
use console::{style, Term};
use dialoguer::{Confirm, Input};

use super::interrupt::{InterruptFlag, InterruptibleLines};

/// Answer to a single prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A line of input with the trailing newline removed.
    Line(String),
    /// Input ended or the read was interrupted.
    Interrupted,
}

/// The questions a session asks
pub trait Prompt {
    /// Write one line of output.
    fn say(&mut self, line: impl Display) -> Result<()>;

    /// Show `prompt` and block until a line is entered.
    fn ask(&mut self, prompt: &str) -> Result<Reply>;

    /// Ask a yes/no question that defaults to "no".
    ///
    /// Returns `None` when the prompt was interrupted.
    fn confirm(&mut self, question: &str) -> Result<Option<bool>> {
        match self.ask(&format!("{} (y/N): ", question))? {
            Reply::Line(answer) => Ok(Some(is_affirmative(&answer))),
            Reply::Interrupted => Ok(None),
        }
    }
}

/// Source of input lines for [`Prompter`].
///
/// Unlike [`BufRead::read_line`], an `ErrorKind::Interrupted` error is
/// returned to the caller rather than retried.
pub trait ReadLine {
    fn read_line_into(&mut self, buf: &mut String) -> io::Result<usize>;
}

impl<T: BufRead> ReadLine for T {
    fn read_line_into(&mut self, buf: &mut String) -> io::Result<usize> {
        self.read_line(buf)
    }
}

/// Reads answers line by line from `input` and writes prompts to `output`
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<InterruptibleLines, Stdout> {
    /// Prompter bound to the process's standard input and output, cancelled
    /// by `interrupt`.
    pub fn stdio(interrupt: InterruptFlag) -> Self {
        let stdin = InterruptibleLines::spawn(BufReader::new(io::stdin()), interrupt);
        Prompter::new(stdin, io::stdout())
    }
}

impl<R: ReadLine, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Writer the prompts go to, for callers that render their own output.
    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: ReadLine, W: Write> Prompt for Prompter<R, W> {
    fn say(&mut self, line: impl Display) -> Result<()> {
        writeln!(self.output, "{}", line).context("Failed to write to terminal")
    }

    fn ask(&mut self, prompt: &str) -> Result<Reply> {
        write!(self.output, "{}", style(prompt).bold()).context("Failed to write to terminal")?;
        self.output.flush().context("Failed to write to terminal")?;

        let mut line = String::new();
        match self.input.read_line_into(&mut line) {
            Ok(0) => Ok(Reply::Interrupted),
            Ok(_) => Ok(Reply::Line(
                line.trim_end_matches(['\r', '\n']).to_string(),
            )),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(Reply::Interrupted),
            Err(e) => Err(e).context("Failed to read from terminal"),
        }
    }
}

/// Prompts on an interactive terminal, backed by dialoguer
pub struct TerminalPrompter {
    term: Term,
    interrupt: InterruptFlag,
}

impl TerminalPrompter {
    pub fn new(interrupt: InterruptFlag) -> Self {
        Self {
            term: Term::stdout(),
            interrupt,
        }
    }
}

impl Prompt for TerminalPrompter {
    fn say(&mut self, line: impl Display) -> Result<()> {
        self.term
            .write_line(&line.to_string())
            .context("Failed to write to terminal")
    }

    fn ask(&mut self, prompt: &str) -> Result<Reply> {
        if self.interrupt.take() {
            return Ok(Reply::Interrupted);
        }
        // dialoguer appends its own ": " after the prompt.
        let answer = Input::<String>::new()
            .with_prompt(prompt.trim_end().trim_end_matches(':'))
            .allow_empty(true)
            .interact_text_on(&self.term);
        self.interrupt.take();
        Ok(match unless_interrupted(answer)? {
            Some(line) => Reply::Line(line),
            None => Reply::Interrupted,
        })
    }

    fn confirm(&mut self, question: &str) -> Result<Option<bool>> {
        if self.interrupt.take() {
            return Ok(None);
        }
        let answer = Confirm::new()
            .with_prompt(question.trim())
            .default(false)
            .wait_for_newline(true)
            .interact_on(&self.term);
        self.interrupt.take();
        unless_interrupted(answer)
    }
}

/// `None` when dialoguer gave up because Ctrl-C was pressed.
fn unless_interrupted<T>(answer: dialoguer::Result<T>) -> Result<Option<T>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e).context("Failed to read from terminal"),
    }
}

/// Only `y` and `yes` (any case, surrounding whitespace ignored) mean yes.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
