//! Ctrl-C handling for the interactive prompts
//!
//! The signal handler only raises an [`InterruptFlag`]. Prompts poll the flag
//! while they wait for input, so an interrupt cancels the prompt in progress
//! and the session still reaches its exit pause.

use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};

use super::prompts::ReadLine;

/// How often a waiting prompt checks for Ctrl-C.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Shared "Ctrl-C was pressed" flag
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Consume a pending interrupt. Returns whether one was pending.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }

    /// Route Ctrl-C (SIGINT, or the console control event on Windows) to
    /// this flag instead of terminating the process.
    pub fn install_ctrlc(&self) -> Result<()> {
        let flag = self.clone();
        ctrlc::set_handler(move || flag.raise()).context("Failed to install Ctrl-C handler")
    }
}

/// Lines from a blocking reader, delivered so that waiting can be cut short
/// by an [`InterruptFlag`].
///
/// A background thread owns the reader and forwards each line over a
/// channel. The thread ends at end of input or on a read error.
pub struct InterruptibleLines {
    lines: Receiver<io::Result<String>>,
    interrupt: InterruptFlag,
}

impl InterruptibleLines {
    pub fn spawn<R>(mut reader: R, interrupt: InterruptFlag) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || loop {
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {
                    if tx.send(Ok(line)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e));
                    break;
                }
            }
        });

        Self {
            lines: rx,
            interrupt,
        }
    }
}

impl ReadLine for InterruptibleLines {
    fn read_line_into(&mut self, buf: &mut String) -> io::Result<usize> {
        loop {
            if self.interrupt.take() {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "interrupted by Ctrl-C"));
            }
            match self.lines.recv_timeout(POLL_INTERVAL) {
                Ok(Ok(line)) => {
                    buf.push_str(&line);
                    return Ok(line.len());
                }
                Ok(Err(e)) => return Err(e),
                Err(RecvTimeoutError::Disconnected) => return Ok(0),
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
    }
}
