//! Opening a directory in the host's file browser

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};

/// Build the command that reveals `dir` on the platform named by `os`
/// (a value of [`std::env::consts::OS`]).
pub fn reveal_command(os: &str, dir: &Path) -> Command {
    let program = match os {
        "macos" => "open",
        "windows" => "explorer",
        _ => "xdg-open",
    };
    let mut command = Command::new(program);
    command.arg(dir);
    command
}

/// Open `dir` in the file browser of the current platform.
pub fn reveal_directory(dir: &Path) -> Result<()> {
    let os = std::env::consts::OS;
    let mut command = reveal_command(os, dir);
    let status = command
        .status()
        .with_context(|| format!("Failed to launch {:?}", command.get_program()))?;

    // explorer.exe reports a failure exit code even when the window opens.
    if !status.success() && os != "windows" {
        bail!("{:?} exited with {}", command.get_program(), status);
    }
    Ok(())
}
