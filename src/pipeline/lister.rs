//! Source directory scanning for XLSM candidates

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

/// Extension of the macro-enabled workbooks this tool accepts.
pub const XLSM_EXTENSION: &str = "xlsm";

/// A convertible file found in the source directory
#[derive(Debug, Clone, PartialEq)]
pub struct XlsmCandidate {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: DateTime<Local>,
}

impl XlsmCandidate {
    /// File name for display, falling back to the full path.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Size in KiB, as shown in the selection menu.
    pub fn size_kib(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

/// Ensure the source directory exists.
///
/// Returns `true` when the directory had to be created, meaning this is a
/// first run and there can be nothing to convert yet.
pub fn prepare_source_dir(source_dir: &Path) -> Result<bool> {
    if source_dir.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(source_dir)
        .with_context(|| format!("Failed to create directory: {}", source_dir.display()))?;
    Ok(true)
}

/// List `.xlsm` files directly inside `source_dir`, sorted by file name.
///
/// A missing directory is created and yields an empty list.
pub fn list_xlsm_files(source_dir: &Path) -> Result<Vec<XlsmCandidate>> {
    if prepare_source_dir(source_dir)? {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(source_dir)
        .with_context(|| format!("Failed to read directory: {}", source_dir.display()))?;

    let mut candidates = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !is_xlsm_file(&path) {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata
            .modified()
            .map(DateTime::<Local>::from)
            .unwrap_or_else(|_| Local::now());
        candidates.push(XlsmCandidate {
            path,
            size_bytes: metadata.len(),
            modified,
        });
    }

    candidates.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(candidates)
}

fn is_xlsm_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(XLSM_EXTENSION))
        .unwrap_or(false)
}
