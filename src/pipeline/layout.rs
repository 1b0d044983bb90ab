//! Fixed directory layout the converter reads from and writes to

use std::path::{Path, PathBuf};

/// Directory scanned for `.xlsm` inputs, relative to the working directory.
pub const SOURCE_DIR: &str = "src";

/// Root under which each run creates its timestamped output directory.
pub const OUTPUT_ROOT: &str = "converted";

/// Where inputs are found and outputs are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub source_dir: PathBuf,
    pub output_root: PathBuf,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(SOURCE_DIR),
            output_root: PathBuf::from(OUTPUT_ROOT),
        }
    }
}

impl Layout {
    /// The standard layout placed under `root` instead of the working directory.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            source_dir: root.join(SOURCE_DIR),
            output_root: root.join(OUTPUT_ROOT),
        }
    }
}
