//! XLSM to XLSX conversion
//!
//! Loads the workbook with its VBA project discarded, removes protection,
//! and saves it as a plain workbook under a timestamped output directory.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::pipeline::layout::Layout;
use crate::pipeline::unprotect::{remove_protection, ProtectionReport};
use crate::pipeline::xlsx::{LoadOptions, Workbook, XlsxError};
use crate::utils::{create_spinner, finish_with_success, print_info, print_success};

/// Extension given to converted workbooks.
pub const XLSX_EXTENSION: &str = "xlsx";

/// Timestamp format of the per-run output directory, e.g. `20240115_143022`.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Any failure while loading or saving a workbook.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Error converting file: {0}")]
    Workbook(#[from] XlsxError),

    #[error("Error converting file: could not create {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A finished conversion
#[derive(Debug, Clone)]
pub struct Conversion {
    pub output_path: PathBuf,
    pub report: ProtectionReport,
}

/// Name of the output directory for a run started at `now`.
pub fn timestamp_dir_name(now: DateTime<Local>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// `<output_root>/<timestamp>` for a run started at `now`.
pub fn output_dir_for(layout: &Layout, now: DateTime<Local>) -> PathBuf {
    layout.output_root.join(timestamp_dir_name(now))
}

/// Output file name: the input stem, exactly, with an `.xlsx` extension.
///
/// Only the final extension is replaced, so `q1.final.xlsm` becomes
/// `q1.final.xlsx`.
pub fn output_file_name(input: &Path) -> OsString {
    let mut name = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".");
    name.push(XLSX_EXTENSION);
    name
}

/// Convert `input` into `<output_root>/<now>/<stem>.xlsx`.
pub fn convert_xlsm_to_xlsx(input: &Path, layout: &Layout) -> Result<Conversion, ConvertError> {
    convert_xlsm_to_xlsx_at(input, layout, Local::now())
}

/// [`convert_xlsm_to_xlsx`] with an explicit run timestamp.
///
/// Two runs within the same second share an output directory, and the later
/// one overwrites a same-named file from the earlier one.
pub fn convert_xlsm_to_xlsx_at(
    input: &Path,
    layout: &Layout,
    now: DateTime<Local>,
) -> Result<Conversion, ConvertError> {
    let display_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());

    println!();
    let spinner = create_spinner(&format!("Loading workbook: {}", display_name));
    let mut workbook = match Workbook::open(input, LoadOptions { keep_vba: false }) {
        Ok(workbook) => workbook,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };
    finish_with_success(&spinner, &format!("Loaded workbook: {}", display_name));

    if !workbook.removed_vba_parts().is_empty() {
        print_info(&format!(
            "Discarded {} VBA part(s)",
            workbook.removed_vba_parts().len()
        ));
    }

    let report = remove_protection(&mut workbook);
    if report.workbook_security_removed {
        print_success("Removed workbook security settings");
    }
    if report.unprotected_sheets.is_empty() {
        print_info(&report.summary_line());
    } else {
        print_success(&report.summary_line());
    }

    let output_dir = output_dir_for(layout, now);
    std::fs::create_dir_all(&output_dir).map_err(|source| ConvertError::OutputDir {
        path: output_dir.clone(),
        source,
    })?;
    let output_path = output_dir.join(output_file_name(input));

    let spinner = create_spinner(&format!("Saving converted file: {}", output_path.display()));
    if let Err(e) = workbook.save(&output_path) {
        spinner.finish_and_clear();
        return Err(e.into());
    }
    finish_with_success(&spinner, &format!("Saved converted file: {}", output_path.display()));

    Ok(Conversion {
        output_path,
        report,
    })
}
