//! Workbook and worksheet protection removal
//!
//! Removal is best-effort: a worksheet that cannot be cleared is reported as
//! a warning and skipped, and never aborts the conversion.

use std::fmt::Display;

use crate::pipeline::xlsx::{Workbook, Worksheet, XlsxError};
use crate::utils::print_warning;

/// A sheet whose protection can be inspected and cleared
pub trait Unprotect {
    type Error: Display;

    fn sheet_name(&self) -> &str;

    fn is_protected(&self) -> bool;

    /// Clear the protection flag, password references and every toggle.
    fn unprotect(&mut self) -> Result<(), Self::Error>;
}

impl Unprotect for Worksheet {
    type Error = XlsxError;

    fn sheet_name(&self) -> &str {
        self.name()
    }

    fn is_protected(&self) -> bool {
        self.protection().is_protected()
    }

    fn unprotect(&mut self) -> Result<(), XlsxError> {
        self.clear_protection()
    }
}

/// Outcome of a protection removal pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectionReport {
    /// The workbook-level security marker was present and removed.
    pub workbook_security_removed: bool,
    /// Worksheets that were protected and are now unprotected, in tab order.
    pub unprotected_sheets: Vec<String>,
    /// Worksheets that were protected but could not be cleared.
    pub failed_sheets: Vec<String>,
}

impl ProtectionReport {
    /// One-line summary of the worksheet results.
    pub fn summary_line(&self) -> String {
        if self.unprotected_sheets.is_empty() {
            "No protected worksheets found".to_string()
        } else {
            format!(
                "Removed protection from {} worksheet(s): {}",
                self.unprotected_sheets.len(),
                self.unprotected_sheets.join(", ")
            )
        }
    }
}

/// Clear protection on every protected sheet.
///
/// Returns `(unprotected, failed)` sheet names. Unprotected sheets are not
/// touched and appear in neither list.
pub fn unprotect_sheets<'a, S, I>(sheets: I) -> (Vec<String>, Vec<String>)
where
    S: Unprotect + 'a,
    I: IntoIterator<Item = &'a mut S>,
{
    let mut unprotected = Vec::new();
    let mut failed = Vec::new();

    for sheet in sheets {
        if !sheet.is_protected() {
            continue;
        }
        match sheet.unprotect() {
            Ok(()) => unprotected.push(sheet.sheet_name().to_string()),
            Err(e) => {
                print_warning(&format!(
                    "Could not fully remove protection from worksheet '{}': {}",
                    sheet.sheet_name(),
                    e
                ));
                failed.push(sheet.sheet_name().to_string());
            }
        }
    }

    (unprotected, failed)
}

/// Remove workbook security and worksheet protection from a loaded workbook.
pub fn remove_protection(workbook: &mut Workbook) -> ProtectionReport {
    let workbook_security_removed = match workbook.clear_security() {
        Ok(removed) => removed,
        Err(e) => {
            print_warning(&format!("Could not remove workbook security settings: {}", e));
            false
        }
    };

    for ws in workbook.worksheets() {
        if let Some(issue) = ws.protection_issue() {
            print_warning(&format!(
                "Could not read protection settings of worksheet '{}': {}",
                ws.name(),
                issue
            ));
        }
    }

    let (unprotected_sheets, failed_sheets) = unprotect_sheets(workbook.worksheets_mut());

    ProtectionReport {
        workbook_security_removed,
        unprotected_sheets,
        failed_sheets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSheet {
        name: &'static str,
        protected: bool,
        fails: bool,
    }

    impl Unprotect for FakeSheet {
        type Error = String;

        fn sheet_name(&self) -> &str {
            self.name
        }

        fn is_protected(&self) -> bool {
            self.protected
        }

        fn unprotect(&mut self) -> Result<(), String> {
            if self.fails {
                return Err("part is corrupt".to_string());
            }
            self.protected = false;
            Ok(())
        }
    }

    fn sheet(name: &'static str, protected: bool, fails: bool) -> FakeSheet {
        FakeSheet {
            name,
            protected,
            fails,
        }
    }

    #[test]
    fn test_only_protected_sheets_are_counted() {
        let mut sheets = vec![
            sheet("Q1", true, false),
            sheet("Q2", false, false),
            sheet("Q3", true, false),
        ];

        let (unprotected, failed) = unprotect_sheets(&mut sheets);

        assert_eq!(unprotected, vec!["Q1", "Q3"]);
        assert!(failed.is_empty());
        assert!(sheets.iter().all(|s| !s.protected));
    }

    #[test]
    fn test_failure_on_one_sheet_does_not_stop_the_rest() {
        let mut sheets = vec![
            sheet("Broken", true, true),
            sheet("Fine", true, false),
        ];

        let (unprotected, failed) = unprotect_sheets(&mut sheets);

        assert_eq!(unprotected, vec!["Fine"]);
        assert_eq!(failed, vec!["Broken"]);
        assert!(sheets[0].protected, "failed sheet keeps its state");
    }

    #[test]
    fn test_summary_line() {
        let mut report = ProtectionReport::default();
        assert_eq!(report.summary_line(), "No protected worksheets found");

        report.unprotected_sheets = vec!["Q1".to_string(), "Q 2".to_string()];
        assert_eq!(
            report.summary_line(),
            "Removed protection from 2 worksheet(s): Q1, Q 2"
        );
    }
}
