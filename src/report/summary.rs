//! Conversion summary report

use std::path::PathBuf;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};

use crate::pipeline::ProtectionReport;

/// Summary of a completed conversion
#[derive(Debug, Clone)]
pub struct ConversionSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    /// `None` when the written file could not be inspected.
    pub output_size_bytes: Option<u64>,
    pub protection: ProtectionReport,
}

impl ConversionSummary {
    pub fn output_size_kib(&self) -> Option<f64> {
        self.output_size_bytes.map(|bytes| bytes as f64 / 1024.0)
    }

    /// Render the summary table, indented for the terminal.
    pub fn render(&self) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![Cell::new("Input:"), Cell::new(self.input.display())]);
        table.add_row(vec![
            Cell::new("Output:"),
            Cell::new(self.output.display())
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("Size:"),
            Cell::new(match self.output_size_kib() {
                Some(kib) => format!("{:.1} KB", kib),
                None => "unknown".to_string(),
            }),
        ]);

        let sheets = if self.protection.unprotected_sheets.is_empty() {
            "none".to_string()
        } else {
            self.protection.unprotected_sheets.join(", ")
        };
        table.add_row(vec![Cell::new("Unprotected sheets:"), Cell::new(sheets)]);

        if self.protection.workbook_security_removed {
            table.add_row(vec![
                Cell::new("Workbook security:"),
                Cell::new("removed").fg(Color::Green),
            ]);
        }

        if !self.protection.failed_sheets.is_empty() {
            table.add_row(vec![
                Cell::new("Still protected:"),
                Cell::new(self.protection.failed_sheets.join(", ")).fg(Color::Red),
            ]);
        }

        table
            .to_string()
            .lines()
            .map(|line| format!("    {}", line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
