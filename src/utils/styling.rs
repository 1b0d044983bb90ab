//! Terminal styling utilities for status, warning and error output

use console::{style, Emoji};

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[x] ");

const RULE_WIDTH: usize = 50;

/// Print the application banner
pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {} {}",
        style("Excel XLSM to XLSX Converter").cyan().bold(),
        style(format!("v{}", version)).dim()
    );
    println!("    {}", style("═".repeat(RULE_WIDTH)).dim());
    println!(
        "    {}",
        style("This tool converts XLSM files to XLSX and removes password protections").dim()
    );
    println!("    {}", style("═".repeat(RULE_WIDTH)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a warning to stderr
pub fn print_warning(message: &str) {
    eprintln!("    {}{}", WARNING, style(format!("Warning: {}", message)).yellow());
}

/// Print an error to stderr
pub fn print_error(message: &str) {
    eprintln!();
    eprintln!("    {}{}", CROSS, style(format!("ERROR: {}", message)).red().bold());
}

/// Print the fixed troubleshooting hints shown after a failed conversion
pub fn print_troubleshooting() {
    println!();
    println!("    {}", style("Troubleshooting tips:").yellow().bold());
    for hint in TROUBLESHOOTING_HINTS {
        println!("      {} {}", style("-").dim(), hint);
    }
}

/// Hints printed after a failed conversion
pub const TROUBLESHOOTING_HINTS: [&str; 3] = [
    "Ensure the XLSM file is not open in Excel",
    "Check file permissions",
    "Verify the file is not corrupted",
];

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!("    {}", style("═".repeat(RULE_WIDTH)).dim());
    println!(
        "    {} {}",
        ROCKET,
        style("CONVERSION COMPLETED SUCCESSFULLY!").green().bold()
    );
    println!("    {}", style("═".repeat(RULE_WIDTH)).dim());
}

/// Print the path of a directory the user may want to open by hand
pub fn print_manual_path(path: &std::path::Path) {
    println!("    {} Manual path: {}", FOLDER, style(path.display()).dim());
}
