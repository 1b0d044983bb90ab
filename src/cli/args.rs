//! Command-line argument definitions using clap

use clap::Parser;

/// XLSM to XLSX Converter - convert macro-enabled workbooks to plain XLSX
/// and remove worksheet and workbook protection
///
/// Place `.xlsm` files in the `src` folder next to where the tool is run, then
/// pick one from the menu. Converted files are written to
/// `converted/<YYYYMMDD_HHMMSS>/`.
#[derive(Parser, Debug)]
#[command(name = "xlsm2xlsx")]
#[command(author, version, about, long_about = None)]
pub struct Cli {}
