//! xlsm2xlsx: XLSM to XLSX conversion library
//!
//! Converts macro-enabled Excel workbooks to plain XLSX, discarding the VBA
//! project and clearing worksheet and workbook protection along the way.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
