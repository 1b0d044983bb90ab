//! Error types for the OOXML workbook package layer.
//!
//! Every failure while reading, patching or writing a workbook package is
//! reported as an [`XlsxError`]. The converter wraps these into a single
//! user-facing message, so variants carry enough context (part names, causes)
//! to be useful on their own.

use thiserror::Error;

/// Errors that can occur while loading, editing or saving a workbook package.
#[derive(Error, Debug)]
pub enum XlsxError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a readable zip archive.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An XML part could not be parsed or re-serialized.
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An XML attribute was malformed.
    #[error("xml attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    /// A part the workbook cannot work without is absent from the package.
    #[error("missing xlsx part: {0}")]
    MissingPart(String),

    /// The file is an OLE compound document, i.e. a workbook encrypted with
    /// a password-to-open. These are never decrypted.
    #[error("workbook is encrypted with a password to open and cannot be converted")]
    Encrypted,

    /// The package is structurally wrong in a way the tool cannot repair.
    #[error("invalid xlsx: {0}")]
    Invalid(String),

    /// A worksheet part could not be processed.
    #[error("worksheet '{sheet}': {source}")]
    Worksheet {
        /// Display name of the worksheet
        sheet: String,
        /// Underlying failure
        #[source]
        source: Box<XlsxError>,
    },
}

impl XlsxError {
    /// Attach the worksheet name to an error raised while processing its part.
    pub fn in_sheet(self, sheet: &str) -> Self {
        XlsxError::Worksheet {
            sheet: sheet.to_string(),
            source: Box::new(self),
        }
    }
}
