//! Zip container reading and writing for OOXML packages.

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;

use super::error::XlsxError;
use super::relationships::normalize_part_name;

/// Name of the package content-types part.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Workbook main content type of a macro-free `.xlsx` package.
pub const CT_WORKBOOK_PLAIN: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
/// Workbook main content type of a macro-enabled `.xlsm` package.
pub const CT_WORKBOOK_MACRO_ENABLED: &str = "application/vnd.ms-excel.sheet.macroEnabled.main+xml";
/// Content type of `xl/vbaProject.bin`.
pub const CT_VBA_PROJECT: &str = "application/vnd.ms-office.vbaProject";
/// Content type Excel gives `.bin` parts of a macro-free package.
pub const CT_PRINTER_SETTINGS: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.printerSettings";

/// Leading bytes of an OLE compound file. Encrypted OOXML workbooks are
/// wrapped in one of these instead of a zip archive.
const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// One entry of the package, named as it appears in the archive.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub name: String,
    pub data: Vec<u8>,
}

/// Read every file entry of a zip package, preserving archive order.
pub fn read_parts(bytes: Vec<u8>) -> Result<Vec<Part>, XlsxError> {
    if bytes.starts_with(&OLE_MAGIC) {
        return Err(XlsxError::Encrypted);
    }

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut parts = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().to_string();
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        parts.push(Part { name, data });
    }

    Ok(parts)
}

/// Serialize parts into a deflate-compressed zip package.
pub fn write_parts<'a, I>(parts: I) -> Result<Vec<u8>, XlsxError>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let cursor = Cursor::new(Vec::new());
    let mut zip = zip::ZipWriter::new(cursor);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, bytes) in parts {
        zip.start_file(name, options)?;
        zip.write_all(bytes)?;
    }

    Ok(zip.finish()?.into_inner())
}

/// Find a part by name, ignoring a leading slash, separator style and ASCII case.
pub fn find_part<'a>(parts: &'a [Part], name: &str) -> Option<&'a Part> {
    let wanted = normalize_part_name(name);
    parts
        .iter()
        .find(|p| normalize_part_name(&p.name).eq_ignore_ascii_case(&wanted))
}

/// Mutable counterpart of [`find_part`].
pub fn find_part_mut<'a>(parts: &'a mut [Part], name: &str) -> Option<&'a mut Part> {
    let wanted = normalize_part_name(name);
    parts
        .iter_mut()
        .find(|p| normalize_part_name(&p.name).eq_ignore_ascii_case(&wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_preserves_order_and_bytes() {
        let bytes = write_parts([
            ("[Content_Types].xml", b"<Types/>".as_slice()),
            ("xl/workbook.xml", b"<workbook/>".as_slice()),
        ])
        .unwrap();

        let parts = read_parts(bytes).unwrap();
        let names: Vec<&str> = parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["[Content_Types].xml", "xl/workbook.xml"]);
        assert_eq!(parts[1].data, b"<workbook/>");
    }

    #[test]
    fn test_ole_container_is_reported_as_encrypted() {
        let mut bytes = OLE_MAGIC.to_vec();
        bytes.extend_from_slice(&[0u8; 504]);
        assert!(matches!(read_parts(bytes), Err(XlsxError::Encrypted)));
    }

    #[test]
    fn test_garbage_is_a_zip_error() {
        let err = read_parts(b"definitely not a zip".to_vec()).unwrap_err();
        assert!(matches!(err, XlsxError::Zip(_)));
    }

    #[test]
    fn test_find_part_is_lenient() {
        let parts = vec![Part {
            name: "/XL/Workbook.xml".to_string(),
            data: Vec::new(),
        }];
        assert!(find_part(&parts, "xl/workbook.xml").is_some());
        assert!(find_part(&parts, "xl/styles.xml").is_none());
    }
}
