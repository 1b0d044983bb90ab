//! Minimal OOXML workbook package layer.
//!
//! This module loads an `.xlsm`/`.xlsx` package, exposes the parts the
//! converter needs to edit, and writes the package back out. Only the
//! workbook part, the worksheet parts and the package bookkeeping parts
//! are ever interpreted; every other part is copied through byte-for-byte.
//!
//! # Module Structure
//!
//! - `error` - Error types for package failures
//! - `package` - Zip container reading/writing and content-type constants
//! - `relationships` - `.rels` parsing and part-name resolution
//! - `protection` - Sheet and workbook protection records and XML patching
//! - `vba` - VBA project and macro sheet removal
//! - `xml` - Streaming XML edit helpers

pub mod error;
pub mod package;
pub mod protection;
pub mod relationships;
pub mod vba;
pub mod xml;

pub use error::XlsxError;
pub use protection::{SheetProtection, WorkbookProtection};

use std::path::Path;

use self::package::{find_part, find_part_mut, read_parts, write_parts, Part};
use self::protection::{rewrite_sheet_protection, strip_workbook_protection};
use self::relationships::{
    parse_relationships, rels_part_for, resolve_target, REL_OFFICE_DOCUMENT, REL_WORKSHEET,
};
use self::xml::{attribute, for_each_element};

/// Fallback location of the workbook part when the package root
/// relationships do not name one.
const DEFAULT_WORKBOOK_PART: &str = "xl/workbook.xml";

/// Options controlling how a workbook is loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Keep the VBA project. When false (the default), macro content is
    /// discarded while loading, so the saved package is a plain workbook.
    pub keep_vba: bool,
}

/// A worksheet of a loaded workbook.
#[derive(Debug, Clone)]
pub struct Worksheet {
    name: String,
    part_name: String,
    xml: Vec<u8>,
    protection: SheetProtection,
    protection_issue: Option<String>,
}

impl Worksheet {
    fn from_part(name: String, part_name: String, xml: Vec<u8>) -> Result<Self, XlsxError> {
        let mut found = None;
        let mut protection_issue = None;
        for_each_element(&xml, protection::SHEET_PROTECTION, |e| {
            // An unreadable element still marks the sheet as protected so
            // that clearing rewrites it.
            found = Some(SheetProtection::from_element(e).unwrap_or_else(|err| {
                protection_issue = Some(err.to_string());
                SheetProtection {
                    sheet: true,
                    ..Default::default()
                }
            }));
            Ok(())
        })
        .map_err(|e| e.in_sheet(&name))?;

        Ok(Self {
            name,
            part_name,
            xml,
            protection: found.unwrap_or_default(),
            protection_issue,
        })
    }

    /// Sheet tab name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Archive entry that stores this worksheet.
    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    pub fn protection(&self) -> &SheetProtection {
        &self.protection
    }

    /// Why the `<sheetProtection>` element could not be read, if it could not.
    /// Such a sheet is reported as protected with unknown settings.
    pub fn protection_issue(&self) -> Option<&str> {
        self.protection_issue.as_deref()
    }

    /// Clear sheet protection, every toggle and any stored password.
    ///
    /// The worksheet part is patched immediately; on error the worksheet is
    /// left exactly as it was.
    pub fn clear_protection(&mut self) -> Result<(), XlsxError> {
        let cleared = self.protection.cleared();
        let (patched, _) =
            rewrite_sheet_protection(&self.xml, &cleared).map_err(|e| e.in_sheet(&self.name))?;
        self.xml = patched;
        self.protection = cleared;
        self.protection_issue = None;
        Ok(())
    }
}

/// An in-memory workbook package.
#[derive(Debug)]
pub struct Workbook {
    /// Every archive entry in order. Worksheet entries are kept empty here;
    /// their current content lives in the matching [`Worksheet`].
    parts: Vec<Part>,
    workbook_part: String,
    worksheets: Vec<Worksheet>,
    security: Option<WorkbookProtection>,
    removed_vba_parts: Vec<String>,
}

impl Workbook {
    /// Load a workbook package from disk.
    pub fn open(path: impl AsRef<Path>, options: LoadOptions) -> Result<Self, XlsxError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(bytes, options)
    }

    /// Load a workbook package from memory.
    pub fn from_bytes(bytes: Vec<u8>, options: LoadOptions) -> Result<Self, XlsxError> {
        let mut parts = read_parts(bytes)?;
        let workbook_part = locate_workbook_part(&parts)?;

        let removed_vba_parts = if options.keep_vba {
            Vec::new()
        } else {
            vba::strip_vba(&mut parts, &workbook_part)?
        };

        let workbook_xml = find_part(&parts, &workbook_part)
            .ok_or_else(|| XlsxError::MissingPart(workbook_part.clone()))?
            .data
            .clone();

        let mut security = None;
        for_each_element(&workbook_xml, protection::WORKBOOK_PROTECTION, |e| {
            security = Some(WorkbookProtection::from_element(e)?);
            Ok(())
        })?;

        let sheet_refs = read_sheet_refs(&workbook_xml)?;
        let rels = match find_part(&parts, &rels_part_for(&workbook_part)) {
            Some(part) => parse_relationships(&part.data)?,
            None => Vec::new(),
        };

        let mut worksheets = Vec::new();
        for (name, rel_id) in sheet_refs {
            let Some(rel) = rels
                .iter()
                .find(|r| r.id == rel_id && r.is_type(REL_WORKSHEET) && !r.external)
            else {
                // Chart sheets and dialog sheets carry no worksheet protection.
                continue;
            };
            let target = resolve_target(&workbook_part, &rel.target);
            let part = find_part_mut(&mut parts, &target)
                .ok_or_else(|| XlsxError::MissingPart(target.clone()).in_sheet(&name))?;
            let xml = std::mem::take(&mut part.data);
            worksheets.push(Worksheet::from_part(name, part.name.clone(), xml)?);
        }

        Ok(Self {
            parts,
            workbook_part,
            worksheets,
            security,
            removed_vba_parts,
        })
    }

    /// Worksheets in workbook tab order.
    pub fn worksheets(&self) -> &[Worksheet] {
        &self.worksheets
    }

    pub fn worksheets_mut(&mut self) -> &mut [Worksheet] {
        &mut self.worksheets
    }

    /// Look up a worksheet by tab name.
    pub fn worksheet(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets.iter().find(|ws| ws.name == name)
    }

    /// Workbook-level security marker, if the workbook carries one.
    pub fn security(&self) -> Option<&WorkbookProtection> {
        self.security.as_ref()
    }

    /// Remove the workbook-level security marker.
    ///
    /// Returns whether a marker was present.
    pub fn clear_security(&mut self) -> Result<bool, XlsxError> {
        if self.security.is_none() {
            return Ok(false);
        }
        let part = find_part_mut(&mut self.parts, &self.workbook_part)
            .ok_or_else(|| XlsxError::MissingPart(self.workbook_part.clone()))?;
        let (patched, _) = strip_workbook_protection(&part.data)?;
        part.data = patched;
        self.security = None;
        Ok(true)
    }

    /// Archive entries that were discarded as VBA content while loading.
    pub fn removed_vba_parts(&self) -> &[String] {
        &self.removed_vba_parts
    }

    /// Whether the package still contains a VBA project or other macro parts.
    pub fn has_vba(&self) -> bool {
        self.parts.iter().any(|p| vba::is_macro_part(&p.name))
    }

    /// Serialize the package.
    pub fn to_bytes(&self) -> Result<Vec<u8>, XlsxError> {
        write_parts(self.parts.iter().map(|part| {
            let data = self
                .worksheets
                .iter()
                .find(|ws| ws.part_name == part.name)
                .map(|ws| ws.xml.as_slice())
                .unwrap_or(part.data.as_slice());
            (part.name.as_str(), data)
        }))
    }

    /// Write the package to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), XlsxError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path.as_ref(), bytes)?;
        Ok(())
    }
}

/// Resolve the workbook part from the package root relationships.
fn locate_workbook_part(parts: &[Part]) -> Result<String, XlsxError> {
    if let Some(root_rels) = find_part(parts, &rels_part_for("")) {
        let rels = parse_relationships(&root_rels.data)?;
        if let Some(rel) = rels.iter().find(|r| r.is_type(REL_OFFICE_DOCUMENT)) {
            return Ok(resolve_target("", &rel.target));
        }
    }
    Ok(DEFAULT_WORKBOOK_PART.to_string())
}

/// `(name, relationship id)` of every `<sheet>` in `xl/workbook.xml`.
fn read_sheet_refs(workbook_xml: &[u8]) -> Result<Vec<(String, String)>, XlsxError> {
    let mut refs = Vec::new();
    for_each_element(workbook_xml, b"sheet", |e| {
        let name = attribute(e, "name")?
            .ok_or_else(|| XlsxError::Invalid("sheet element without a name".to_string()))?;
        // `r:id`: the only `id` attribute on a sheet element.
        if let Some(rel_id) = attribute(e, "id")? {
            refs.push((name, rel_id));
        }
        Ok(())
    })?;
    Ok(refs)
}
