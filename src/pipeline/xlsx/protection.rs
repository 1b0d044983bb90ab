//! Worksheet and workbook protection records.
//!
//! [`SheetProtection`] mirrors the `<sheetProtection>` element of a worksheet
//! part and [`WorkbookProtection`] the `<workbookProtection>` element of
//! `xl/workbook.xml`. In both, a `true` toggle means the operation is
//! *restricted* while protection is on.

use quick_xml::events::BytesStart;

use super::error::XlsxError;
use super::xml::{attributes, local_name, parse_bool, transform_elements, Edit};

/// Local name of the worksheet protection element.
pub const SHEET_PROTECTION: &[u8] = b"sheetProtection";
/// Local name of the workbook protection element.
pub const WORKBOOK_PROTECTION: &[u8] = b"workbookProtection";

/// Protection state of a single worksheet.
///
/// `Default` describes a sheet with no `<sheetProtection>` element at all:
/// nothing is protected and every toggle is off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetProtection {
    /// Whether sheet protection is switched on.
    pub sheet: bool,
    /// Drawing objects are locked.
    pub objects: bool,
    /// Scenarios are locked.
    pub scenarios: bool,
    pub format_cells: bool,
    pub format_columns: bool,
    pub format_rows: bool,
    pub insert_columns: bool,
    pub insert_rows: bool,
    pub insert_hyperlinks: bool,
    pub delete_columns: bool,
    pub delete_rows: bool,
    pub select_locked_cells: bool,
    pub sort: bool,
    pub auto_filter: bool,
    pub pivot_tables: bool,
    pub select_unlocked_cells: bool,
    /// Legacy 16-bit password hash (`password` attribute).
    pub password: Option<String>,
    /// Hash algorithm of the modern password verifier.
    pub algorithm_name: Option<String>,
    pub hash_value: Option<String>,
    pub salt_value: Option<String>,
    pub spin_count: Option<String>,
}

impl SheetProtection {
    /// Build from a `<sheetProtection>` element.
    ///
    /// Attributes that are absent take their schema defaults, under which most
    /// editing operations are restricted once the element is present.
    pub fn from_element(e: &BytesStart<'_>) -> Result<Self, XlsxError> {
        let mut p = SheetProtection {
            format_cells: true,
            format_columns: true,
            format_rows: true,
            insert_columns: true,
            insert_rows: true,
            insert_hyperlinks: true,
            delete_columns: true,
            delete_rows: true,
            sort: true,
            auto_filter: true,
            pivot_tables: true,
            ..Default::default()
        };

        for (key, value) in attributes(e)? {
            match local_name(key.as_bytes()) {
                b"sheet" => p.sheet = parse_bool(&value),
                b"objects" => p.objects = parse_bool(&value),
                b"scenarios" => p.scenarios = parse_bool(&value),
                b"formatCells" => p.format_cells = parse_bool(&value),
                b"formatColumns" => p.format_columns = parse_bool(&value),
                b"formatRows" => p.format_rows = parse_bool(&value),
                b"insertColumns" => p.insert_columns = parse_bool(&value),
                b"insertRows" => p.insert_rows = parse_bool(&value),
                b"insertHyperlinks" => p.insert_hyperlinks = parse_bool(&value),
                b"deleteColumns" => p.delete_columns = parse_bool(&value),
                b"deleteRows" => p.delete_rows = parse_bool(&value),
                b"selectLockedCells" => p.select_locked_cells = parse_bool(&value),
                b"sort" => p.sort = parse_bool(&value),
                b"autoFilter" => p.auto_filter = parse_bool(&value),
                b"pivotTables" => p.pivot_tables = parse_bool(&value),
                b"selectUnlockedCells" => p.select_unlocked_cells = parse_bool(&value),
                b"password" => p.password = Some(value),
                b"algorithmName" => p.algorithm_name = Some(value),
                b"hashValue" => p.hash_value = Some(value),
                b"saltValue" => p.salt_value = Some(value),
                b"spinCount" => p.spin_count = Some(value),
                _ => {}
            }
        }

        Ok(p)
    }

    pub fn is_protected(&self) -> bool {
        self.sheet
    }

    /// Whether any password verifier (legacy or hashed) is stored.
    pub fn has_password(&self) -> bool {
        self.password.is_some() || self.hash_value.is_some()
    }

    /// The thirteen fine-grained toggles, named as in the file format.
    pub fn toggles(&self) -> [(&'static str, bool); 13] {
        [
            ("formatCells", self.format_cells),
            ("formatColumns", self.format_columns),
            ("formatRows", self.format_rows),
            ("insertColumns", self.insert_columns),
            ("insertRows", self.insert_rows),
            ("insertHyperlinks", self.insert_hyperlinks),
            ("deleteColumns", self.delete_columns),
            ("deleteRows", self.delete_rows),
            ("selectLockedCells", self.select_locked_cells),
            ("sort", self.sort),
            ("autoFilter", self.auto_filter),
            ("pivotTables", self.pivot_tables),
            ("selectUnlockedCells", self.select_unlocked_cells),
        ]
    }

    /// Unprotected copy: sheet flag, every toggle and every password
    /// reference cleared. `objects` and `scenarios` are carried over.
    pub fn cleared(&self) -> Self {
        SheetProtection {
            objects: self.objects,
            scenarios: self.scenarios,
            ..Default::default()
        }
    }

    /// Serialize as an empty element named `tag` (which may carry a prefix).
    pub fn to_element(&self, tag: &str) -> BytesStart<'static> {
        let flag = |b: bool| if b { "1" } else { "0" };

        let mut e = BytesStart::new(tag.to_string());
        for (key, value) in [
            ("password", &self.password),
            ("algorithmName", &self.algorithm_name),
            ("hashValue", &self.hash_value),
            ("saltValue", &self.salt_value),
            ("spinCount", &self.spin_count),
        ] {
            if let Some(value) = value {
                e.push_attribute((key, value.as_str()));
            }
        }
        e.push_attribute(("sheet", flag(self.sheet)));
        e.push_attribute(("objects", flag(self.objects)));
        e.push_attribute(("scenarios", flag(self.scenarios)));
        for (key, value) in self.toggles() {
            e.push_attribute((key, flag(value)));
        }
        e
    }
}

/// Workbook-level security marker (`<workbookProtection>`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkbookProtection {
    pub lock_structure: bool,
    pub lock_windows: bool,
    pub lock_revision: bool,
    /// Any of the workbook or revisions password attributes is present.
    pub has_password: bool,
}

impl WorkbookProtection {
    pub fn from_element(e: &BytesStart<'_>) -> Result<Self, XlsxError> {
        let mut p = WorkbookProtection::default();
        for (key, value) in attributes(e)? {
            match local_name(key.as_bytes()) {
                b"lockStructure" => p.lock_structure = parse_bool(&value),
                b"lockWindows" => p.lock_windows = parse_bool(&value),
                b"lockRevision" => p.lock_revision = parse_bool(&value),
                b"workbookPassword"
                | b"revisionsPassword"
                | b"workbookHashValue"
                | b"revisionsHashValue" => p.has_password = true,
                _ => {}
            }
        }
        Ok(p)
    }
}

/// Replace the `<sheetProtection>` element of a worksheet part.
///
/// The original element's qualified name is reused so prefixed documents stay
/// consistent. Returns the patched part and whether an element was found.
pub fn rewrite_sheet_protection(
    xml: &[u8],
    protection: &SheetProtection,
) -> Result<(Vec<u8>, bool), XlsxError> {
    let (patched, edits) = transform_elements(xml, SHEET_PROTECTION, |e| {
        let name = e.name();
        let tag = String::from_utf8_lossy(name.as_ref());
        Ok(Edit::Replace(protection.to_element(&tag)))
    })?;
    Ok((patched, edits > 0))
}

/// Remove the `<workbookProtection>` element from `xl/workbook.xml`.
pub fn strip_workbook_protection(xml: &[u8]) -> Result<(Vec<u8>, bool), XlsxError> {
    let (patched, edits) = transform_elements(xml, WORKBOOK_PROTECTION, |_| Ok(Edit::Remove))?;
    Ok((patched, edits > 0))
}
