//! Shared test utilities and fixture generators
//!
//! Workbooks are assembled part by part with the zip crate so each test can
//! dial in exactly the protection and macro content it needs.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const VBA_BYTES: &[u8] = b"\xd0\xcf\x11\xe0 fake vba project";
pub const SIGNATURE_BYTES: &[u8] = b"\x30\x82 fake signature";
pub const PRINTER_BYTES: &[u8] = b"fake DEVMODE";
pub const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts></styleSheet>"#;

/// Protection written onto a fixture worksheet
#[derive(Debug, Clone)]
pub enum SheetLock {
    None,
    /// `sheet="1"` with a legacy password hash and every toggle written out.
    Locked,
    /// `sheet="1"` with only the flag present, leaving toggles to defaults.
    FlagOnly,
    /// `sheetProtection` whose `sheet` value is not quoted.
    Malformed,
}

#[derive(Debug, Clone)]
pub struct FixtureSheet {
    pub name: String,
    pub lock: SheetLock,
    pub cell_text: String,
}

/// Builder for an in-memory `.xlsm` package
#[derive(Debug, Clone)]
pub struct XlsmFixture {
    pub sheets: Vec<FixtureSheet>,
    pub workbook_protection: bool,
    pub with_vba: bool,
    /// Digital signature of the VBA project, linked from `vbaProject.bin`.
    pub with_signature: bool,
    /// Printer settings part used by the first worksheet.
    pub with_printer_settings: bool,
    /// Excel 4.0 macro sheet "Macro1" with an `Auto_Open` name.
    pub with_macrosheet: bool,
}

impl XlsmFixture {
    pub fn new() -> Self {
        Self {
            sheets: Vec::new(),
            workbook_protection: false,
            with_vba: true,
            with_signature: false,
            with_printer_settings: false,
            with_macrosheet: false,
        }
    }

    pub fn sheet(mut self, name: &str, lock: SheetLock) -> Self {
        let cell_text = format!("{} data", name);
        self.sheets.push(FixtureSheet {
            name: name.to_string(),
            lock,
            cell_text,
        });
        self
    }

    pub fn workbook_protection(mut self) -> Self {
        self.workbook_protection = true;
        self
    }

    pub fn without_vba(mut self) -> Self {
        self.with_vba = false;
        self
    }

    pub fn with_signature(mut self) -> Self {
        self.with_signature = true;
        self
    }

    pub fn with_printer_settings(mut self) -> Self {
        self.with_printer_settings = true;
        self
    }

    pub fn with_macrosheet(mut self) -> Self {
        self.with_macrosheet = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut add = |name: &str, data: &[u8]| {
            zip.start_file(name, options).unwrap();
            zip.write_all(data).unwrap();
        };

        add("[Content_Types].xml", self.content_types().as_bytes());
        add("_rels/.rels", ROOT_RELS.as_bytes());
        add("xl/workbook.xml", self.workbook_xml().as_bytes());
        add("xl/_rels/workbook.xml.rels", self.workbook_rels().as_bytes());
        add("xl/styles.xml", STYLES_XML.as_bytes());
        for (i, sheet) in self.sheets.iter().enumerate() {
            add(
                &format!("xl/worksheets/sheet{}.xml", i + 1),
                worksheet_xml(sheet).as_bytes(),
            );
        }
        if self.with_vba {
            add("xl/vbaProject.bin", VBA_BYTES);
        }
        if self.with_vba && self.with_signature {
            add("xl/_rels/vbaProject.bin.rels", VBA_PROJECT_RELS.as_bytes());
            add("xl/vbaProjectSignature.bin", SIGNATURE_BYTES);
        }
        if self.with_printer_settings {
            add("xl/worksheets/_rels/sheet1.xml.rels", SHEET_PRINTER_RELS.as_bytes());
            add("xl/printerSettings/printerSettings1.bin", PRINTER_BYTES);
        }
        if self.with_macrosheet {
            add("xl/macrosheets/sheet1.xml", MACROSHEET_XML.as_bytes());
        }

        zip.finish().unwrap().into_inner()
    }

    fn content_types(&self) -> String {
        let workbook_ct = if self.with_vba {
            "application/vnd.ms-excel.sheet.macroEnabled.main+xml"
        } else {
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"
        };
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );
        xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
        xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
        if self.with_vba {
            xml.push_str(r#"<Default Extension="bin" ContentType="application/vnd.ms-office.vbaProject"/>"#);
        }
        if self.with_vba && self.with_signature {
            xml.push_str(r#"<Override PartName="/xl/vbaProject.bin" ContentType="application/vnd.ms-office.vbaProject"/>"#);
            xml.push_str(r#"<Override PartName="/xl/vbaProjectSignature.bin" ContentType="application/vnd.ms-office.vbaProjectSignature"/>"#);
        }
        if self.with_macrosheet {
            xml.push_str(r#"<Override PartName="/xl/macrosheets/sheet1.xml" ContentType="application/vnd.ms-excel.macrosheet+xml"/>"#);
        }
        xml.push_str(&format!(
            r#"<Override PartName="/xl/workbook.xml" ContentType="{}"/>"#,
            workbook_ct
        ));
        xml.push_str(r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#);
        for i in 1..=self.sheets.len() {
            xml.push_str(&format!(
                r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i
            ));
        }
        xml.push_str("</Types>");
        xml
    }

    fn workbook_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );
        xml.push_str(r#"<workbookPr codeName="ThisWorkbook"/>"#);
        if self.workbook_protection {
            xml.push_str(r#"<workbookProtection workbookPassword="CC3D" lockStructure="1" lockWindows="1"/>"#);
        }
        xml.push_str("<sheets>");
        for (i, sheet) in self.sheets.iter().enumerate() {
            xml.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                sheet.name,
                i + 1,
                i + 1
            ));
        }
        if self.with_macrosheet {
            xml.push_str(&format!(
                r#"<sheet name="Macro1" sheetId="{}" r:id="rIdMacro1"/>"#,
                self.sheets.len() + 1
            ));
        }
        xml.push_str("</sheets>");
        if self.with_macrosheet {
            xml.push_str(r#"<definedNames><definedName name="_xlnm.Auto_Open" xlm="1">Macro1!$A$1</definedName></definedNames>"#);
        }
        xml.push_str("</workbook>");
        xml
    }

    fn workbook_rels(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for i in 1..=self.sheets.len() {
            xml.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i, i
            ));
        }
        let next = self.sheets.len() + 1;
        xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
            next
        ));
        if self.with_vba {
            xml.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.microsoft.com/office/2006/relationships/vbaProject" Target="vbaProject.bin"/>"#,
                next + 1
            ));
        }
        if self.with_macrosheet {
            xml.push_str(r#"<Relationship Id="rIdMacro1" Type="http://schemas.microsoft.com/office/2006/relationships/xlMacrosheet" Target="macrosheets/sheet1.xml"/>"#);
        }
        xml.push_str("</Relationships>");
        xml
    }
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const VBA_PROJECT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.microsoft.com/office/2006/relationships/vbaProjectSignature" Target="vbaProjectSignature.bin"/></Relationships>"#;

const SHEET_PRINTER_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/printerSettings" Target="../printerSettings/printerSettings1.bin"/></Relationships>"#;

const MACROSHEET_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<xm:macrosheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:xm="http://schemas.microsoft.com/office/excel/2006/main"><sheetData><row r="1"><c r="A1" t="str"><f>ALERT("hi")</f><v>TRUE</v></c></row></sheetData></xm:macrosheet>"#;

fn worksheet_xml(sheet: &FixtureSheet) -> String {
    let protection = match sheet.lock {
        SheetLock::None => String::new(),
        SheetLock::Locked => concat!(
            r#"<sheetProtection password="CC3D" sheet="1" objects="1" scenarios="1" "#,
            r#"formatCells="1" formatColumns="1" formatRows="1" insertColumns="1" insertRows="1" "#,
            r#"insertHyperlinks="1" deleteColumns="1" deleteRows="1" selectLockedCells="1" "#,
            r#"sort="1" autoFilter="1" pivotTables="1" selectUnlockedCells="1"/>"#
        )
        .to_string(),
        SheetLock::FlagOnly => r#"<sheetProtection sheet="1"/>"#.to_string(),
        SheetLock::Malformed => r#"<sheetProtection password="CC3D" sheet=1 objects="1"/>"#.to_string(),
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>{}</t></is></c></row></sheetData>{}<pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/></worksheet>"#,
        sheet.cell_text, protection
    )
}

/// The two-sheet workbook used across tests: "Q1" locked with a password,
/// "Q2" unprotected, plus workbook protection and a VBA project.
pub fn budget_fixture() -> XlsmFixture {
    XlsmFixture::new()
        .sheet("Q1", SheetLock::Locked)
        .sheet("Q2", SheetLock::None)
        .workbook_protection()
}

/// Working directory with an empty `src/` inside.
pub fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("src")).unwrap();
    dir
}

/// Write `bytes` as `src/<name>` under `root` and return the path.
pub fn place_source(root: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = root.join("src").join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Every entry of a zip package, by name.
pub fn read_entries(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let mut data = Vec::new();
        file.read_to_end(&mut data).unwrap();
        entries.push((file.name().to_string(), data));
    }
    entries
}

pub fn entry<'a>(entries: &'a [(String, Vec<u8>)], name: &str) -> Option<&'a [u8]> {
    entries
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, d)| d.as_slice())
}

pub fn entry_text(entries: &[(String, Vec<u8>)], name: &str) -> String {
    String::from_utf8(entry(entries, name).unwrap().to_vec()).unwrap()
}

/// The single file written under `converted/<timestamp>/`.
pub fn single_output(root: &Path) -> PathBuf {
    let converted = root.join("converted");
    let runs: Vec<_> = std::fs::read_dir(&converted)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(runs.len(), 1, "expected one timestamped run directory");
    let files: Vec<_> = std::fs::read_dir(&runs[0])
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1, "expected one converted file");
    files[0].clone()
}
