//! Discarding macro content from a macro-enabled package.
//!
//! An `.xlsx` package cannot carry macros. Stripping removes the VBA project
//! binary and its signature parts, `xl/vbaData.xml`, Excel 4.0 macro sheets
//! and dialog sheets, together with their relationship parts. Every
//! relationship, sheet entry, macro defined name and content-type entry that
//! points at them goes too, and the workbook's main content type is
//! downgraded to the macro-free one.
//!
//! ActiveX controls and ribbon customizations are left alone: worksheets
//! reference them directly and they are valid in a plain workbook.

use std::collections::HashSet;

use quick_xml::events::BytesStart;

use super::error::XlsxError;
use super::package::{
    Part, CONTENT_TYPES_PART, CT_PRINTER_SETTINGS, CT_VBA_PROJECT, CT_WORKBOOK_MACRO_ENABLED,
    CT_WORKBOOK_PLAIN,
};
use super::relationships::{
    normalize_part_name, rels_part_for, resolve_target, source_part_for_rels, REL_VBA_PROJECT,
};
use super::xml::{
    attribute, for_each_element, parse_bool, transform_elements, with_attribute, Edit,
};

/// True for parts that only exist to hold macros: `vbaProject*.bin`
/// (project and signatures), `xl/vbaData.xml`, and anything under
/// `xl/macrosheets/` or `xl/dialogsheets/`.
pub fn is_macro_part(name: &str) -> bool {
    let name = lower_name(name);
    let file = name.rsplit('/').next().unwrap_or(&name);
    (file.starts_with("vbaproject") && file.ends_with(".bin"))
        || name == "xl/vbadata.xml"
        || name.starts_with("xl/macrosheets/")
        || name.starts_with("xl/dialogsheets/")
}

/// Remove macro parts and every reference to them.
///
/// Returns the names of the removed parts (relationship parts included), in
/// package order. A package without macros is left untouched apart from the
/// workbook content type.
pub fn strip_vba(parts: &mut Vec<Part>, workbook_part: &str) -> Result<Vec<String>, XlsxError> {
    let mut doomed = HashSet::new();
    for part in parts.iter().filter(|p| is_macro_part(&p.name)) {
        doomed.insert(lower_name(&part.name));
        doomed.insert(rels_part_for(&part.name).to_ascii_lowercase());
    }

    let mut removed = Vec::new();
    parts.retain(|p| {
        let discard = doomed.contains(&lower_name(&p.name));
        if discard {
            removed.push(p.name.clone());
        }
        !discard
    });

    let workbook_rels = rels_part_for(workbook_part).to_ascii_lowercase();
    let mut removed_workbook_ids = Vec::new();
    for part in parts.iter_mut() {
        let Some(source) = source_part_for_rels(&part.name) else {
            continue;
        };
        let is_workbook_rels = lower_name(&part.name) == workbook_rels;
        let (patched, edits) = transform_elements(&part.data, b"Relationship", |e| {
            if !points_at_macro_content(e, &source, &doomed)? {
                return Ok(Edit::Keep);
            }
            if is_workbook_rels {
                if let Some(id) = attribute(e, "Id")? {
                    removed_workbook_ids.push(id);
                }
            }
            Ok(Edit::Remove)
        })?;
        if edits > 0 {
            part.data = patched;
        }
    }

    if let Some(part) = parts
        .iter_mut()
        .find(|p| normalize_part_name(&p.name).eq_ignore_ascii_case(workbook_part))
    {
        if let Some(patched) = strip_macro_sheet_entries(&part.data, &removed_workbook_ids)? {
            part.data = patched;
        }
    }

    rewrite_content_types(parts, workbook_part, &doomed)?;

    Ok(removed)
}

fn lower_name(name: &str) -> String {
    normalize_part_name(name).to_ascii_lowercase()
}

/// Whether a `<Relationship>` of `source` targets a removed part or is the
/// workbook's VBA project link.
fn points_at_macro_content(
    e: &BytesStart<'_>,
    source: &str,
    doomed: &HashSet<String>,
) -> Result<bool, XlsxError> {
    let rel_type = attribute(e, "Type")?.unwrap_or_default();
    if rel_type.ends_with(REL_VBA_PROJECT) {
        return Ok(true);
    }
    let external = attribute(e, "TargetMode")?
        .map(|mode| mode.eq_ignore_ascii_case("External"))
        .unwrap_or(false);
    let Some(target) = attribute(e, "Target")? else {
        return Ok(false);
    };
    Ok(!external && doomed.contains(&resolve_target(source, &target).to_ascii_lowercase()))
}

/// New position of sheet `index` once the sheets at `removed` are gone.
fn shift_index(index: usize, removed: &[usize]) -> Option<usize> {
    if removed.contains(&index) {
        return None;
    }
    Some(index - removed.iter().filter(|r| **r < index).count())
}

/// Drop `<sheet>` entries whose relationship was removed, and XLM or VBA
/// defined names. Sheet-scoped names and the active tab are renumbered.
///
/// Returns `None` when the workbook part needs no change.
fn strip_macro_sheet_entries(
    xml: &[u8],
    removed_ids: &[String],
) -> Result<Option<Vec<u8>>, XlsxError> {
    let mut sheet_ids = Vec::new();
    for_each_element(xml, b"sheet", |e| {
        sheet_ids.push(attribute(e, "id")?);
        Ok(())
    })?;
    let removed_sheets: Vec<usize> = sheet_ids
        .iter()
        .enumerate()
        .filter(|(_, id)| id.as_ref().is_some_and(|id| removed_ids.contains(id)))
        .map(|(i, _)| i)
        .collect();

    let (xml_sheets, sheet_edits) = transform_elements(xml, b"sheet", |e| {
        match attribute(e, "id")? {
            Some(id) if removed_ids.contains(&id) => Ok(Edit::Remove),
            _ => Ok(Edit::Keep),
        }
    })?;

    let (xml_names, name_edits) = transform_elements(&xml_sheets, b"definedName", |e| {
        for flag in ["xlm", "function", "vbProcedure"] {
            if attribute(e, flag)?.is_some_and(|v| parse_bool(&v)) {
                return Ok(Edit::Remove);
            }
        }
        let Some(local) = attribute(e, "localSheetId")? else {
            return Ok(Edit::Keep);
        };
        let Ok(index) = local.trim().parse::<usize>() else {
            return Ok(Edit::Keep);
        };
        match shift_index(index, &removed_sheets) {
            None => Ok(Edit::Remove),
            Some(shifted) if shifted != index => Ok(Edit::Retag(with_attribute(
                e,
                "localSheetId",
                &shifted.to_string(),
            )?)),
            Some(_) => Ok(Edit::Keep),
        }
    })?;

    let (patched, view_edits) = transform_elements(&xml_names, b"workbookView", |e| {
        let mut view = None;
        for key in ["activeTab", "firstSheet"] {
            let Some(index) = attribute(e, key)?.and_then(|v| v.trim().parse::<usize>().ok())
            else {
                continue;
            };
            let shifted = shift_index(index, &removed_sheets).unwrap_or(0);
            if shifted != index {
                let current: &BytesStart<'_> = match &view {
                    Some(patched) => patched,
                    None => e,
                };
                view = Some(with_attribute(current, key, &shifted.to_string())?);
            }
        }
        Ok(match view {
            Some(view) => Edit::Retag(view),
            None => Edit::Keep,
        })
    })?;

    if sheet_edits + name_edits + view_edits == 0 {
        return Ok(None);
    }
    Ok(Some(patched))
}

fn rewrite_content_types(
    parts: &mut [Part],
    workbook_part: &str,
    doomed: &HashSet<String>,
) -> Result<(), XlsxError> {
    let extensions: HashSet<String> = parts
        .iter()
        .filter_map(|p| {
            let name = lower_name(&p.name);
            let file = name.rsplit('/').next()?;
            file.rsplit_once('.').map(|(_, ext)| ext.to_string())
        })
        .collect();

    let Some(part) = parts
        .iter_mut()
        .find(|p| normalize_part_name(&p.name) == CONTENT_TYPES_PART)
    else {
        return Err(XlsxError::MissingPart(CONTENT_TYPES_PART.to_string()));
    };

    let (without_overrides, override_edits) = transform_elements(&part.data, b"Override", |e| {
        let part_name = attribute(e, "PartName")?.unwrap_or_default();
        let content_type = attribute(e, "ContentType")?.unwrap_or_default();

        if is_macro_part(&part_name) || doomed.contains(&lower_name(&part_name)) {
            return Ok(Edit::Remove);
        }
        if normalize_part_name(&part_name).eq_ignore_ascii_case(workbook_part)
            && content_type == CT_WORKBOOK_MACRO_ENABLED
        {
            return Ok(Edit::Replace(with_attribute(
                e,
                "ContentType",
                CT_WORKBOOK_PLAIN,
            )?));
        }
        Ok(Edit::Keep)
    })?;

    // Parts without an override fall back to the extension default. Any
    // `.bin` part left behind (printer settings) must not read as VBA.
    let (patched, default_edits) = transform_elements(&without_overrides, b"Default", |e| {
        let content_type = attribute(e, "ContentType")?.unwrap_or_default();
        if !content_type.eq_ignore_ascii_case(CT_VBA_PROJECT) {
            return Ok(Edit::Keep);
        }
        let extension = attribute(e, "Extension")?
            .unwrap_or_default()
            .to_ascii_lowercase();
        if extensions.contains(&extension) {
            Ok(Edit::Replace(with_attribute(
                e,
                "ContentType",
                CT_PRINTER_SETTINGS,
            )?))
        } else {
            Ok(Edit::Remove)
        }
    })?;

    if override_edits + default_edits > 0 {
        part.data = patched;
    }
    Ok(())
}
