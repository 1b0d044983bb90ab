//! Package relationship (`.rels`) parsing and part-name resolution.

use super::error::XlsxError;
use super::xml::{attribute, for_each_element};

/// Relationship type of the package's main workbook part.
pub const REL_OFFICE_DOCUMENT: &str = "/officeDocument";
/// Relationship type of a worksheet part (as opposed to chart or dialog sheets).
pub const REL_WORKSHEET: &str = "/worksheet";
/// Relationship type of the VBA project binary.
pub const REL_VBA_PROJECT: &str = "/vbaProject";

/// A relationship entry from a `.rels` part.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path, relative to the source part unless it starts with `/`
    pub target: String,
    /// Whether the target lives outside the package
    pub external: bool,
}

impl Relationship {
    /// True when the relationship type URI ends with `suffix`.
    ///
    /// Transitional and strict OOXML use different URI roots for the same
    /// relationship, so types are compared by their final path segment.
    pub fn is_type(&self, suffix: &str) -> bool {
        self.rel_type.ends_with(suffix)
    }
}

/// Parse every `<Relationship>` element of a `.rels` part.
pub fn parse_relationships(xml: &[u8]) -> Result<Vec<Relationship>, XlsxError> {
    let mut relationships = Vec::new();
    for_each_element(xml, b"Relationship", |e| {
        let id = attribute(e, "Id")?.unwrap_or_default();
        let rel_type = attribute(e, "Type")?.unwrap_or_default();
        let Some(target) = attribute(e, "Target")? else {
            return Ok(());
        };
        let external = attribute(e, "TargetMode")?
            .map(|mode| mode.eq_ignore_ascii_case("External"))
            .unwrap_or(false);
        relationships.push(Relationship {
            id,
            rel_type,
            target,
            external,
        });
        Ok(())
    })?;
    Ok(relationships)
}

/// Canonical form of a part name: forward slashes, no leading slash.
pub fn normalize_part_name(name: &str) -> String {
    name.replace('\\', "/").trim_start_matches('/').to_string()
}

/// Name of the `.rels` part that holds the relationships of `part`.
///
/// `xl/workbook.xml` maps to `xl/_rels/workbook.xml.rels`; the package root
/// (an empty name) maps to `_rels/.rels`.
pub fn rels_part_for(part: &str) -> String {
    let part = normalize_part_name(part);
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None if part.is_empty() => "_rels/.rels".to_string(),
        None => format!("_rels/{}.rels", part),
    }
}

/// Inverse of [`rels_part_for`]: the part whose relationships `rels_part`
/// holds, or `None` when `rels_part` is not a relationships part.
pub fn source_part_for_rels(rels_part: &str) -> Option<String> {
    let rels_part = normalize_part_name(rels_part);
    let file = rels_part.strip_suffix(".rels")?;
    let (dir, name) = match file.rsplit_once("/_rels/") {
        Some((dir, name)) => (Some(dir), name),
        None => (None, file.strip_prefix("_rels/")?),
    };
    if name.contains('/') {
        return None;
    }
    Some(match dir {
        Some(dir) => format!("{}/{}", dir, name),
        None => name.to_string(),
    })
}

/// Resolve a relationship target against the part that owns the relationship.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    let target = target.replace('\\', "/");
    if let Some(absolute) = target.strip_prefix('/') {
        return collapse_segments(absolute);
    }

    let source = normalize_part_name(source_part);
    let base = match source.rsplit_once('/') {
        Some((dir, _)) => format!("{}/{}", dir, target),
        None => target,
    };
    collapse_segments(&base)
}

fn collapse_segments(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
