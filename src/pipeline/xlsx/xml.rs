//! Streaming XML helpers shared by the package parts.
//!
//! Parts are never parsed into a tree. Each edit is a single pass over the
//! event stream that copies everything through except the elements being
//! removed or replaced, so unknown markup survives a round trip untouched.

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

use super::error::XlsxError;

/// What to do with an element matched by [`transform_elements`].
#[derive(Debug)]
pub enum Edit {
    /// Copy the element (and its children) unchanged.
    Keep,
    /// Drop the element and all of its children.
    Remove,
    /// Write this empty element instead; children of the original are dropped.
    Replace(BytesStart<'static>),
    /// Write this start tag in place of the original and keep its children.
    /// The tag must carry the original element's qualified name.
    Retag(BytesStart<'static>),
}

/// Strip a namespace prefix from a qualified name.
pub fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|b| *b == b':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

/// Collect an element's attributes as `(qualified name, unescaped value)` pairs.
pub fn attributes(e: &BytesStart<'_>) -> Result<Vec<(String, String)>, XlsxError> {
    let mut out = Vec::new();
    for attr in e.attributes().with_checks(false) {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(quick_xml::Error::from)?
            .into_owned();
        out.push((key, value));
    }
    Ok(out)
}

/// Look up a single attribute by local name.
pub fn attribute(e: &BytesStart<'_>, local: &str) -> Result<Option<String>, XlsxError> {
    Ok(attributes(e)?
        .into_iter()
        .find(|(key, _)| local_name(key.as_bytes()) == local.as_bytes())
        .map(|(_, value)| value))
}

/// Copy of `e` with the attribute whose local name is `local` set to `value`.
///
/// Every other attribute keeps its position and value. The attribute is
/// appended when `e` does not carry it.
pub fn with_attribute(
    e: &BytesStart<'_>,
    local: &str,
    value: &str,
) -> Result<BytesStart<'static>, XlsxError> {
    let name = e.name();
    let mut patched = BytesStart::new(String::from_utf8_lossy(name.as_ref()).into_owned());
    let mut replaced = false;
    for (key, old) in attributes(e)? {
        if local_name(key.as_bytes()) == local.as_bytes() {
            patched.push_attribute((key.as_str(), value));
            replaced = true;
        } else {
            patched.push_attribute((key.as_str(), old.as_str()));
        }
    }
    if !replaced {
        patched.push_attribute((local, value));
    }
    Ok(patched)
}

/// Visit every start or empty element whose local name is `local`.
pub fn for_each_element<F>(xml: &[u8], local: &[u8], mut visit: F) -> Result<(), XlsxError>
where
    F: FnMut(&BytesStart<'_>) -> Result<(), XlsxError>,
{
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == local => {
                visit(e)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Rewrite every element named `local` according to `edit`.
///
/// Returns the new document and the number of elements that were removed or
/// replaced. When that count is zero the output is equivalent to the input.
pub fn transform_elements<F>(
    xml: &[u8],
    local: &[u8],
    mut edit: F,
) -> Result<(Vec<u8>, usize), XlsxError>
where
    F: FnMut(&BytesStart<'_>) -> Result<Edit, XlsxError>,
{
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut buf = Vec::new();

    // Depth inside an element that is being dropped.
    let mut skip_depth = 0usize;
    let mut edits = 0usize;

    loop {
        let event = reader.read_event_into(&mut buf)?;

        if skip_depth > 0 {
            match event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
            continue;
        }

        match event {
            Event::Start(ref e) if e.local_name().as_ref() == local => match edit(e)? {
                Edit::Keep => writer.write_event(Event::Start(e.to_owned()))?,
                Edit::Remove => {
                    edits += 1;
                    skip_depth = 1;
                }
                Edit::Replace(replacement) => {
                    edits += 1;
                    skip_depth = 1;
                    writer.write_event(Event::Empty(replacement))?;
                }
                Edit::Retag(tag) => {
                    edits += 1;
                    writer.write_event(Event::Start(tag))?;
                }
            },
            Event::Empty(ref e) if e.local_name().as_ref() == local => match edit(e)? {
                Edit::Keep => writer.write_event(Event::Empty(e.to_owned()))?,
                Edit::Remove => edits += 1,
                Edit::Replace(replacement) | Edit::Retag(replacement) => {
                    edits += 1;
                    writer.write_event(Event::Empty(replacement))?;
                }
            },
            Event::Eof => break,
            other => writer.write_event(other)?,
        }

        buf.clear();
    }

    Ok((writer.into_inner(), edits))
}

/// Parse an OOXML boolean attribute value (`1`/`true`, `0`/`false`).
///
/// Anything unrecognised is read as `false`.
pub fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?><root xmlns:x="urn:x"><keep a="1"/><drop b="2"><child/></drop><x:drop c="3"/><tail>text</tail></root>"#;

    #[test]
    fn test_local_name_strips_prefix() {
        assert_eq!(local_name(b"r:id"), b"id");
        assert_eq!(local_name(b"sheet"), b"sheet");
    }

    #[test]
    fn test_remove_elements_with_children_and_prefix() {
        let (out, edits) =
            transform_elements(DOC.as_bytes(), b"drop", |_| Ok(Edit::Remove)).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert_eq!(edits, 2);
        assert!(!out.contains("drop"));
        assert!(!out.contains("child"));
        assert!(out.contains(r#"<keep a="1"/>"#));
        assert!(out.contains("<tail>text</tail>"));
    }

    #[test]
    fn test_replace_element() {
        let (out, edits) = transform_elements(DOC.as_bytes(), b"keep", |_| {
            let mut e = BytesStart::new("keep");
            e.push_attribute(("a", "0"));
            Ok(Edit::Replace(e))
        })
        .unwrap();
        let out = String::from_utf8(out).unwrap();

        assert_eq!(edits, 1);
        assert!(out.contains(r#"<keep a="0"/>"#));
    }

    #[test]
    fn test_retag_keeps_children() {
        let xml = r#"<names><definedName name="Total" localSheetId="2">Q1!$A$1</definedName></names>"#;
        let (out, edits) = transform_elements(xml.as_bytes(), b"definedName", |e| {
            Ok(Edit::Retag(with_attribute(e, "localSheetId", "1")?))
        })
        .unwrap();

        assert_eq!(edits, 1);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"<names><definedName name="Total" localSheetId="1">Q1!$A$1</definedName></names>"#
        );
    }

    #[test]
    fn test_with_attribute_appends_missing() {
        let mut e = BytesStart::new("x:Default");
        e.push_attribute(("Extension", "bin"));
        let patched = with_attribute(&e, "ContentType", "a&b").unwrap();
        assert_eq!(
            attributes(&patched).unwrap(),
            vec![
                ("Extension".to_string(), "bin".to_string()),
                ("ContentType".to_string(), "a&b".to_string()),
            ]
        );
        assert_eq!(patched.name().as_ref(), b"x:Default");
    }

    #[test]
    fn test_keep_is_identity() {
        let (out, edits) = transform_elements(DOC.as_bytes(), b"drop", |_| Ok(Edit::Keep)).unwrap();
        assert_eq!(edits, 0);
        assert_eq!(String::from_utf8(out).unwrap(), DOC);
    }

    #[test]
    fn test_attribute_lookup_by_local_name() {
        let mut seen = Vec::new();
        for_each_element(DOC.as_bytes(), b"drop", |e| {
            seen.push(attribute(e, "c")?);
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![None, Some("3".to_string())]);
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("1"));
        assert!(parse_bool("true"));
        assert!(parse_bool(" TRUE "));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("maybe"));
    }
}
