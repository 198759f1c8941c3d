//! Toolbox document merging
//!
//! Splices a [`CategoryFragment`] into a Blockly toolbox document. The merge
//! converges on "exactly one category with this name, holding exactly these
//! blocks" whatever the document looked like before: absent, empty, holding a
//! stale copy of the category, or holding several copies.
//!
//! The document is streamed through quick-xml and every event that is not
//! part of a replaced category is written back unchanged, so the root
//! element's attributes (including `xmlns`) and unrelated categories are
//! preserved as they were.

use crate::build::write::write_atomic;
use crate::codegen::CategoryFragment;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// XML namespace of Blockly toolbox documents
pub const BLOCKLY_XML_NAMESPACE: &str = "https://developers.google.com/blockly/xml";

const INDENT: &str = "  ";

/// Errors that can occur while merging a toolbox
#[derive(Debug, Error)]
pub enum ToolboxError {
    /// The existing document is not well-formed XML
    #[error("Malformed toolbox document: {0}")]
    Malformed(String),

    /// Failed to serialize the merged document
    #[error("Failed to write toolbox XML: {0}")]
    Write(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Create a toolbox document holding only `fragment`
pub fn new_toolbox(fragment: &CategoryFragment) -> String {
    format!(
        "<xml xmlns=\"{}\" id=\"toolbox\" style=\"display: none\">\n{}{}\n</xml>\n",
        BLOCKLY_XML_NAMESPACE,
        INDENT,
        fragment.to_xml_at(1)
    )
}

/// Merge `fragment` into `document`
///
/// An empty document yields a new toolbox. The first category named like
/// the fragment is replaced in place, later ones are removed; without a
/// match the fragment is appended as the root's last child.
pub fn merge(fragment: &CategoryFragment, document: &str) -> Result<String, ToolboxError> {
    if document.trim().is_empty() {
        return Ok(new_toolbox(fragment));
    }

    let mut reader = Reader::from_str(document);
    let mut writer = Writer::new(Vec::new());
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut placed = false;
    // Whitespace is held back so it can be dropped along with a removed duplicate
    let mut pending = String::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| malformed(reader.buffer_position(), e))?;

        match event {
            Event::Start(start) => {
                if depth > 0 && is_category(&start, &fragment.name)? {
                    let end = start.to_end().into_owned();
                    reader
                        .read_to_end(end.name())
                        .map_err(|e| malformed(reader.buffer_position(), e))?;
                    place(&mut writer, &mut pending, fragment, depth, &mut placed);
                    continue;
                }
                if depth == 0 {
                    claim_root(&mut seen_root)?;
                }
                depth += 1;
                flush(&mut writer, &mut pending);
                write_event(&mut writer, Event::Start(start))?;
            }
            Event::Empty(empty) => {
                if depth > 0 && is_category(&empty, &fragment.name)? {
                    place(&mut writer, &mut pending, fragment, depth, &mut placed);
                    continue;
                }
                flush(&mut writer, &mut pending);
                if depth == 0 {
                    // Self-closing root: open it up to hold the fragment
                    claim_root(&mut seen_root)?;
                    write_event(&mut writer, Event::Start(empty.borrow()))?;
                    write_raw(&mut writer, &format!("\n{}{}\n", INDENT, fragment.to_xml_at(1)));
                    write_event(&mut writer, Event::End(empty.to_end().into_owned()))?;
                    placed = true;
                    continue;
                }
                write_event(&mut writer, Event::Empty(empty))?;
            }
            Event::End(end) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| malformed(reader.buffer_position(), "unexpected closing tag"))?;
                if depth == 0 && !placed {
                    let ws = std::mem::take(&mut pending);
                    let (lead, trail) = match ws.rfind('\n') {
                        Some(i) => (&ws[..=i], &ws[i + 1..]),
                        None => ("\n", ""),
                    };
                    write_raw(
                        &mut writer,
                        &format!("{}{}{}\n{}", lead, INDENT, fragment.to_xml_at(1), trail),
                    );
                    placed = true;
                }
                flush(&mut writer, &mut pending);
                write_event(&mut writer, Event::End(end))?;
            }
            Event::Text(text) => {
                let raw: &[u8] = &text;
                if raw.iter().all(u8::is_ascii_whitespace) {
                    pending.push_str(&String::from_utf8_lossy(raw));
                } else {
                    flush(&mut writer, &mut pending);
                    write_event(&mut writer, Event::Text(text))?;
                }
            }
            Event::Eof => break,
            other => {
                flush(&mut writer, &mut pending);
                write_event(&mut writer, other)?;
            }
        }
    }

    flush(&mut writer, &mut pending);

    if depth != 0 {
        return Err(ToolboxError::Malformed("unclosed element at end of document".to_string()));
    }
    if !seen_root {
        return Err(ToolboxError::Malformed("document has no root element".to_string()));
    }

    String::from_utf8(writer.into_inner()).map_err(|e| ToolboxError::Write(e.to_string()))
}

/// Merge several fragments in order
pub fn merge_all(fragments: &[CategoryFragment], document: &str) -> Result<String, ToolboxError> {
    fragments
        .iter()
        .try_fold(document.to_string(), |doc, fragment| merge(fragment, &doc))
}

/// Merge fragments into the toolbox file at `path`
///
/// A missing file is treated as an empty document. The file is replaced as a
/// whole, and only after every merge succeeded; a malformed document leaves
/// it untouched.
pub fn update_toolbox_file(fragments: &[CategoryFragment], path: &Path) -> Result<(), ToolboxError> {
    let existing = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    let merged = merge_all(fragments, &existing)?;
    write_atomic(path, &merged)?;

    tracing::info!(
        path = %path.display(),
        categories = fragments.len(),
        "updated toolbox"
    );
    Ok(())
}

fn is_category(element: &BytesStart<'_>, name: &str) -> Result<bool, ToolboxError> {
    if element.local_name().as_ref() != b"category" {
        return Ok(false);
    }
    for attr in element.attributes() {
        let attr = attr.map_err(|e| ToolboxError::Malformed(e.to_string()))?;
        if attr.key.as_ref() == b"name" {
            let value = attr
                .unescape_value()
                .map_err(|e| ToolboxError::Malformed(e.to_string()))?;
            return Ok(value == name);
        }
    }
    Ok(false)
}

/// Write the fragment in place of a matching category, or drop a duplicate
fn place(
    writer: &mut Writer<Vec<u8>>,
    pending: &mut String,
    fragment: &CategoryFragment,
    depth: usize,
    placed: &mut bool,
) {
    if *placed {
        pending.clear();
        return;
    }
    flush(writer, pending);
    write_raw(writer, &fragment.to_xml_at(depth));
    *placed = true;
}

fn claim_root(seen_root: &mut bool) -> Result<(), ToolboxError> {
    if *seen_root {
        return Err(ToolboxError::Malformed("document has more than one root element".to_string()));
    }
    *seen_root = true;
    Ok(())
}

fn flush(writer: &mut Writer<Vec<u8>>, pending: &mut String) {
    if !pending.is_empty() {
        write_raw(writer, pending);
        pending.clear();
    }
}

fn write_raw(writer: &mut Writer<Vec<u8>>, text: &str) {
    writer.get_mut().extend_from_slice(text.as_bytes());
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), ToolboxError> {
    writer
        .write_event(event)
        .map_err(|e| ToolboxError::Write(e.to_string()))
}

fn malformed(position: impl Display, err: impl Display) -> ToolboxError {
    ToolboxError::Malformed(format!("{} (at byte {})", err, position))
}
