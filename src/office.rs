//! Plain text from word-processor documents (DOCX and ODT are both zipped XML).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use zip::ZipArchive;

use crate::error::{DunningError, Result};

/// Where a format keeps its body text and which elements end a line.
struct Layout {
    entry: &'static str,
    line_breaks: &'static [&'static [u8]],
    block_ends: &'static [&'static [u8]],
}

const DOCX: Layout = Layout {
    entry: "word/document.xml",
    line_breaks: &[b"br"],
    block_ends: &[b"p"],
};

const ODT: Layout = Layout {
    entry: "content.xml",
    line_breaks: &[b"line-break", b"br"],
    block_ends: &[b"p", b"h"],
};

pub fn extract_text_from_docx(p: &Path) -> Result<String> {
    extract(p, &DOCX)
}

pub fn extract_text_from_odt(p: &Path) -> Result<String> {
    extract(p, &ODT)
}

fn extract(p: &Path, layout: &Layout) -> Result<String> {
    let file = File::open(p)?;
    let mut zip = ZipArchive::new(file).map_err(|e| DunningError::document(p, e))?;
    let mut entry = zip
        .by_name(layout.entry)
        .map_err(|_| DunningError::document(p, format!("missing {}", layout.entry)))?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;
    parse_xml(&xml, layout).map_err(|reason| DunningError::document(p, reason))
}

fn parse_xml(xml: &str, layout: &Layout) -> std::result::Result<String, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut out = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if layout.line_breaks.contains(&local_name(e.name().as_ref())) {
                    out.push('\n');
                }
            }
            Ok(Event::End(e)) => {
                if layout.block_ends.contains(&local_name(e.name().as_ref())) {
                    out.push('\n');
                }
            }
            Ok(Event::Text(t)) => {
                out.push_str(&t.decode().map_err(|e| e.to_string())?);
            }
            Ok(Event::GeneralRef(r)) => {
                if let Some(c) = r.resolve_char_ref().map_err(|e| e.to_string())? {
                    out.push(c);
                } else {
                    let name = r.decode().map_err(|e| e.to_string())?;
                    match resolve_predefined_entity(&name) {
                        Some(s) => out.push_str(s),
                        None => return Err(format!("unknown entity &{name};")),
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("XML parse failed: {e}")),
            _ => {}
        }
    }
    Ok(normalize_whitespace(&out))
}

fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|&b| b == b':') {
        Some(i) => &name[i + 1..],
        None => name,
    }
}

/// Trim every line, collapse runs of blank lines into one, drop trailing blanks.
fn normalize_whitespace(s: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in s.lines().map(str::trim) {
        if line.is_empty() && lines.last().is_none_or(|l| l.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
