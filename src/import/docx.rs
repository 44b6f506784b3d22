use regex::{Captures, Regex};
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

const BODY_ENTRY: &str = "word/document.xml";

static XML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9_.:-]*)[^>]*?(/?)>").unwrap());
static XML_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos);").unwrap());

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("could not read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not read document: {0}")]
    Archive(ZipError),

    #[error("could not read document: no word/document.xml in archive")]
    MissingBody,

    #[error("could not read document: body is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

impl From<ZipError> for DocumentError {
    fn from(e: ZipError) -> Self {
        match e {
            ZipError::FileNotFound => DocumentError::MissingBody,
            ZipError::Io(io) => DocumentError::Io(io),
            other => DocumentError::Archive(other),
        }
    }
}

/// Reads an import source file: `.docx` goes through text extraction,
/// anything else is read as UTF-8 text.
pub fn read_document(path: &Path) -> Result<String, DocumentError> {
    let is_docx = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("docx"));

    if is_docx {
        let bytes = fs::read(path)?;
        extract_docx_text(&bytes)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

/// Extracts the plain text of a Word document, one line per paragraph.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut entry = archive.by_name(BODY_ENTRY)?;
    let mut raw = Vec::new();
    entry.read_to_end(&mut raw)?;
    let xml = String::from_utf8(raw)?;

    let text = body_text(&xml);
    debug!(bytes = bytes.len(), chars = text.len(), "extracted document text");
    Ok(text)
}

// Walks the tags of document.xml keeping only text inside <w:t> runs.
fn body_text(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len() / 4);
    let mut in_run = false;
    let mut in_text = false;
    let mut last = 0;

    for caps in XML_TAG.captures_iter(xml) {
        let Some(tag) = caps.get(0) else { continue };
        if in_text {
            out.push_str(&decode_entities(&xml[last..tag.start()]));
        }
        last = tag.end();

        let closing = !caps[1].is_empty();
        let empty = !caps[3].is_empty();
        match &caps[2] {
            "w:p" if closing || empty => out.push('\n'),
            "w:r" => in_run = !closing && !empty,
            "w:t" => in_text = !closing && !empty,
            "w:tab" if in_run => out.push('\t'),
            "w:br" | "w:cr" if in_run => out.push('\n'),
            _ => {}
        }
    }

    out
}

fn decode_entities(text: &str) -> String {
    XML_ENTITY
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => {
                    let code = match entity.strip_prefix("#x") {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => entity[1..].parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), |c| c.to_string())
        })
        .into_owned()
}
