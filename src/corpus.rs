//! FAQ corpus loading.
//!
//! The corpus is a UTF-8 JSON file whose top level is an array. Every
//! element becomes one [`Document`] whose text is the element serialized
//! back to JSON, so question/answer pairs stay together as the model sees
//! them. Loading is all-or-nothing.
//!
//! Element text uses `", "` and `": "` separators with non-ASCII characters
//! escaped as `\uXXXX`, matching the text the corpus was originally
//! embedded with.

use std::io;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::Value;

use crate::error::CorpusLoadError;
use crate::models::Document;

/// Load the corpus file at `path` into an ordered list of documents.
///
/// # Errors
///
/// - [`CorpusLoadError::Read`] if the file is missing or unreadable.
/// - [`CorpusLoadError::Parse`] if the content is not valid JSON.
/// - [`CorpusLoadError::NotAnArray`] if the top-level value is not an array.
/// - [`CorpusLoadError::Encode`] if an element cannot be serialized.
pub fn load_corpus(path: &Path) -> Result<Vec<Document>, CorpusLoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| CorpusLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let value: Value = serde_json::from_str(&content).map_err(|source| CorpusLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(CorpusLoadError::NotAnArray {
                path: path.to_path_buf(),
                found: json_type_name(&other),
            })
        }
    };

    let source = path.display().to_string();
    let documents = items
        .iter()
        .enumerate()
        .map(|(position, item)| {
            let text = element_text(item).map_err(|err| CorpusLoadError::Encode {
                path: path.to_path_buf(),
                position,
                source: err,
            })?;
            Ok(Document {
                text,
                position,
                seq_num: position + 1,
                source: source.clone(),
            })
        })
        .collect::<Result<Vec<_>, CorpusLoadError>>()?;

    tracing::info!(
        "Loaded {} documents from {}",
        documents.len(),
        path.display()
    );

    Ok(documents)
}

/// Serialize one corpus element to its document text.
fn element_text(item: &Value) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedAsciiFormatter);
    item.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// JSON formatter writing `", "` / `": "` separators and ASCII-only strings.
struct SpacedAsciiFormatter;

impl Formatter for SpacedAsciiFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + io::Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
