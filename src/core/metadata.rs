//! # Metadata Module
//!
//! EXIF date extraction for still images.
//!
//! Only `DateTimeOriginal` matters for triage: its presence alone makes an
//! image admissible, and its raw string value is carried into the report
//! untouched. Unreadable files or missing tags simply yield `None` - the
//! classifier turns that into the mtime-fallback path.

use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read the EXIF `DateTimeOriginal` tag as its raw string value.
///
/// Returns `None` on any failure - open, parse, or absent tag; EXIF
/// problems are never fatal.
pub fn date_taken(path: &Path) -> Option<String> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(&file);
    let exif = Reader::new().read_from_container(&mut reader).ok()?;

    let field = exif.get_field(Tag::DateTimeOriginal, In::PRIMARY)?;
    if let Value::Ascii(ref vec) = field.value {
        if let Some(bytes) = vec.first() {
            if let Ok(s) = std::str::from_utf8(bytes) {
                let trimmed = s.trim_end_matches('\0').trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}
