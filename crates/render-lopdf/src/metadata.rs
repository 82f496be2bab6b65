//! Document information and page footers.

use chrono::{DateTime, Local, TimeZone, Utc};
use lopdf::{Dictionary, Object, StringFormat};

pub const PRODUCER: &str = "inkpress";

/// `D:YYYYMMDDHHMMSSZ`, as used by the Info dictionary.
pub fn pdf_date(at: DateTime<Utc>) -> String {
    at.format("D:%Y%m%d%H%M%SZ").to_string()
}

/// A PDF text string: literal for ASCII, UTF-16BE with a byte order mark otherwise.
pub fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        Object::String(text.as_bytes().to_vec(), StringFormat::Literal)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}

/// Bytes for a standard font with `WinAnsiEncoding`; characters outside
/// Latin-1 become `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// The Info dictionary of a full document render.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    pub title: String,
    pub producer: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl DocumentInfo {
    /// Info for a document last changed at `modified`; it is also used as the
    /// creation date.
    pub fn new(title: impl Into<String>, modified: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            producer: PRODUCER.to_string(),
            created: modified,
            modified,
        }
    }

    pub(crate) fn to_dictionary(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Title", text_string(&self.title));
        dict.set("Producer", text_string(&self.producer));
        dict.set("CreationDate", Object::string_literal(pdf_date(self.created)));
        dict.set("ModDate", Object::string_literal(pdf_date(self.modified)));
        dict
    }
}

/// The line printed at the bottom of every page of a full document render.
#[derive(Debug, Clone, PartialEq)]
pub struct Footer {
    pub title: String,
    pub version: u32,
    /// Modification time, already formatted for display.
    pub stamp: String,
}

impl Footer {
    /// Footer showing `modified` in the local time zone.
    pub fn new(title: impl Into<String>, version: u32, modified: DateTime<Utc>) -> Self {
        Self::in_zone(title, version, modified, &Local)
    }

    pub fn in_zone<Tz: TimeZone>(
        title: impl Into<String>,
        version: u32,
        modified: DateTime<Utc>,
        zone: &Tz,
    ) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            title: title.into(),
            version,
            stamp: modified.with_timezone(zone).format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn text(&self, page: usize, total: usize) -> String {
        format!(
            "{} / {}  |  {} (v{}, {})",
            page, total, self.title, self.version, self.stamp
        )
    }
}
