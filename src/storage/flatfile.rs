//! Flat key-value files with properties-file semantics.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use serde::Serialize;

use crate::core::{PersistError, Result};
use crate::persist::SavedRecord;

/// Keys and values read from one flat-file resource. Keys are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParsedRecord {
    values: BTreeMap<String, String>,
}

impl ParsedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`; a later insert for the same key wins.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParsedRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl From<&SavedRecord> for ParsedRecord {
    fn from(saved: &SavedRecord) -> Self {
        saved.iter().collect()
    }
}

const BLANKS: [char; 3] = [' ', '\t', '\x0c'];

fn is_blank(c: char) -> bool {
    BLANKS.contains(&c)
}

pub struct FlatFileParser;

impl FlatFileParser {
    pub fn parse_str(text: &str) -> Result<ParsedRecord> {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let mut physical = normalized.split('\n');
        let mut record = ParsedRecord::new();

        while let Some(line) = physical.next() {
            let line = line.trim_start_matches(BLANKS);
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let mut logical = line.to_string();
            while continues(&logical) {
                logical.pop();
                match physical.next() {
                    Some(next) => logical.push_str(next.trim_start_matches(BLANKS)),
                    None => break,
                }
            }

            let (key, value) = split_entry(&logical)?;
            record.insert(key, value);
        }

        Ok(record)
    }

    pub fn parse_reader<R: Read>(mut reader: R) -> Result<ParsedRecord> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::parse_str(&text)
    }

    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<ParsedRecord> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            PersistError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse_str(&text)
    }
}

/// A line ending in an odd number of backslashes continues on the next one.
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> Result<(String, String)> {
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();

    let mut key_end = len;
    let mut value_start = len;
    let mut has_separator = false;
    let mut i = 0;
    while i < len {
        let c = chars[i];
        if c == '\\' {
            i += 2;
            continue;
        }
        if c == '=' || c == ':' {
            key_end = i;
            value_start = i + 1;
            has_separator = true;
            break;
        }
        if is_blank(c) {
            key_end = i;
            value_start = i + 1;
            break;
        }
        i += 1;
    }

    while value_start < len && is_blank(chars[value_start]) {
        value_start += 1;
    }
    if !has_separator && value_start < len && matches!(chars[value_start], '=' | ':') {
        value_start += 1;
        while value_start < len && is_blank(chars[value_start]) {
            value_start += 1;
        }
    }

    Ok((unescape(&chars[..key_end])?, unescape(&chars[value_start..])?))
}

fn unescape(chars: &[char]) -> Result<String> {
    let mut out = String::with_capacity(chars.len());
    let mut iter = chars.iter().copied();

    while let Some(c) = iter.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match iter.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let unit = read_unit(&mut iter)?;
                if (0xD800..0xDC00).contains(&unit) {
                    let low = match (iter.next(), iter.next()) {
                        (Some('\\'), Some('u')) => read_unit(&mut iter)?,
                        _ => {
                            return Err(PersistError::ParseError(format!(
                                "unpaired surrogate \\u{:04X}",
                                unit
                            )));
                        }
                    };
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(PersistError::ParseError(format!(
                            "invalid low surrogate \\u{:04X}",
                            low
                        )));
                    }
                    out.push(char_from(0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00))?);
                } else {
                    out.push(char_from(unit)?);
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

fn read_unit(iter: &mut impl Iterator<Item = char>) -> Result<u32> {
    let digits: String = iter.take(4).collect();
    if digits.chars().count() != 4 {
        return Err(PersistError::ParseError(format!(
            "truncated \\u escape '\\u{}'",
            digits
        )));
    }
    u32::from_str_radix(&digits, 16)
        .map_err(|_| PersistError::ParseError(format!("malformed \\u escape '\\u{}'", digits)))
}

fn char_from(code: u32) -> Result<char> {
    char::from_u32(code)
        .ok_or_else(|| PersistError::ParseError(format!("invalid code point U+{:04X}", code)))
}

/// Renders records in the format [`FlatFileParser`] reads.
#[derive(Debug, Clone, Default)]
pub struct FlatFileWriter {
    header: Option<String>,
}

impl FlatFileWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Comment written above the entries, one `#` line per header line.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn render(&self, record: &SavedRecord) -> String {
        self.render_entries(record.iter())
    }

    pub fn render_entries<'a>(&self, entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
        let mut out = String::new();
        if let Some(header) = &self.header {
            for line in header.lines() {
                out.push_str("# ");
                out.push_str(line);
                out.push('\n');
            }
        }
        for (key, value) in entries {
            out.push_str(&escape(key, true));
            out.push('=');
            out.push_str(&escape(value, false));
            out.push('\n');
        }
        out
    }

    pub fn write_file<P: AsRef<Path>>(&self, path: P, record: &SavedRecord) -> Result<()> {
        self.write_rendered(path.as_ref(), &self.render(record))
    }

    pub fn write_entries<'a, P: AsRef<Path>>(
        &self,
        path: P,
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<()> {
        self.write_rendered(path.as_ref(), &self.render_entries(entries))
    }

    /// Writes `<path>.tmp` and renames it over `path`.
    fn write_rendered(&self, path: &Path, text: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    PersistError::IoError(format!("Failed to create directory: {}", e))
                })?;
            }
        }
        let temp_path = path.with_extension("tmp");
        let temp_file = File::create(&temp_path)
            .map_err(|e| PersistError::IoError(format!("Failed to create temp file: {}", e)))?;
        let mut writer = BufWriter::new(temp_file);
        writer
            .write_all(text.as_bytes())
            .map_err(|e| PersistError::IoError(format!("Failed to write record: {}", e)))?;
        writer
            .flush()
            .map_err(|e| PersistError::IoError(format!("Failed to flush record: {}", e)))?;
        writer
            .get_mut()
            .sync_all()
            .map_err(|e| PersistError::IoError(format!("Failed to sync record: {}", e)))?;
        fs::rename(&temp_path, path)
            .map_err(|e| PersistError::IoError(format!("Failed to rename record: {}", e)))?;
        log::debug!("Wrote {}", path.display());
        Ok(())
    }
}

fn escape(text: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (idx, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            ' ' if is_key || idx == 0 => out.push_str("\\ "),
            '=' | ':' if is_key => {
                out.push('\\');
                out.push(c);
            }
            '#' | '!' if is_key && idx == 0 => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}
