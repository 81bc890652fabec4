//! Per-field results of save and load passes.

use std::fmt;

use crate::core::PersistError;

/// Flat representation of one object: `(key, text)` pairs in field order.
#[derive(Debug, Default)]
pub struct SavedRecord {
    entries: Vec<(String, String)>,
    failures: Vec<(String, PersistError)>,
}

impl SavedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing an earlier entry with the same key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn record_failure(&mut self, field: impl Into<String>, error: PersistError) {
        self.failures.push((field.into(), error));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Fields that could not be converted and were left out.
    pub fn failures(&self) -> &[(String, PersistError)] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for SavedRecord {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

#[derive(Debug)]
pub enum FieldOutcome {
    Converted,
    /// Key absent from the record; the constructed default was kept.
    SkippedMissing,
    /// Value decoded to "no value"; the constructed default was kept.
    SkippedNoValue,
    Failed(PersistError),
}

impl FieldOutcome {
    pub fn is_converted(&self) -> bool {
        matches!(self, Self::Converted)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::SkippedMissing | Self::SkippedNoValue)
    }

    pub fn error(&self) -> Option<&PersistError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for FieldOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converted => f.write_str("converted"),
            Self::SkippedMissing => f.write_str("skipped (missing)"),
            Self::SkippedNoValue => f.write_str("skipped (no value)"),
            Self::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

#[derive(Debug)]
pub struct FieldReport {
    pub field: &'static str,
    /// Key the value was looked up under, after remapping.
    pub key: String,
    pub outcome: FieldOutcome,
}

#[derive(Debug, Default)]
pub struct LoadReport {
    fields: Vec<FieldReport>,
    /// Set when the resource could not be read and an empty record was used.
    pub resource_error: Option<PersistError>,
}

impl LoadReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, key: impl Into<String>, outcome: FieldOutcome) {
        self.fields.push(FieldReport {
            field,
            key: key.into(),
            outcome,
        });
    }

    pub fn fields(&self) -> &[FieldReport] {
        &self.fields
    }

    pub fn outcome(&self, field: &str) -> Option<&FieldOutcome> {
        self.fields
            .iter()
            .find(|report| report.field == field)
            .map(|report| &report.outcome)
    }

    pub fn converted(&self) -> impl Iterator<Item = &FieldReport> {
        self.fields.iter().filter(|report| report.outcome.is_converted())
    }

    pub fn failures(&self) -> impl Iterator<Item = &FieldReport> {
        self.fields
            .iter()
            .filter(|report| matches!(report.outcome, FieldOutcome::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some() || self.resource_error.is_some()
    }
}

/// Result of a load pass: the object and what happened to each field.
#[derive(Debug)]
pub struct Loaded<O> {
    pub object: O,
    pub report: LoadReport,
}

impl<O> Loaded<O> {
    pub fn into_object(self) -> O {
        self.object
    }

    pub fn into_parts(self) -> (O, LoadReport) {
        (self.object, self.report)
    }
}
