use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::core::{PersistError, Result};

lazy_static! {
    /// Field names whose flat-file key differs from the field name.
    static ref REPLACEMENT_KEYS: HashMap<&'static str, &'static str> = {
        let mut keys = HashMap::new();
        keys.insert("outpostSpawns", "outpostspawns");
        keys
    };
}

/// Save/load engine configuration
///
/// Every field has a default, so a partial JSON document is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// Text written for absent values
    pub null_sentinel: String,

    /// Treat the sentinel as "no value" on load
    pub null_is_absent: bool,

    /// Field name to file key overrides
    pub field_remaps: HashMap<String, String>,

    /// Send one message per converted field to the sink
    pub report_fields: bool,

    /// Comment line written at the top of saved files
    pub file_header: Option<String>,
}

impl HandlerConfig {
    /// Create a configuration with the built-in remap table
    pub fn new() -> Self {
        Self {
            null_sentinel: "null".to_string(),
            null_is_absent: true,
            field_remaps: REPLACEMENT_KEYS
                .iter()
                .map(|(field, key)| (field.to_string(), key.to_string()))
                .collect(),
            report_fields: true,
            file_header: None,
        }
    }

    /// Set the null sentinel
    pub fn null_sentinel(mut self, sentinel: &str) -> Self {
        self.null_sentinel = sentinel.to_string();
        self
    }

    /// Load the sentinel as a literal value instead of skipping it
    pub fn null_is_absent(mut self, absent: bool) -> Self {
        self.null_is_absent = absent;
        self
    }

    /// Add a field name remap
    pub fn remap(mut self, field: &str, key: &str) -> Self {
        self.field_remaps.insert(field.to_string(), key.to_string());
        self
    }

    /// Enable or disable per-field messages
    pub fn report_fields(mut self, report: bool) -> Self {
        self.report_fields = report;
        self
    }

    /// Set the header comment for written files
    pub fn file_header(mut self, header: &str) -> Self {
        self.file_header = Some(header.to_string());
        self
    }

    /// File key for a field: the remapped name if one exists
    pub fn key_for<'a>(&'a self, field: &'a str) -> &'a str {
        self.field_remaps
            .get(field)
            .map(String::as_str)
            .unwrap_or(field)
    }

    /// Is `text` the "no value" marker under this configuration
    pub fn is_null_text(&self, text: &str) -> bool {
        self.null_is_absent && text == self.null_sentinel
    }

    /// Parse from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| PersistError::ParseError(format!("Invalid handler config: {}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PersistError::ParseError(format!("Cannot encode handler config: {}", e)))
    }
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_remaps() {
        let config = HandlerConfig::default();
        assert_eq!(config.key_for("outpostSpawns"), "outpostspawns");
        assert_eq!(config.key_for("name"), "name");
        assert!(config.is_null_text("null"));
        assert!(!config.clone().null_is_absent(false).is_null_text("null"));
    }

    #[test]
    fn test_builder() {
        let config = HandlerConfig::new()
            .null_sentinel("none")
            .remap("townBlocks", "townblocks")
            .report_fields(false)
            .file_header("town data");

        assert_eq!(config.null_sentinel, "none");
        assert_eq!(config.key_for("townBlocks"), "townblocks");
        assert!(!config.report_fields);
        assert_eq!(config.file_header.as_deref(), Some("town data"));
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = HandlerConfig::from_json(r#"{ "null_sentinel": "-", "report_fields": false }"#)
            .unwrap();
        assert_eq!(config.null_sentinel, "-");
        assert!(config.null_is_absent);
        assert!(!config.report_fields);
        assert_eq!(config.key_for("outpostSpawns"), "outpostspawns");

        let round = HandlerConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(round, config);

        assert!(matches!(
            HandlerConfig::from_json("{ not json").unwrap_err(),
            PersistError::ParseError(_)
        ));
    }
}
