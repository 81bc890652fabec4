//! The save/load engine.
//!
//! Every pass walks the static field table of the object type. Wiring
//! errors (no adapter, missing capability) abort the pass; any other
//! failure is reported for the field and the walk moves on.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::core::{PersistError, Result, SqlData, SqlRow, Value};
use crate::storage::{FlatFileParser, FlatFileWriter, ParsedRecord};

use super::adapter::{Capability, TypeAdapter};
use super::codec::decode_primitive;
use super::config::HandlerConfig;
use super::descriptor::{AnyValue, Persist, TypeDescriptor};
use super::fields::{FieldDescriptor, InitMarker, PersistLoad, PersistObject};
use super::registry::AdapterRegistry;
use super::report::{FieldOutcome, LoadReport, Loaded, SavedRecord};
use super::sink::{LogSink, MessageSink};

#[derive(Clone)]
pub struct PersistHandler {
    registry: Arc<AdapterRegistry>,
    config: Arc<HandlerConfig>,
    sink: Arc<dyn MessageSink>,
}

impl PersistHandler {
    /// Handler over the built-in adapters with the default configuration.
    pub fn new() -> Self {
        Self::with_registry(Arc::new(AdapterRegistry::with_default_adapters()))
    }

    pub fn with_registry(registry: Arc<AdapterRegistry>) -> Self {
        Self {
            registry,
            config: Arc::new(HandlerConfig::default()),
            sink: Arc::new(LogSink),
        }
    }

    pub fn with_config(mut self, config: HandlerConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    pub fn with_sink(mut self, sink: impl MessageSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn with_shared_sink(mut self, sink: Arc<dyn MessageSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn registry(&self) -> &Arc<AdapterRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    pub fn register_adapter<T: Persist>(&self, adapter: TypeAdapter) -> Result<()> {
        self.registry.register_type::<T>(adapter)
    }

    // ------------------------------------------------------------------
    // Value level
    // ------------------------------------------------------------------

    /// Text form of one value. `None` is the null sentinel; without an
    /// adapter the value's default text is used.
    pub fn to_file_string<T: Persist>(&self, value: Option<&T>) -> Result<String> {
        let Some(value) = value else {
            return Ok(self.config.null_sentinel.clone());
        };
        match self.registry.lookup(&T::descriptor()) {
            Some(adapter) => adapter.save_text(value, &self.registry),
            None => Ok(value.default_text()),
        }
    }

    /// Decodes text with the registered adapter, which is mandatory here.
    /// The empty string is "no value" and never reaches the adapter.
    pub fn from_file_string<T: Persist>(&self, text: &str) -> Result<Option<T>> {
        let adapter = self.registry.require(&T::descriptor())?;
        if text.is_empty() {
            return Ok(None);
        }
        adapter.require(Capability::LoadText)?;
        adapter.from_file_string::<T>(text, &self.registry)
    }

    /// SQL form of one value; needs an adapter with the SQL save capability.
    pub fn to_sql<T: Persist>(&self, value: &T) -> Result<SqlData> {
        let adapter = self.registry.require(&T::descriptor())?;
        adapter.to_sql(value, &self.registry)
    }

    /// Decodes a raw SQL value. `Value::Null` is "no value".
    pub fn from_sql<T: Persist>(&self, value: &Value) -> Result<Option<T>> {
        let adapter = self.registry.require(&T::descriptor())?;
        adapter.require(Capability::LoadSql)?;
        if value.is_null() {
            return Ok(None);
        }
        adapter.from_sql::<T>(value, &self.registry)
    }

    // ------------------------------------------------------------------
    // Flat files
    // ------------------------------------------------------------------

    pub fn save<O: PersistObject>(&self, object: &O) -> Result<SavedRecord> {
        let mut record = SavedRecord::new();

        for field in O::fields() {
            let key = self.config.key_for(field.name());
            match self.encode_field(field, object) {
                Ok(text) => {
                    self.report(key, &text);
                    record.insert(key, text);
                }
                Err(err) if err.is_wiring_error() => return Err(err),
                Err(err) => {
                    log::warn!(
                        "Failed to save field '{}' of {}: {}",
                        field.name(),
                        std::any::type_name::<O>(),
                        err
                    );
                    record.record_failure(field.name(), err);
                }
            }
        }

        Ok(record)
    }

    pub fn save_to_file<O: PersistObject, P: AsRef<Path>>(&self, object: &O, path: P) -> Result<SavedRecord> {
        let record = self.save(object)?;
        self.writer().write_file(path, &record)?;
        Ok(record)
    }

    /// Writer configured with this handler's file header.
    pub fn writer(&self) -> FlatFileWriter {
        match &self.config.file_header {
            Some(header) => FlatFileWriter::new().with_header(header.clone()),
            None => FlatFileWriter::new(),
        }
    }

    pub fn load<O: PersistLoad>(&self, record: &ParsedRecord) -> Result<Loaded<O>> {
        let mut object = construct::<O>()?;
        let mut report = LoadReport::new();

        for field in O::fields() {
            let key = self.config.key_for(field.name());
            let Some(text) = record.get(key) else {
                log::debug!("No value for '{}', keeping default", key);
                report.push(field.name(), key, FieldOutcome::SkippedMissing);
                continue;
            };

            let outcome = self.settle::<O>(field, self.load_field(field, &mut object, text))?;
            if outcome.is_converted() {
                self.report(key, text);
            }
            report.push(field.name(), key, outcome);
        }

        Ok(Loaded { object, report })
    }

    /// Loads from a file. An unreadable file is reported on the load report
    /// and the object keeps all of its constructed defaults.
    pub fn load_file<O: PersistLoad, P: AsRef<Path>>(&self, path: P) -> Result<Loaded<O>> {
        let path = path.as_ref();
        let (record, resource_error) = match FlatFileParser::parse_file(path) {
            Ok(record) => (record, None),
            Err(err) => {
                log::warn!("Could not read {}: {}", path.display(), err);
                (ParsedRecord::new(), Some(err))
            }
        };

        let mut loaded = self.load::<O>(&record)?;
        loaded.report.resource_error = resource_error;
        Ok(loaded)
    }

    // ------------------------------------------------------------------
    // SQL rows
    // ------------------------------------------------------------------

    /// SQL projection of an object. Every field needs an adapter with the
    /// SQL save capability; nothing falls back to text.
    pub fn to_sql_row<O: PersistObject>(&self, object: &O) -> Result<SqlRow> {
        let mut row = SqlRow::new();

        for field in O::fields() {
            let adapter = self.registry.require(field.descriptor())?;
            let data = match field.read(object) {
                Some(value) => adapter.save_sql(value, &self.registry)?,
                None => SqlData::null(adapter.sql_type()?),
            };
            row.push(field.name(), data);
        }

        Ok(row)
    }

    /// Fills an object from a row whose column names are field names.
    pub fn load_sql_row<O: PersistLoad>(&self, row: &SqlRow) -> Result<Loaded<O>> {
        let mut object = construct::<O>()?;
        let mut report = LoadReport::new();

        for field in O::fields() {
            let Some(value) = row.value(field.name()) else {
                report.push(field.name(), field.name(), FieldOutcome::SkippedMissing);
                continue;
            };

            let outcome = self.settle::<O>(field, self.load_sql_field(field, &mut object, value))?;
            if outcome.is_converted() {
                self.report(field.name(), &value.to_string());
            }
            report.push(field.name(), field.name(), outcome);
        }

        Ok(Loaded { object, report })
    }

    // ------------------------------------------------------------------
    // Field steps
    // ------------------------------------------------------------------

    fn encode_field<O>(&self, field: &FieldDescriptor<O>, object: &O) -> Result<String> {
        let Some(value) = field.read(object) else {
            return Ok(self.config.null_sentinel.clone());
        };
        match self.registry.lookup(field.descriptor()) {
            Some(adapter) => adapter.save_text(value, &self.registry),
            None => Ok(field
                .fallback_text(object)
                .unwrap_or_else(|| self.config.null_sentinel.clone())),
        }
    }

    /// Primitives go through the codec, everything else through the
    /// registered adapter.
    fn decode_text(&self, descriptor: &TypeDescriptor, text: &str) -> Result<Option<AnyValue>> {
        if self.config.is_null_text(text) {
            return Ok(None);
        }
        if let Some(kind) = descriptor.primitive_kind() {
            return decode_primitive(text, kind).map(|value| Some(value.into_any()));
        }

        let adapter = self.registry.require(descriptor)?;
        if text.is_empty() {
            return Ok(None);
        }
        adapter.require(Capability::LoadText)?;
        adapter.load_text(text, &self.registry)
    }

    fn load_field<O>(&self, field: &FieldDescriptor<O>, object: &mut O, text: &str) -> Result<FieldOutcome> {
        match self.decode_text(field.descriptor(), text)? {
            Some(value) => {
                store(field, object, value)?;
                Ok(FieldOutcome::Converted)
            }
            None => Ok(FieldOutcome::SkippedNoValue),
        }
    }

    fn load_sql_field<O>(&self, field: &FieldDescriptor<O>, object: &mut O, value: &Value) -> Result<FieldOutcome> {
        let adapter = self.registry.require(field.descriptor())?;
        adapter.require(Capability::LoadSql)?;
        if value.is_null() {
            return Ok(FieldOutcome::SkippedNoValue);
        }
        match adapter.load_sql(value, &self.registry)? {
            Some(decoded) => {
                store(field, object, decoded)?;
                Ok(FieldOutcome::Converted)
            }
            None => Ok(FieldOutcome::SkippedNoValue),
        }
    }

    /// Wiring errors propagate; anything else becomes the field's outcome.
    fn settle<O>(&self, field: &FieldDescriptor<O>, result: Result<FieldOutcome>) -> Result<FieldOutcome> {
        match result {
            Ok(outcome) => {
                if matches!(outcome, FieldOutcome::SkippedNoValue) {
                    log::debug!("'{}' has no value, keeping default", field.name());
                }
                Ok(outcome)
            }
            Err(err) if err.is_wiring_error() => Err(err),
            Err(err) => {
                log::warn!(
                    "Failed to load field '{}' of {}: {}",
                    field.name(),
                    std::any::type_name::<O>(),
                    err
                );
                Ok(FieldOutcome::Failed(err))
            }
        }
    }

    fn report(&self, key: &str, text: &str) {
        if self.config.report_fields {
            self.sink.send(&format!("{}={}", key, text));
        }
    }
}

fn construct<O: PersistLoad>() -> Result<O> {
    O::construct(InitMarker::default()).map_err(|err| match err {
        PersistError::ConstructionError(_) => err,
        other => PersistError::ConstructionError(format!(
            "{}: {}",
            std::any::type_name::<O>(),
            other
        )),
    })
}

/// Setter failures are reported against the field they belong to.
fn store<O>(field: &FieldDescriptor<O>, object: &mut O, value: AnyValue) -> Result<()> {
    field.store(object, value).map_err(|err| match err {
        PersistError::FieldAccessError { .. } | PersistError::TypeMismatch(_) => err,
        other if other.is_wiring_error() => other,
        other => PersistError::field_access(field.name(), other.to_string()),
    })
}

impl Default for PersistHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PersistHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistHandler")
            .field("adapters", &self.registry.len())
            .field("config", &self.config)
            .finish()
    }
}
