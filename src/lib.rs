// ============================================================================
// townydb Library
// ============================================================================

pub mod core;
pub mod domain;
pub mod persist;
pub mod storage;

// Re-export main types for convenience
pub use core::{DataType, PersistError, Result, SqlData, SqlRow, Value};
pub use domain::{Location, Resident, TownBlock};
pub use persist::{
    AdapterRegistry, FieldOutcome, HandlerConfig, InitMarker, LoadReport, Loaded, PersistHandler,
    PersistLoad, PersistObject, SavedRecord, TypeAdapter, TypeDescriptor,
};
pub use storage::{FlatFileParser, FlatFileWriter, ParsedRecord};
