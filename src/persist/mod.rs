//! Field-walking persistence: type adapters, their registry, per-type field
//! tables and the save/load engine.

pub mod adapter;
pub mod codec;
pub mod config;
pub mod defaults;
pub mod descriptor;
pub mod fields;
pub mod handler;
mod macros;
pub mod registry;
pub mod report;
pub mod sink;

pub use adapter::{
    AdapterBuilder, Capability, LoadHandler, SaveHandler, SqlLoadHandler, SqlSaveHandler, TypeAdapter,
};
pub use codec::{Primitive, PrimitiveKind, decode_primitive, encode_primitive};
pub use config::HandlerConfig;
pub use defaults::{ListAdapter, TextAdapter};
pub use descriptor::{AnyValue, FieldSlot, Persist, ScalarType, TypeDescriptor};
pub use fields::{
    FieldAccess, FieldDescriptor, FieldSetter, FieldTable, InitMarker, PersistLoad, PersistObject, SlotField,
};
pub use handler::PersistHandler;
pub use registry::AdapterRegistry;
pub use report::{FieldOutcome, FieldReport, LoadReport, Loaded, SavedRecord};
pub use sink::{LogSink, MessageSink, NullSink};
