//! Adapters installed by [`AdapterRegistry::with_default_adapters`].
//!
//! [`AdapterRegistry::with_default_adapters`]: super::AdapterRegistry::with_default_adapters

pub mod base;
pub mod list;

pub use base::{IntegerAdapter, StringAdapter, TextAdapter, TimestampAdapter, UuidAdapter};
pub use list::ListAdapter;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Location, Resident, TownBlock};

use super::adapter::TypeAdapter;

pub(crate) fn builtin_adapters() -> Vec<TypeAdapter> {
    vec![
        TypeAdapter::builder::<String>().full(StringAdapter).build(),
        TypeAdapter::builder::<Uuid>().full(UuidAdapter).build(),
        TypeAdapter::builder::<i32>().full(IntegerAdapter).build(),
        TypeAdapter::builder::<DateTime<Utc>>()
            .full(TimestampAdapter)
            .build(),
        TypeAdapter::builder::<Resident>()
            .full(TextAdapter::<Resident>::new())
            .build(),
        TypeAdapter::builder::<Location>()
            .full(TextAdapter::<Location>::new())
            .build(),
        TypeAdapter::builder::<TownBlock>()
            .full(TextAdapter::<TownBlock>::new())
            .build(),
        TypeAdapter::builder::<Vec<Resident>>()
            .full(ListAdapter::<Resident>::new(","))
            .build(),
        TypeAdapter::builder::<Vec<Location>>()
            .full(ListAdapter::<Location>::new(";"))
            .build(),
    ]
}
