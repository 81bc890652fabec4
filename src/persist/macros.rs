//! Macro definitions for persistence.
//!
//! `persist_object!` builds the cached field table behind `PersistObject`.
//! Attribute scanning lives in its own file.

#[path = "macros/attr_helpers.rs"]
mod attr_helpers;
#[path = "macros/persist_object.rs"]
mod persist_object;
