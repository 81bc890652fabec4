//! Text codec for the built-in scalar kinds.
//!
//! Primitive fields never go through the adapter registry on load: their text
//! is decoded here, strictly, and the caller decides whether a failure is
//! fatal or just means "field absent".

use std::fmt;

use crate::core::{PersistError, Result};

use super::descriptor::AnyValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Int,
    Bool,
    Char,
    Float,
    Double,
    Long,
    Byte,
}

impl PrimitiveKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Char => "char",
            Self::Float => "float",
            Self::Double => "double",
            Self::Long => "long",
            Self::Byte => "byte",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Int(i32),
    Bool(bool),
    Char(char),
    Float(f32),
    Double(f64),
    Long(i64),
    Byte(i8),
}

impl Primitive {
    /// Boxes the value as the matching Rust scalar so it can be assigned to
    /// a field slot of that type.
    pub fn into_any(self) -> AnyValue {
        match self {
            Self::Int(v) => Box::new(v),
            Self::Bool(v) => Box::new(v),
            Self::Char(v) => Box::new(v),
            Self::Float(v) => Box::new(v),
            Self::Double(v) => Box::new(v),
            Self::Long(v) => Box::new(v),
            Self::Byte(v) => Box::new(v),
        }
    }
}

pub fn encode_primitive(value: &Primitive) -> String {
    match value {
        Primitive::Int(v) => v.to_string(),
        Primitive::Bool(v) => v.to_string(),
        Primitive::Char(v) => v.to_string(),
        Primitive::Float(v) => v.to_string(),
        Primitive::Double(v) => v.to_string(),
        Primitive::Long(v) => v.to_string(),
        Primitive::Byte(v) => v.to_string(),
    }
}

pub fn decode_primitive(text: &str, kind: PrimitiveKind) -> Result<Primitive> {
    let malformed = |detail: &dyn fmt::Display| {
        PersistError::ParseError(format!("'{}' is not a valid {}: {}", text, kind, detail))
    };

    match kind {
        PrimitiveKind::Int => text.parse::<i32>().map(Primitive::Int).map_err(|e| malformed(&e)),
        PrimitiveKind::Long => text.parse::<i64>().map(Primitive::Long).map_err(|e| malformed(&e)),
        PrimitiveKind::Byte => text.parse::<i8>().map(Primitive::Byte).map_err(|e| malformed(&e)),
        PrimitiveKind::Float => text.parse::<f32>().map(Primitive::Float).map_err(|e| malformed(&e)),
        PrimitiveKind::Double => {
            text.parse::<f64>().map(Primitive::Double).map_err(|e| malformed(&e))
        }
        PrimitiveKind::Bool => {
            if text.eq_ignore_ascii_case("true") {
                Ok(Primitive::Bool(true))
            } else if text.eq_ignore_ascii_case("false") {
                Ok(Primitive::Bool(false))
            } else {
                Err(malformed(&"expected true or false"))
            }
        }
        PrimitiveKind::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Primitive::Char(c)),
                (None, _) => Err(malformed(&"empty text")),
                (Some(_), Some(_)) => Err(malformed(&"more than one character")),
            }
        }
    }
}
