//! Type descriptors and the traits that tie Rust types to them.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::codec::{Primitive, PrimitiveKind, encode_primitive};

/// Type-erased value moving between adapters and field slots.
pub type AnyValue = Box<dyn Any + Send + Sync>;

/// Identity of a non-primitive, non-list type.
///
/// Equality and hashing use the `TypeId` only; the name is kept for messages.
#[derive(Clone, Copy)]
pub struct ScalarType {
    id: TypeId,
    name: &'static str,
}

impl ScalarType {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Name without module paths, e.g. `DateTime<Utc>`.
    pub fn name(&self) -> String {
        short_name(self.name)
    }
}

impl PartialEq for ScalarType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ScalarType {}

impl Hash for ScalarType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScalarType({})", self.name())
    }
}

/// Registry key: distinguishes scalars, and lists by their element type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    Scalar(ScalarType),
    List(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    pub fn of<T: Persist>() -> Self {
        T::descriptor()
    }

    pub fn scalar<T: 'static>() -> Self {
        Self::Scalar(ScalarType::of::<T>())
    }

    pub fn list_of(element: TypeDescriptor) -> Self {
        Self::List(Box::new(element))
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            Self::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    pub fn element(&self) -> Option<&TypeDescriptor> {
        match self {
            Self::List(element) => Some(element),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => write!(f, "{}", kind),
            Self::Scalar(scalar) => write!(f, "{}", scalar.name()),
            Self::List(element) => write!(f, "List<{}>", element),
        }
    }
}

/// A value type the persistence layer knows how to describe.
///
/// `default_text` is the fallback text form used on save when no adapter is
/// registered for the descriptor.
pub trait Persist: Any + Send + Sync + Sized {
    fn descriptor() -> TypeDescriptor;

    fn default_text(&self) -> String;
}

/// Storage shape of a struct field: the value itself, or an optional value.
///
/// `Inner` is the type adapters and setters work with.
pub trait FieldSlot: Send + Sync + 'static {
    type Inner: Persist;

    fn present(&self) -> Option<&Self::Inner>;

    fn fill(&mut self, value: Self::Inner);
}

impl<T: Persist> FieldSlot for Option<T> {
    type Inner = T;

    fn present(&self) -> Option<&T> {
        self.as_ref()
    }

    fn fill(&mut self, value: T) {
        *self = Some(value);
    }
}

impl<T: Persist> Persist for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::list_of(T::descriptor())
    }

    fn default_text(&self) -> String {
        self.iter()
            .map(T::default_text)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl<T: Persist> FieldSlot for Vec<T> {
    type Inner = Vec<T>;

    fn present(&self) -> Option<&Vec<T>> {
        Some(self)
    }

    fn fill(&mut self, value: Vec<T>) {
        *self = value;
    }
}

/// Implements [`Persist`] and [`FieldSlot`] for `Display` value types that
/// are looked up by their own type identity.
#[macro_export]
macro_rules! persist_scalar {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::persist::Persist for $ty {
                fn descriptor() -> $crate::persist::TypeDescriptor {
                    $crate::persist::TypeDescriptor::scalar::<$ty>()
                }

                fn default_text(&self) -> ::std::string::String {
                    ::std::string::ToString::to_string(self)
                }
            }

            $crate::__persist_self_slot!($ty);
        )+
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! __persist_self_slot {
    ($ty:ty) => {
        impl $crate::persist::FieldSlot for $ty {
            type Inner = $ty;

            fn present(&self) -> ::std::option::Option<&$ty> {
                ::std::option::Option::Some(self)
            }

            fn fill(&mut self, value: $ty) {
                *self = value;
            }
        }
    };
}

macro_rules! persist_primitive {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl Persist for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::Primitive(PrimitiveKind::$variant)
                }

                fn default_text(&self) -> String {
                    encode_primitive(&Primitive::$variant(*self))
                }
            }

            crate::__persist_self_slot!($ty);
        )+
    };
}

persist_primitive! {
    i32 => Int,
    bool => Bool,
    char => Char,
    f32 => Float,
    f64 => Double,
    i64 => Long,
    i8 => Byte,
}

crate::persist_scalar!(String, Uuid, DateTime<Utc>);

fn short_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    let mut chars = full.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            segment.clear();
        } else if c.is_alphanumeric() || c == '_' {
            segment.push(c);
        } else {
            out.push_str(&segment);
            segment.clear();
            out.push(c);
        }
    }
    out.push_str(&segment);
    out
}
