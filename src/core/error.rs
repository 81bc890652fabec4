use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Unsupported type: there is no adapter for {0}")]
    UnsupportedType(String),

    #[error("Adapter for {descriptor} does not support {capability}")]
    UnsupportedCapability {
        descriptor: String,
        capability: &'static str,
    },

    #[error("Invalid adapter: {0}")]
    InvalidAdapter(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Construction error: {0}")]
    ConstructionError(String),

    #[error("Field access error on '{field}': {reason}")]
    FieldAccessError { field: String, reason: String },

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl PersistError {
    /// Errors caused by adapter wiring rather than by the data being converted.
    ///
    /// These always propagate out of a save or load pass; everything else is
    /// collected per field.
    pub fn is_wiring_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedType(_) | Self::UnsupportedCapability { .. } | Self::InvalidAdapter(_)
        )
    }

    pub fn field_access(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FieldAccessError {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PersistError>;

impl From<std::io::Error> for PersistError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}
