pub mod error;
pub mod types;
pub mod value;

pub use error::{PersistError, Result};
pub use types::{Column, SqlData, SqlRow};
pub use value::{DataType, Value};
