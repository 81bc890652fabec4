use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::{DataType, PersistError, Result, Value};
use crate::persist::adapter::{LoadHandler, SaveHandler, SqlLoadHandler, SqlSaveHandler};
use crate::persist::registry::AdapterRegistry;

fn sql_text<'a>(value: &'a Value, what: &str) -> Result<&'a str> {
    value.as_str().ok_or_else(|| {
        PersistError::TypeMismatch(format!("{} expects a text column, got {}", what, value.type_name()))
    })
}

/// Strings are stored verbatim.
pub struct StringAdapter;

impl SaveHandler<String> for StringAdapter {
    fn to_file_string(&self, value: &String, _: &AdapterRegistry) -> Result<String> {
        Ok(value.clone())
    }
}

impl LoadHandler<String> for StringAdapter {
    fn from_file_string(&self, text: &str, _: &AdapterRegistry) -> Result<Option<String>> {
        Ok(Some(text.to_string()))
    }
}

impl SqlSaveHandler<String> for StringAdapter {
    fn sql_type(&self) -> DataType {
        DataType::Text
    }

    fn to_sql(&self, value: &String, _: &AdapterRegistry) -> Result<Value> {
        Ok(Value::Text(value.clone()))
    }
}

impl SqlLoadHandler<String> for StringAdapter {
    fn from_sql(&self, value: &Value, _: &AdapterRegistry) -> Result<Option<String>> {
        Ok(Some(sql_text(value, "string")?.to_string()))
    }
}

/// UUIDs use the hyphenated form in files and the native UUID column type.
pub struct UuidAdapter;

impl SaveHandler<Uuid> for UuidAdapter {
    fn to_file_string(&self, value: &Uuid, _: &AdapterRegistry) -> Result<String> {
        Ok(value.to_string())
    }
}

impl LoadHandler<Uuid> for UuidAdapter {
    fn from_file_string(&self, text: &str, _: &AdapterRegistry) -> Result<Option<Uuid>> {
        Uuid::parse_str(text.trim())
            .map(Some)
            .map_err(|e| PersistError::ParseError(format!("invalid uuid '{}': {}", text, e)))
    }
}

impl SqlSaveHandler<Uuid> for UuidAdapter {
    fn sql_type(&self) -> DataType {
        DataType::Uuid
    }

    fn to_sql(&self, value: &Uuid, _: &AdapterRegistry) -> Result<Value> {
        Ok(Value::Uuid(*value))
    }
}

impl SqlLoadHandler<Uuid> for UuidAdapter {
    fn from_sql(&self, value: &Value, _: &AdapterRegistry) -> Result<Option<Uuid>> {
        value.as_uuid().map(Some).ok_or_else(|| {
            PersistError::TypeMismatch(format!("expected a uuid, got {}", value.type_name()))
        })
    }
}

/// The "integer" adapter. Flat-file loads of `i32` fields use the primitive
/// codec; this adapter serves saves and the SQL layer.
pub struct IntegerAdapter;

impl SaveHandler<i32> for IntegerAdapter {
    fn to_file_string(&self, value: &i32, _: &AdapterRegistry) -> Result<String> {
        Ok(value.to_string())
    }
}

impl LoadHandler<i32> for IntegerAdapter {
    fn from_file_string(&self, text: &str, _: &AdapterRegistry) -> Result<Option<i32>> {
        text.parse::<i32>()
            .map(Some)
            .map_err(|e| PersistError::ParseError(format!("invalid integer '{}': {}", text, e)))
    }
}

impl SqlSaveHandler<i32> for IntegerAdapter {
    fn sql_type(&self) -> DataType {
        DataType::Integer
    }

    fn to_sql(&self, value: &i32, _: &AdapterRegistry) -> Result<Value> {
        Ok(Value::Integer(i64::from(*value)))
    }
}

impl SqlLoadHandler<i32> for IntegerAdapter {
    fn from_sql(&self, value: &Value, _: &AdapterRegistry) -> Result<Option<i32>> {
        let wide = value.as_i64().ok_or_else(|| {
            PersistError::TypeMismatch(format!("expected an integer, got {}", value.type_name()))
        })?;
        i32::try_from(wide)
            .map(Some)
            .map_err(|_| PersistError::ParseError(format!("integer {} out of range", wide)))
    }
}

/// Timestamps: epoch milliseconds in files, RFC 3339 text in SQL.
pub struct TimestampAdapter;

impl SaveHandler<DateTime<Utc>> for TimestampAdapter {
    fn to_file_string(&self, value: &DateTime<Utc>, _: &AdapterRegistry) -> Result<String> {
        Ok(value.timestamp_millis().to_string())
    }
}

impl LoadHandler<DateTime<Utc>> for TimestampAdapter {
    fn from_file_string(&self, text: &str, _: &AdapterRegistry) -> Result<Option<DateTime<Utc>>> {
        let millis = text
            .trim()
            .parse::<i64>()
            .map_err(|e| PersistError::ParseError(format!("invalid timestamp '{}': {}", text, e)))?;
        DateTime::<Utc>::from_timestamp_millis(millis)
            .map(Some)
            .ok_or_else(|| PersistError::ParseError(format!("timestamp {} out of range", millis)))
    }
}

impl SqlSaveHandler<DateTime<Utc>> for TimestampAdapter {
    fn sql_type(&self) -> DataType {
        DataType::Text
    }

    fn to_sql(&self, value: &DateTime<Utc>, _: &AdapterRegistry) -> Result<Value> {
        Ok(Value::Text(value.to_rfc3339()))
    }
}

impl SqlLoadHandler<DateTime<Utc>> for TimestampAdapter {
    fn from_sql(&self, value: &Value, _: &AdapterRegistry) -> Result<Option<DateTime<Utc>>> {
        let text = sql_text(value, "timestamp")?;
        DateTime::parse_from_rfc3339(text)
            .map(|parsed| Some(parsed.with_timezone(&Utc)))
            .map_err(|e| PersistError::ParseError(format!("invalid timestamp '{}': {}", text, e)))
    }
}

/// Adapter for domain value types whose `Display`/`FromStr` pair is their
/// file form. SQL stores the same text.
pub struct TextAdapter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> TextAdapter<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for TextAdapter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SaveHandler<T> for TextAdapter<T>
where
    T: Display,
{
    fn to_file_string(&self, value: &T, _: &AdapterRegistry) -> Result<String> {
        Ok(value.to_string())
    }
}

impl<T> LoadHandler<T> for TextAdapter<T>
where
    T: FromStr<Err = PersistError>,
{
    fn from_file_string(&self, text: &str, _: &AdapterRegistry) -> Result<Option<T>> {
        text.parse::<T>().map(Some)
    }
}

impl<T> SqlSaveHandler<T> for TextAdapter<T>
where
    T: Display,
{
    fn sql_type(&self) -> DataType {
        DataType::Text
    }

    fn to_sql(&self, value: &T, _: &AdapterRegistry) -> Result<Value> {
        Ok(Value::Text(value.to_string()))
    }
}

impl<T> SqlLoadHandler<T> for TextAdapter<T>
where
    T: FromStr<Err = PersistError>,
{
    fn from_sql(&self, value: &Value, registry: &AdapterRegistry) -> Result<Option<T>> {
        self.from_file_string(sql_text(value, "text adapter")?, registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TownBlock;

    #[test]
    fn test_uuid_round_trip() {
        let registry = AdapterRegistry::new();
        let id = Uuid::new_v4();
        let text = UuidAdapter.to_file_string(&id, &registry).unwrap();
        assert_eq!(UuidAdapter.from_file_string(&text, &registry).unwrap(), Some(id));
        assert!(UuidAdapter.from_file_string("not-a-uuid", &registry).is_err());
        assert_eq!(UuidAdapter.from_sql(&Value::Text(text), &registry).unwrap(), Some(id));
    }

    #[test]
    fn test_integer_sql_range() {
        let registry = AdapterRegistry::new();
        assert_eq!(IntegerAdapter.to_sql(&7, &registry).unwrap(), Value::Integer(7));
        assert_eq!(IntegerAdapter.from_sql(&Value::Integer(7), &registry).unwrap(), Some(7));
        assert!(IntegerAdapter.from_sql(&Value::Integer(i64::MAX), &registry).is_err());
        assert!(IntegerAdapter.from_sql(&Value::from("7"), &registry).is_err());
    }

    #[test]
    fn test_timestamp_forms() {
        let registry = AdapterRegistry::new();
        let at = DateTime::<Utc>::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(
            TimestampAdapter.to_file_string(&at, &registry).unwrap(),
            "1700000000123"
        );
        assert_eq!(
            TimestampAdapter.from_file_string("1700000000123", &registry).unwrap(),
            Some(at)
        );

        let sql = TimestampAdapter.to_sql(&at, &registry).unwrap();
        assert_eq!(TimestampAdapter.from_sql(&sql, &registry).unwrap(), Some(at));
    }

    #[test]
    fn test_text_adapter_reports_parse_errors() {
        let registry = AdapterRegistry::new();
        let adapter = TextAdapter::<TownBlock>::new();
        let err = adapter.from_file_string("world,x,1", &registry).unwrap_err();
        assert!(matches!(err, PersistError::ParseError(_)));
    }
}
