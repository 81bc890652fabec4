use super::{DataType, PersistError, Result, Value};

/// One converted value together with the column type its adapter declares.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlData {
    pub data_type: DataType,
    pub value: Value,
}

impl SqlData {
    pub fn new(data_type: DataType, value: Value) -> Self {
        Self { data_type, value }
    }

    pub fn null(data_type: DataType) -> Self {
        Self {
            data_type,
            value: Value::Null,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.data_type.is_compatible(&self.value) {
            return Err(PersistError::TypeMismatch(format!(
                "Column expects type {}, got {}",
                self.data_type,
                self.value.type_name()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub data: SqlData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: SqlData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Named, ordered SQL projection of one object.
#[derive(Debug, Clone, Default)]
pub struct SqlRow {
    columns: Vec<Column>,
}

impl SqlRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column, replacing an existing one with the same name.
    pub fn push(&mut self, name: impl Into<String>, data: SqlData) {
        let name = name.into();
        match self.find_column_index(&name) {
            Some(idx) => self.columns[idx].data = data,
            None => self.columns.push(Column::new(name, data)),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn find_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&SqlData> {
        self.find_column_index(name).map(|idx| &self.columns[idx].data)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).map(|data| &data.value)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_push_replaces_by_name() {
        let mut row = SqlRow::new();
        row.push("name", SqlData::new(DataType::Text, Value::from("Alice")));
        row.push("age", SqlData::new(DataType::Integer, Value::Integer(30)));
        row.push("name", SqlData::new(DataType::Text, Value::from("Bob")));

        assert_eq!(row.column_count(), 2);
        assert_eq!(row.value("name"), Some(&Value::from("Bob")));
        assert_eq!(row.find_column_index("age"), Some(1));
        assert!(row.get("missing").is_none());
    }

    #[test]
    fn test_sql_data_validation() {
        assert!(SqlData::null(DataType::Uuid).validate().is_ok());
        assert!(SqlData::new(DataType::Integer, Value::Integer(1)).validate().is_ok());
        let err = SqlData::new(DataType::Integer, Value::from("x")).validate().unwrap_err();
        assert!(matches!(err, PersistError::TypeMismatch(_)));
    }
}
