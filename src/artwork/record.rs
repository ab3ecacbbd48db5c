use std::collections::BTreeMap;

use rusqlite::types::Value as SqlValue;
use serde_json::Value;

use crate::artwork::fields::{self, Kind, COLUMNS};
use crate::artwork::normalize::{deserialize_sequence, serialize_sequence};

/// A typed, present value. Absence is expressed by the field not existing.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Real(f64),
    Bool(bool),
    Text(String),
    Json(Value),
}

impl FieldValue {
    /// Maps a JSON value to a field of the given kind. `null` is no value.
    pub fn from_json(value: &Value, kind: Kind) -> Option<Self> {
        if kind == Kind::Json {
            return match value {
                Value::Null => None,
                other => Some(FieldValue::Json(other.clone())),
            };
        }

        match value {
            Value::Null => None,
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(FieldValue::Integer)
                .or_else(|| n.as_f64().map(FieldValue::Real)),
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            // Scalar column holding structured data: keep it as JSON text.
            Value::Array(_) | Value::Object(_) => Some(FieldValue::Json(value.clone())),
        }
    }

    pub fn from_sql(value: SqlValue, kind: Kind) -> Option<Self> {
        match (value, kind) {
            (SqlValue::Null, _) => None,
            (SqlValue::Text(s), Kind::Json) => Some(FieldValue::Json(deserialize_sequence(&s))),
            (SqlValue::Integer(i), Kind::Boolean) => Some(FieldValue::Bool(i != 0)),
            (SqlValue::Integer(i), _) => Some(FieldValue::Integer(i)),
            (SqlValue::Real(f), _) => Some(FieldValue::Real(f)),
            (SqlValue::Text(s), _) => Some(FieldValue::Text(s)),
            (SqlValue::Blob(b), _) => Some(FieldValue::Text(String::from_utf8_lossy(&b).into_owned())),
        }
    }

    pub fn to_sql(&self) -> SqlValue {
        match self {
            FieldValue::Integer(i) => SqlValue::Integer(*i),
            FieldValue::Real(f) => SqlValue::Real(*f),
            FieldValue::Bool(b) => SqlValue::Integer(i64::from(*b)),
            FieldValue::Text(s) => SqlValue::Text(s.clone()),
            FieldValue::Json(v) => SqlValue::Text(serialize_sequence(v)),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            FieldValue::Integer(i) => Some(*i != 0),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// One artwork as a sparse mapping from column name to typed value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtworkRecord {
    fields: BTreeMap<&'static str, FieldValue>,
}

impl ArtworkRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field. Names that are not columns of the table are ignored.
    pub fn set(&mut self, name: &str, value: FieldValue) {
        if let Some(column) = fields::column(name) {
            self.fields.insert(column.name, value);
        }
    }

    pub fn with(mut self, name: &str, value: FieldValue) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn id(&self) -> Option<i64> {
        self.get(fields::ID).and_then(FieldValue::as_i64)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FieldValue::as_i64)
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FieldValue::as_bool)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Projects the record onto the fixed column order of the table.
    pub fn into_row(mut self) -> Row {
        let values = COLUMNS
            .iter()
            .map(|column| self.fields.remove(column.name))
            .collect();
        Row { values }
    }
}

/// A fixed-arity row, one slot per entry of [`COLUMNS`].
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<Option<FieldValue>>,
}

impl Row {
    /// Builds a row from values already in column order.
    pub fn from_values(values: Vec<Option<FieldValue>>) -> Self {
        debug_assert_eq!(values.len(), COLUMNS.len());
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        fields::column_index(name).and_then(|i| self.values[i].as_ref())
    }

    pub fn id(&self) -> Option<i64> {
        self.get(fields::ID).and_then(FieldValue::as_i64)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn sql_values(&self) -> impl Iterator<Item = SqlValue> + '_ {
        self.values
            .iter()
            .map(|v| v.as_ref().map_or(SqlValue::Null, FieldValue::to_sql))
    }

    pub fn into_record(self) -> ArtworkRecord {
        let fields = COLUMNS
            .iter()
            .zip(self.values)
            .filter_map(|(column, value)| value.map(|v| (column.name, v)))
            .collect();
        ArtworkRecord { fields }
    }
}
