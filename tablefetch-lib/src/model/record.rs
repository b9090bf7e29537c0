//! Dynamic JSON row

use std::cmp::Ordering;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;

use super::TableRow;

/// Field holding the identity key of a record.
const ID_FIELD: &str = "id";

/// A dynamic row backed by a JSON object.
///
/// Useful when the row shape is not known at compile time, e.g. when the
/// endpoint is given on the command line. The identity key is the `id` field
/// (see [`RecordId`]); sorting compares the named field with an ordering
/// over JSON values.
///
/// # Example
///
/// ```
/// use tablefetch_lib::model::{JsonRecord, RecordId, TableRow};
///
/// let record: JsonRecord = serde_json::from_str(r#"{"id": 7, "name": "Ada"}"#).unwrap();
/// assert_eq!(record.id(), RecordId::Number("7".to_string()));
/// assert_eq!(record.get_str("name"), Some("Ada"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonRecord {
    fields: Map<String, Value>,
}

impl JsonRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, returning the record for chaining.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the field as a string slice if it is a JSON string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    /// Returns the underlying JSON object.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consumes the record and returns the underlying JSON object.
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

/// Identity key of a [`JsonRecord`].
///
/// Keys of different JSON types never collide, so `1` and `"1"` are distinct
/// rows. A record without a usable `id` is keyed by its whole content; only
/// identical id-less records deduplicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordId {
    /// A string `id`.
    Text(String),
    /// A numeric `id` in its JSON rendering.
    Number(String),
    /// A boolean, array or object `id` in its JSON rendering.
    Other(String),
    /// Missing or `null` `id`; the record in its JSON rendering.
    Content(String),
}

impl RecordId {
    /// Returns `true` if the record had no usable `id`.
    pub fn is_content(&self) -> bool {
        matches!(self, Self::Content(_))
    }
}

impl From<Map<String, Value>> for JsonRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl TableRow for JsonRecord {
    type Id = RecordId;

    fn id(&self) -> RecordId {
        match self.fields.get(ID_FIELD) {
            Some(Value::String(s)) => RecordId::Text(s.clone()),
            Some(Value::Number(n)) => RecordId::Number(n.to_string()),
            Some(Value::Null) | None => RecordId::Content(Value::Object(self.fields.clone()).to_string()),
            Some(other) => RecordId::Other(other.to_string()),
        }
    }

    fn compare_column(&self, other: &Self, column: &str) -> Ordering {
        compare_values(
            self.fields.get(column).unwrap_or(&Value::Null),
            other.fields.get(column).unwrap_or(&Value::Null),
        )
    }
}

/// Rank of a JSON value type in the cross-type ordering.
fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Ordering over JSON values.
///
/// `null < bool < number < string < array < object`. Integers compare
/// exactly; an integer and a float of equal value tie. Strings compare
/// case-insensitively first, then byte-wise so distinct strings never tie.
/// Objects compare entry by entry in key order.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y),
        (Value::String(x), Value::String(y)) => x
            .to_lowercase()
            .cmp(&y.to_lowercase())
            .then_with(|| x.cmp(y)),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y.iter())
            .map(|(a, b)| compare_values(a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (Value::Object(x), Value::Object(y)) => {
            let mut x: Vec<_> = x.iter().collect();
            let mut y: Vec<_> = y.iter().collect();
            x.sort_by(|a, b| a.0.cmp(b.0));
            y.sort_by(|a, b| a.0.cmp(b.0));
            x.iter()
                .zip(y.iter())
                .map(|((ka, va), (kb, vb))| ka.cmp(kb).then_with(|| compare_values(va, vb)))
                .find(|ord| ord.is_ne())
                .unwrap_or_else(|| x.len().cmp(&y.len()))
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn compare_numbers(x: &Number, y: &Number) -> Ordering {
    match (as_integer(x), as_integer(y)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
    }
}

fn as_integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}
