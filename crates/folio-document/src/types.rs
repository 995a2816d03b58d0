//! Folio Document Types
//!
//! Core data types for document storage: identifiers, values and documents.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

// =============================================================================
// Document ID
// =============================================================================

/// Unique identifier for a document. Integer ids keep their kind so they
/// are written back as numbers; integer ids order before string ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    Int(i64),
    String(String),
}

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self::String(id.into())
    }

    /// Generate a process-unique identifier.
    pub fn generate() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let seq = COUNTER.fetch_add(1, AtomicOrdering::Relaxed);
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::String(format!("{:016x}{:08x}", nanos, seq))
    }

    /// Id from a stored `_id` or reference value. Only integers and strings
    /// identify documents.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => Some(Self::Int(*n)),
            Value::String(s) => Some(Self::String(s.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(n) => Value::Int(*n),
            Self::String(s) => Value::String(s.clone()),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Int(n) => JsonValue::Number((*n).into()),
            Self::String(s) => JsonValue::String(s.clone()),
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<i64> for DocumentId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

// =============================================================================
// Value
// =============================================================================

/// A document value that can be any JSON-compatible type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Self::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Get a value at a path (e.g., "user.address.city").
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let parts: Vec<&str> = path.split('.').collect();
        self.get_path_parts(&parts)
    }

    fn get_path_parts(&self, parts: &[&str]) -> Option<&Value> {
        if parts.is_empty() {
            return Some(self);
        }

        let key = parts[0];
        let rest = &parts[1..];

        match self {
            Self::Object(obj) => obj.get(key).and_then(|v| v.get_path_parts(rest)),
            Self::Array(arr) => key
                .parse::<usize>()
                .ok()
                .and_then(|idx| arr.get(idx))
                .and_then(|v| v.get_path_parts(rest)),
            _ => None,
        }
    }

    /// Rank of the value's type in the cross-type sort order:
    /// null, numbers, strings, objects, arrays, booleans.
    fn type_rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Int(_) | Self::Float(_) => 1,
            Self::String(_) => 2,
            Self::Object(_) => 3,
            Self::Array(_) => 4,
            Self::Bool(_) => 5,
        }
    }

    /// Total order over values, used by sorts and ordered indexes.
    /// Integers and floats compare numerically.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (a, b) if a.is_number() && b.is_number() => {
                let (x, y) = (a.as_f64().unwrap_or_default(), b.as_f64().unwrap_or_default());
                x.total_cmp(&y)
            }
            (Self::String(a), Self::String(b)) => a.cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Array(a), Self::Array(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    let ord = x.total_cmp(y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (Self::Object(a), Self::Object(b)) => {
                for ((ka, va), (kb, vb)) in a.iter().zip(b.iter()) {
                    let ord = ka.cmp(kb).then_with(|| va.total_cmp(vb));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (a, b) => a.type_rank().cmp(&b.type_rank()),
        }
    }

    /// Equality where `Int(3)` and `Float(3.0)` are the same value.
    pub fn loose_eq(&self, other: &Value) -> bool {
        self.total_cmp(other) == Ordering::Equal
    }

    /// Convert from serde_json::Value.
    pub fn from_json(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Self::Float(f)
                } else {
                    Self::Float(0.0)
                }
            }
            JsonValue::String(s) => Self::String(s),
            JsonValue::Array(arr) => Self::Array(arr.into_iter().map(Self::from_json).collect()),
            JsonValue::Object(obj) => {
                Self::Object(obj.into_iter().map(|(k, v)| (k, Self::from_json(v))).collect())
            }
        }
    }

    /// Convert to serde_json::Value.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Int(n) => JsonValue::Number((*n).into()),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Self::String(s) => JsonValue::String(s.clone()),
            Self::Array(arr) => JsonValue::Array(arr.iter().map(|v| v.to_json()).collect()),
            Self::Object(obj) => {
                JsonValue::Object(obj.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(n as i64)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        i64::try_from(n).map(Self::Int).unwrap_or(Self::Float(n as f64))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(arr: Vec<Value>) -> Self {
        Self::Array(arr)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(obj: BTreeMap<String, Value>) -> Self {
        Self::Object(obj)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Self::Null)
    }
}

// =============================================================================
// Field Access
// =============================================================================

/// Anything filters and pipeline stages can read fields from.
pub trait FieldAccess {
    /// Resolve a (possibly dotted) field path.
    fn field(&self, path: &str) -> Option<&Value>;
}

impl FieldAccess for Value {
    fn field(&self, path: &str) -> Option<&Value> {
        self.get_path(path)
    }
}

// =============================================================================
// Document
// =============================================================================

/// A document in the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(flatten)]
    pub data: BTreeMap<String, Value>,
}

impl Document {
    /// Create a document with a specific ID.
    pub fn with_id(id: impl Into<DocumentId>) -> Self {
        Self {
            id: id.into(),
            data: BTreeMap::new(),
        }
    }

    /// Create a document from a JSON object. A string or integer `_id` is
    /// kept as the document id; a missing `_id` is generated.
    pub fn from_json(json: JsonValue) -> Option<Self> {
        match json {
            JsonValue::Object(mut obj) => {
                let id = match obj.remove("_id") {
                    Some(JsonValue::String(s)) => DocumentId::String(s),
                    Some(JsonValue::Number(n)) => match n.as_i64() {
                        Some(i) => DocumentId::Int(i),
                        None => DocumentId::String(n.to_string()),
                    },
                    Some(JsonValue::Null) | None => DocumentId::generate(),
                    Some(_) => return None,
                };

                let data = obj
                    .into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect();

                Some(Self { id, data })
            }
            _ => None,
        }
    }

    /// Convert to JSON.
    pub fn to_json(&self) -> JsonValue {
        let mut obj = serde_json::Map::new();
        obj.insert("_id".to_string(), self.id.to_json());

        for (k, v) in &self.data {
            obj.insert(k.clone(), v.to_json());
        }

        JsonValue::Object(obj)
    }

    /// Convert to an object value with `_id` as a regular field, the row
    /// shape used by aggregation pipelines.
    pub fn to_value(&self) -> Value {
        let mut obj = self.data.clone();
        obj.insert("_id".to_string(), self.id.to_value());
        Value::Object(obj)
    }

    /// Get a field value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match key.split_once('.') {
            Some((head, rest)) => self.data.get(head).and_then(|v| v.get_path(rest)),
            None => self.data.get(key),
        }
    }

    /// Set a field value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    /// Copy of this document keeping only the listed top-level fields.
    /// The id is always kept.
    pub fn project(&self, fields: &[String]) -> Document {
        let data = self
            .data
            .iter()
            .filter(|(k, _)| fields.iter().any(|f| f == *k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Document {
            id: self.id.clone(),
            data,
        }
    }

    /// Size of the JSON encoding in bytes.
    pub fn encoded_size(&self) -> usize {
        self.to_json().to_string().len()
    }
}

impl FieldAccess for Document {
    fn field(&self, path: &str) -> Option<&Value> {
        self.get(path)
    }
}

// =============================================================================
// Tests
// =============================================================================
