// Copyright 2025 Cowboy AI, LLC.

//! Dynamic values carried by descriptors and instances
//!
//! A [`Value`] is the unit of data the engine merges. Its variant decides its
//! structural [`Kind`]: `List` is an ordered sequence, `Record` is a keyed
//! record, and everything else merges as an opaque scalar.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::callable::{Hook, Method};
use crate::template::Template;

/// Keyed record, iterated in insertion order
pub type Record = IndexMap<String, Value>;

/// Structural kind used by the merge rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    /// Anything that is replaced wholesale on merge
    Scalar,
    /// Ordered sequence, merged by de-duplicating concatenation
    Sequence,
    /// Keyed record, merged key by key
    Record,
}

/// A dynamically typed value
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absence marker
    #[default]
    Nil,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// String
    Str(String),
    /// Ordered sequence
    List(Vec<Value>),
    /// Keyed record
    Record(Record),
    /// Instance method
    Method(Method),
    /// Initializer, composer or method-table hook
    Hook(Hook),
    /// A composed template
    Template(Template),
}

impl Value {
    /// Structural kind of this value
    pub fn kind(&self) -> Kind {
        match self {
            Value::List(_) => Kind::Sequence,
            Value::Record(_) => Kind::Record,
            _ => Kind::Scalar,
        }
    }

    /// Human readable name of the variant, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Record(_) => "record",
            Value::Method(_) => "method",
            Value::Hook(hook) => hook.type_name(),
            Value::Template(_) => "template",
        }
    }

    /// Check for the absence marker
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Truthiness: everything except `Nil` and `false`
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Borrow as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Read as an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Borrow as a list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow as a record
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Mutably borrow as a record
    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Borrow as a method
    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Value::Method(method) => Some(method),
            _ => None,
        }
    }

    /// Borrow as a template
    pub fn as_template(&self) -> Option<&Template> {
        match self {
            Value::Template(template) => Some(template),
            _ => None,
        }
    }

    /// Convert data-only values to JSON
    ///
    /// Returns `None` if the value contains a callable, a template, or a
    /// non-finite float.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        Some(match self {
            Value::Nil => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Value::Number(serde_json::Number::from_f64(*f)?),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => serde_json::Value::Array(
                items.iter().map(Value::to_json).collect::<Option<Vec<_>>>()?,
            ),
            Value::Record(record) => {
                let mut map = serde_json::Map::new();
                for (key, value) in record {
                    map.insert(key.clone(), value.to_json()?);
                }
                serde_json::Value::Object(map)
            }
            Value::Method(_) | Value::Hook(_) | Value::Template(_) => return None,
        })
    }
}

/// Data compares structurally, callables and templates by identity
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Method(a), Value::Method(b)) => a == b,
            (Value::Hook(a), Value::Hook(b)) => a == b,
            (Value::Template(a), Value::Template(b)) => Template::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

impl From<Method> for Value {
    fn from(method: Method) -> Self {
        Value::Method(method)
    }
}

impl From<Template> for Value {
    fn from(template: Template) -> Self {
        Value::Template(template)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Nil, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Record(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Build a [`Record`] from `key => value` pairs
///
/// ```rust
/// use cim_compose::{record, Value};
///
/// let stats = record! { "Health" => 100, "Name" => "Knight" };
/// assert_eq!(stats.get("Health"), Some(&Value::Int(100)));
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::Record::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::Record::new();
        $(record.insert(::std::string::String::from($key), $crate::Value::from($value));)+
        record
    }};
}
