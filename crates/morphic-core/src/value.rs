//! Runtime values shared by plans, capture tables and the interpreter
//!
//! `Value` is a closed enumeration. Data variants compare structurally while
//! `Object` and `Function` compare by identity, which is what lets the
//! synthesizer tell "the same captured object" apart from "an equal one".

use crate::error::EvalError;
use crate::function::Function;
use std::fmt;
use std::sync::Arc;

/// Opaque runtime object reachable from plans and closure arguments
pub trait Object: fmt::Debug + Send + Sync {
    /// Name used in diagnostics
    fn type_name(&self) -> &str;

    /// Member lookup (`target.name`)
    fn get_attr(&self, name: &str) -> Option<Value>;

    /// Keyed lookup (`target[key]`); objects are not subscriptable by default
    fn get_item(&self, _key: &Value) -> Option<Value> {
        None
    }

    /// JSON view for display purposes
    fn to_json(&self) -> Option<serde_json::Value> {
        None
    }
}

/// A dynamically typed runtime value
#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    /// Ordered key/value pairs; keys compare structurally
    Map(Vec<(Value, Value)>),
    Object(Arc<dyn Object>),
    Function(Function),
}

impl Value {
    /// Wrap an object into a shared value
    pub fn object(object: impl Object + 'static) -> Self {
        Value::Object(Arc::new(object))
    }

    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Name of the value's runtime type, used in error messages
    pub fn type_name(&self) -> &str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Map(_) => "dict",
            Value::Object(object) => object.type_name(),
            Value::Function(_) => "function",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Identity comparison: pointer equality for objects and functions,
    /// structural equality otherwise
    pub fn is_same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            (Value::Function(a), Value::Function(b)) => a.is_same(b),
            (Value::Object(_), _) | (_, Value::Object(_)) => false,
            (Value::Function(_), _) | (_, Value::Function(_)) => false,
            _ => self == other,
        }
    }

    /// Member access as performed by emitted `target.name` expressions
    pub fn get_attr(&self, name: &str) -> Result<Value, EvalError> {
        let found = match self {
            Value::Object(object) => object.get_attr(name),
            Value::Function(function) if name == "__name__" => {
                function.name().map(Value::str)
            }
            _ => None,
        };
        found.ok_or_else(|| EvalError::MissingAttribute {
            type_name: self.type_name().to_string(),
            attribute: name.to_string(),
        })
    }

    /// Keyed access as performed by emitted `target[key]` expressions
    pub fn get_item(&self, key: &Value) -> Result<Value, EvalError> {
        let found = match self {
            Value::List(items) | Value::Tuple(items) => match key.as_int() {
                Some(index) => normalize_index(index, items.len()).map(|i| items[i].clone()),
                None => {
                    return Err(EvalError::type_mismatch(
                        "int index",
                        key.type_name(),
                        format!("{} subscript", self.type_name()),
                    ))
                }
            },
            Value::Str(s) => match key.as_int() {
                Some(index) => {
                    let chars: Vec<char> = s.chars().collect();
                    normalize_index(index, chars.len()).map(|i| Value::Str(chars[i].to_string()))
                }
                None => {
                    return Err(EvalError::type_mismatch(
                        "int index",
                        key.type_name(),
                        "str subscript",
                    ))
                }
            },
            Value::Map(entries) => entries
                .iter()
                .find(|(k, _)| key_matches(k, key))
                .map(|(_, v)| v.clone()),
            Value::Object(object) => object.get_item(key),
            _ => None,
        };
        found.ok_or_else(|| EvalError::MissingItem {
            type_name: self.type_name().to_string(),
            key: key.to_string(),
        })
    }

    /// Convert a JSON document; JSON objects become maps with string keys
    pub fn from_json(json: serde_json::Value) -> Self {
        Self::convert_json(json, &|entries| {
            Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (Value::Str(k), v))
                    .collect(),
            )
        })
    }

    /// Convert a JSON document; JSON objects become [`Record`] objects so that
    /// emitted member access works on them
    pub fn from_json_as_records(json: serde_json::Value, type_name: &str) -> Self {
        Self::convert_json(json, &|entries| {
            Value::object(Record {
                type_name: type_name.to_string(),
                fields: entries,
            })
        })
    }

    fn convert_json(
        json: serde_json::Value,
        make_object: &dyn Fn(Vec<(String, Value)>) -> Value,
    ) -> Self {
        match json {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => Value::List(
                items
                    .into_iter()
                    .map(|item| Self::convert_json(item, make_object))
                    .collect(),
            ),
            serde_json::Value::Object(map) => make_object(
                map.into_iter()
                    .map(|(k, v)| (k, Self::convert_json(v, make_object)))
                    .collect(),
            ),
        }
    }

    /// JSON view used for display; values without a JSON form render as a
    /// descriptive string
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::None => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(n) => serde_json::Value::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(f.to_string())),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::List(items) | Value::Tuple(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| {
                        let key = match k {
                            Value::Str(s) => s.clone(),
                            other => other.to_string(),
                        };
                        (key, v.to_json())
                    })
                    .collect(),
            ),
            Value::Object(object) => object
                .to_json()
                .unwrap_or_else(|| serde_json::Value::String(format!("<{} object>", object.type_name()))),
            Value::Function(function) => serde_json::Value::String(function.to_string()),
        }
    }
}

fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let resolved = if index < 0 { len + index } else { index };
    (0..len).contains(&resolved).then(|| resolved as usize)
}

/// Mapping key equality: bools, ints and floats that are numerically equal
/// select the same entry
fn key_matches(a: &Value, b: &Value) -> bool {
    match (numeric_key(a), numeric_key(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn numeric_key(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Int(n) => Some(*n as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(_), Value::Object(_)) | (Value::Function(_), Value::Function(_)) => {
                self.is_same(other)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match crate::codegen::render_literal(self) {
            Some(literal) => f.write_str(&literal),
            None => match self {
                Value::Object(object) => write!(f, "<{} object>", object.type_name()),
                Value::Function(function) => write!(f, "{}", function),
                other => write!(f, "<{}>", other.type_name()),
            },
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
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

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Value::Function(function)
    }
}

/// Plain object with named fields
#[derive(Debug, Clone)]
pub struct Record {
    type_name: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Add or replace a field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
        self
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }
}

impl Object for Record {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn get_attr(&self, name: &str) -> Option<Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn get_item(&self, key: &Value) -> Option<Value> {
        key.as_str().and_then(|name| self.get_attr(name))
    }

    fn to_json(&self) -> Option<serde_json::Value> {
        Some(serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(n, v)| (n.clone(), v.to_json()))
                .collect(),
        ))
    }
}
