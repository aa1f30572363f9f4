//! The dynamic value model shared by the interpreter and the template engine.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// An object owned by the embedding application.
///
/// The interpreter never inspects host objects directly: it asks for named
/// fields (plain fields and zero-argument accessors alike) and forwards
/// method calls by name.
pub trait HostObject: fmt::Debug + Send + Sync {
    /// Name used in error messages.
    fn type_name(&self) -> &str;

    /// Read a field or zero-argument accessor. `None` if there is no such member.
    fn field(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Invoke a method. `None` if the method does not exist; otherwise the
    /// returned values (a method may return several) or a host error message.
    fn call(&self, _method: &str, _args: &[Value]) -> Option<Result<Vec<Value>, String>> {
        None
    }

    /// The request capability (`Path()`, `Method()`, `URL()`) used by template
    /// interpolation, if this object offers it.
    fn request_info(&self) -> Option<&dyn RequestInfo> {
        None
    }
}

/// Accessors a request-like host object exposes to templates.
pub trait RequestInfo {
    fn path(&self) -> String;
    fn method(&self) -> String;
    fn url(&self) -> String;
}

/// A runtime value.
///
/// Maps only carry string keys. Values own their contents, so no reference
/// cycles can be built from frontmatter literals.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Nil,
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Opaque(Arc<dyn HostObject>),
}

impl Value {
    /// Wrap a host object.
    pub fn opaque(object: impl HostObject + 'static) -> Self {
        Value::Opaque(Arc::new(object))
    }

    /// Type name for error messages.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bool(_) => "bool",
            Value::Nil => "nil",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Opaque(obj) => obj.type_name(),
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Length of a list, map or string (in characters).
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::List(items) => Some(items.len()),
            Value::Map(entries) => Some(entries.len()),
            Value::String(s) => Some(s.chars().count()),
            _ => None,
        }
    }

    /// Template truthiness: `false`, zero, the empty string and the empty
    /// list are falsy; every other value, nil included, is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Nil | Value::Map(_) | Value::Opaque(_) => true,
        }
    }

    /// Look up `key` on a map or a host object.
    pub fn member(&self, key: &str) -> Option<Value> {
        match self {
            Value::Map(entries) => entries.get(key).cloned(),
            Value::Opaque(obj) => obj.field(key),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    /// Deep structural equality. Host objects compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// Text form used by template interpolation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Nil => Ok(()),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Map(entries) => {
                let parts: Vec<String> = entries.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            Value::Opaque(obj) => match obj.request_info() {
                Some(req) => write!(f, "{}", req.url()),
                None => write!(f, "<{}>", obj.type_name()),
            },
        }
    }
}

// ── Conversions ─────────────────────────────────────────────────────────────

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Value::Map(entries)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Nil, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    /// JSON numbers become `Int` when they fit an `i64`, `Float` otherwise.
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => {
                Value::Map(entries.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Nil => serializer.serialize_unit(),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Opaque(obj) => serializer.serialize_str(&format!("<{}>", obj.type_name())),
        }
    }
}
