//! Attribute values and the property types they are checked against.

use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Keyword attributes of one declaration, applied in key order.
pub type Attributes = BTreeMap<String, AttrValue>;

/// A value supplied for a component property.
///
/// Untagged so that declaration files can write plain TOML/JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<AttrValue>),
}

impl AttrValue {
    /// Short name of the value's shape, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Bool(_) => "bool",
            AttrValue::Int(_) => "int",
            AttrValue::Float(_) => "float",
            AttrValue::Str(_) => "string",
            AttrValue::List(_) => "list",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttrValue::Float(f) => Some(*f),
            AttrValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Convert this value to `ty`.
    ///
    /// Strict mode only widens `int` to `float`. Lenient mode also parses
    /// strings into bools and numbers and turns scalars into strings.
    /// On failure the original value is handed back.
    pub fn coerce(self, ty: &PropertyType, lenient: bool) -> Result<AttrValue, AttrValue> {
        match (ty, self) {
            (PropertyType::Bool, v @ AttrValue::Bool(_)) => Ok(v),
            (PropertyType::Int, v @ AttrValue::Int(_)) => Ok(v),
            (PropertyType::Float, v @ AttrValue::Float(_)) => Ok(v),
            (PropertyType::Float, AttrValue::Int(i)) => Ok(AttrValue::Float(i as f64)),
            (PropertyType::String, v @ AttrValue::Str(_)) => Ok(v),
            (PropertyType::List, v @ AttrValue::List(_)) => Ok(v),
            (PropertyType::OneOf(allowed), AttrValue::Str(s)) => {
                if allowed.iter().any(|a| a == &s) {
                    Ok(AttrValue::Str(s))
                } else {
                    Err(AttrValue::Str(s))
                }
            }
            (ty, v) if lenient => v.coerce_lenient(ty),
            (_, v) => Err(v),
        }
    }

    fn coerce_lenient(self, ty: &PropertyType) -> Result<AttrValue, AttrValue> {
        match (ty, self) {
            (PropertyType::Bool, AttrValue::Str(s)) => match s.trim() {
                "true" | "yes" | "on" => Ok(AttrValue::Bool(true)),
                "false" | "no" | "off" => Ok(AttrValue::Bool(false)),
                _ => Err(AttrValue::Str(s)),
            },
            (PropertyType::Int, AttrValue::Str(s)) => {
                s.trim().parse().map(AttrValue::Int).map_err(|_| AttrValue::Str(s))
            }
            (PropertyType::Float, AttrValue::Str(s)) => {
                s.trim().parse().map(AttrValue::Float).map_err(|_| AttrValue::Str(s))
            }
            (PropertyType::String, AttrValue::Bool(b)) => Ok(AttrValue::Str(b.to_string())),
            (PropertyType::String, AttrValue::Int(i)) => Ok(AttrValue::Str(i.to_string())),
            (PropertyType::String, AttrValue::Float(f)) => Ok(AttrValue::Str(f.to_string())),
            // a single item stands for a one-element list
            (PropertyType::List, v @ (AttrValue::Str(_) | AttrValue::Int(_))) => {
                Ok(AttrValue::List(vec![v]))
            }
            (_, v) => Err(v),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Int(i) => write!(f, "{i}"),
            AttrValue::Float(x) => write!(f, "{x}"),
            AttrValue::Str(s) => write!(f, "{s:?}"),
            AttrValue::List(items) => write!(f, "[{}]", items.iter().join(", ")),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int(i64::from(value))
    }
}

impl From<u32> for AttrValue {
    fn from(value: u32) -> Self {
        AttrValue::Int(i64::from(value))
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl<T: Into<AttrValue>> From<Vec<T>> for AttrValue {
    fn from(values: Vec<T>) -> Self {
        AttrValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Declared type of a component property.
///
/// In catalog files: `"bool"`, `"int"`, `"float"`, `"string"`, `"list"`
/// or `{ one_of = ["a", "b"] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Bool,
    Int,
    Float,
    String,
    List,
    OneOf(Vec<String>),
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyType::Bool => f.write_str("bool"),
            PropertyType::Int => f.write_str("int"),
            PropertyType::Float => f.write_str("float"),
            PropertyType::String => f.write_str("string"),
            PropertyType::List => f.write_str("list"),
            PropertyType::OneOf(values) => write!(f, "one of [{}]", values.iter().join(", ")),
        }
    }
}
