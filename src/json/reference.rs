//! Purpose: The reference backend: the value contract implemented directly on `serde_json::Value`.
//! Exports: trait impls only.
//! Role: Storage and ownership are serde_json's own tree; this module only adapts the views.
//! Invariants: Objects are serde_json's default `BTreeMap` maps, so enumeration is key-sorted.
//! Invariants: Non-finite floats become `null`, the same as in the compact backend.
//!
//! Members are deliberately kept in ascending key order rather than insertion
//! order. The compact engine's object map has no stable order, so sorting is the
//! one ordering both backends can share; enumeration and serialization of the
//! same content are therefore byte-identical across backends.
use serde_json::{Map, Value};

use super::convert::Scalar;
use super::{Json, Kind, parse, type_mismatch};
use crate::core::error::Error;

impl Json for Value {
    type Object = Map<String, Value>;
    type Array = Vec<Value>;

    fn parse(text: &str) -> Result<Self, Error> {
        parse::serde_value(text)
    }

    fn serialize(&self, pretty: bool) -> String {
        if pretty {
            format!("{self:#}")
        } else {
            self.to_string()
        }
    }

    fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Boolean,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        Value::as_bool(self)
    }

    fn as_f64(&self) -> Option<f64> {
        Value::as_f64(self)
    }

    fn as_i64(&self) -> Option<i64> {
        Value::as_i64(self)
    }

    fn as_u64(&self) -> Option<u64> {
        Value::as_u64(self)
    }

    fn as_str(&self) -> Option<&str> {
        Value::as_str(self)
    }

    fn as_slice(&self) -> Option<&[Self]> {
        match self {
            Value::Array(elements) => Some(elements.as_slice()),
            _ => None,
        }
    }

    fn as_mut_slice(&mut self) -> Option<&mut [Self]> {
        match self {
            Value::Array(elements) => Some(elements.as_mut_slice()),
            _ => None,
        }
    }

    fn as_object(&self) -> Option<&Map<String, Value>> {
        Value::as_object(self)
    }

    fn field(&self, key: &str) -> Option<&Self> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut Self> {
        match self {
            Value::Object(map) => map.get_mut(key),
            _ => None,
        }
    }

    fn field_or_null(&mut self, key: &str) -> Option<&mut Self> {
        match self {
            Value::Object(map) => Some(map.entry(key).or_insert(Value::Null)),
            _ => None,
        }
    }

    fn entries(&self) -> Option<Vec<(&str, &Self)>> {
        match self {
            Value::Object(map) => Some(
                map.iter()
                    .map(|(key, value)| (key.as_str(), value))
                    .collect(),
            ),
            _ => None,
        }
    }

    fn entries_mut(&mut self) -> Option<Vec<(&str, &mut Self)>> {
        match self {
            Value::Object(map) => Some(
                map.iter_mut()
                    .map(|(key, value)| (key.as_str(), value))
                    .collect(),
            ),
            _ => None,
        }
    }

    fn len(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::Array(elements) => elements.len(),
            Value::Object(map) => map.len(),
            _ => 1,
        }
    }

    fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Self)>,
    {
        Value::Object(entries.into_iter().collect())
    }

    fn from_elements<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Value::Array(elements.into_iter().collect())
    }

    fn from_object(object: Map<String, Value>) -> Self {
        Value::Object(object)
    }

    fn from_array(array: Vec<Value>) -> Self {
        Value::Array(array)
    }

    fn insert(&mut self, key: impl Into<String>, value: Self) -> Result<Option<Self>, Error> {
        if let Value::Null = self {
            *self = Value::Object(Map::new());
        }
        match self {
            Value::Object(map) => Ok(map.insert(key.into(), value)),
            other => Err(type_mismatch(Kind::Object, Json::kind(other))),
        }
    }

    fn remove(&mut self, key: &str) -> Option<Self> {
        match self {
            Value::Object(map) => map.remove(key),
            _ => None,
        }
    }

    fn push(&mut self, value: Self) -> Result<(), Error> {
        if let Value::Null = self {
            *self = Value::Array(Vec::new());
        }
        match self {
            Value::Array(elements) => {
                elements.push(value);
                Ok(())
            }
            other => Err(type_mismatch(Kind::Array, Json::kind(other))),
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        scalar.into_json()
    }
}
