//! Purpose: The compact backend: a zero-overhead wrapper over simd-json's owned tree.
//! Exports: `Compact`.
//! Role: Lets engine nodes be viewed in place as contract values without copying.
//! Invariants: `Compact` has exactly the size and alignment of `OwnedValue` (checked at compile time).
//! Invariants: Enumeration and serialization sort members by key; the engine map itself is unordered.
//! Invariants: Read-only indexing never inserts; missing keys read as a shared `null`.
//! Invariants: Reading past the end of an array panics, like `IndexMut` does.
//! Invariants: NaN and infinities are stored as `null`, matching serde_json's `From<f64>`.
use std::fmt;
use std::ops::{Index, IndexMut};

use simd_json::owned::Object;
use simd_json::{OwnedValue, StaticNode};

use super::convert::{JsonEq, Scalar};
use super::{Json, Kind, equivalent, parse, type_mismatch};
use crate::core::error::Error;

mod cast;

/// A JSON document backed by simd-json.
///
/// `&OwnedValue` can be viewed as `&Compact` (and slices likewise) with [`Compact::wrap`],
/// so documents produced by simd-json elsewhere join the contract without a copy.
#[repr(transparent)]
#[derive(Clone, Debug)]
pub struct Compact(OwnedValue);

const _: () = {
    assert!(std::mem::size_of::<Compact>() == std::mem::size_of::<OwnedValue>());
    assert!(std::mem::align_of::<Compact>() == std::mem::align_of::<OwnedValue>());
};

static NULL: Compact = Compact(OwnedValue::Static(StaticNode::Null));

impl Compact {
    pub fn wrap(node: &OwnedValue) -> &Compact {
        cast::node(node)
    }

    pub fn wrap_mut(node: &mut OwnedValue) -> &mut Compact {
        cast::node_mut(node)
    }

    pub fn wrap_slice(nodes: &[OwnedValue]) -> &[Compact] {
        cast::nodes(nodes)
    }

    pub fn node(&self) -> &OwnedValue {
        &self.0
    }

    pub fn into_node(self) -> OwnedValue {
        self.0
    }
}

impl Default for Compact {
    fn default() -> Self {
        Compact(OwnedValue::Static(StaticNode::Null))
    }
}

impl Json for Compact {
    type Object = Object;
    type Array = Vec<Compact>;

    fn parse(text: &str) -> Result<Self, Error> {
        parse::simd_value(text).map(Compact)
    }

    fn serialize(&self, pretty: bool) -> String {
        if pretty {
            format!("{self:#}")
        } else {
            self.to_string()
        }
    }

    fn kind(&self) -> Kind {
        match &self.0 {
            OwnedValue::Static(StaticNode::Null) => Kind::Null,
            OwnedValue::Static(StaticNode::Bool(_)) => Kind::Boolean,
            OwnedValue::Static(_) => Kind::Number,
            OwnedValue::String(_) => Kind::String,
            OwnedValue::Array(_) => Kind::Array,
            OwnedValue::Object(_) => Kind::Object,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match &self.0 {
            OwnedValue::Static(StaticNode::Bool(flag)) => Some(*flag),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match &self.0 {
            OwnedValue::Static(StaticNode::I64(number)) => Some(*number as f64),
            OwnedValue::Static(StaticNode::U64(number)) => Some(*number as f64),
            OwnedValue::Static(StaticNode::F64(number)) => Some(*number),
            _ => None,
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match &self.0 {
            OwnedValue::Static(StaticNode::I64(number)) => Some(*number),
            OwnedValue::Static(StaticNode::U64(number)) => i64::try_from(*number).ok(),
            _ => None,
        }
    }

    fn as_u64(&self) -> Option<u64> {
        match &self.0 {
            OwnedValue::Static(StaticNode::I64(number)) => u64::try_from(*number).ok(),
            OwnedValue::Static(StaticNode::U64(number)) => Some(*number),
            _ => None,
        }
    }

    fn as_str(&self) -> Option<&str> {
        match &self.0 {
            OwnedValue::String(text) => Some(text.as_str()),
            _ => None,
        }
    }

    fn as_slice(&self) -> Option<&[Self]> {
        match &self.0 {
            OwnedValue::Array(elements) => Some(cast::nodes(elements)),
            _ => None,
        }
    }

    fn as_mut_slice(&mut self) -> Option<&mut [Self]> {
        match &mut self.0 {
            OwnedValue::Array(elements) => Some(cast::nodes_mut(elements)),
            _ => None,
        }
    }

    fn as_object(&self) -> Option<&Self::Object> {
        match &self.0 {
            OwnedValue::Object(map) => {
                let map: &Object = map;
                Some(map)
            }
            _ => None,
        }
    }

    fn field(&self, key: &str) -> Option<&Self> {
        match &self.0 {
            OwnedValue::Object(map) => map.get(key).map(cast::node),
            _ => None,
        }
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut Self> {
        match &mut self.0 {
            OwnedValue::Object(map) => map.get_mut(key).map(cast::node_mut),
            _ => None,
        }
    }

    fn field_or_null(&mut self, key: &str) -> Option<&mut Self> {
        match &mut self.0 {
            OwnedValue::Object(map) => {
                if !map.contains_key(key) {
                    map.insert(key.to_owned(), OwnedValue::Static(StaticNode::Null));
                }
                map.get_mut(key).map(cast::node_mut)
            }
            _ => None,
        }
    }

    fn entries(&self) -> Option<Vec<(&str, &Self)>> {
        match &self.0 {
            OwnedValue::Object(map) => {
                let mut entries: Vec<(&str, &Self)> = map
                    .iter()
                    .map(|(key, value)| (key.as_str(), cast::node(value)))
                    .collect();
                entries.sort_unstable_by(|left, right| left.0.cmp(right.0));
                Some(entries)
            }
            _ => None,
        }
    }

    fn entries_mut(&mut self) -> Option<Vec<(&str, &mut Self)>> {
        match &mut self.0 {
            OwnedValue::Object(map) => {
                let mut entries: Vec<(&str, &mut Self)> = map
                    .iter_mut()
                    .map(|(key, value)| (key.as_str(), cast::node_mut(value)))
                    .collect();
                entries.sort_unstable_by(|left, right| left.0.cmp(right.0));
                Some(entries)
            }
            _ => None,
        }
    }

    fn len(&self) -> usize {
        match &self.0 {
            OwnedValue::Static(StaticNode::Null) => 0,
            OwnedValue::Array(elements) => elements.len(),
            OwnedValue::Object(map) => map.len(),
            _ => 1,
        }
    }

    fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Self)>,
    {
        let mut object = Object::default();
        for (key, value) in entries {
            object.insert(key, value.0);
        }
        Compact(OwnedValue::from(object))
    }

    fn from_elements<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let nodes: Vec<OwnedValue> = elements.into_iter().map(Compact::into_node).collect();
        Compact(OwnedValue::from(nodes))
    }

    fn from_object(object: Self::Object) -> Self {
        Compact(OwnedValue::from(object))
    }

    fn from_array(array: Self::Array) -> Self {
        Self::from_elements(array)
    }

    fn insert(&mut self, key: impl Into<String>, value: Self) -> Result<Option<Self>, Error> {
        if self.is_null() {
            *self = Self::new_object();
        }
        let found = self.kind();
        match &mut self.0 {
            OwnedValue::Object(map) => Ok(map.insert(key.into(), value.0).map(Compact)),
            _ => Err(type_mismatch(Kind::Object, found)),
        }
    }

    fn remove(&mut self, key: &str) -> Option<Self> {
        match &mut self.0 {
            OwnedValue::Object(map) => map.remove(key).map(Compact),
            _ => None,
        }
    }

    fn push(&mut self, value: Self) -> Result<(), Error> {
        if self.is_null() {
            *self = Self::new_array();
        }
        let found = self.kind();
        match &mut self.0 {
            OwnedValue::Array(elements) => {
                elements.push(value.0);
                Ok(())
            }
            _ => Err(type_mismatch(Kind::Array, found)),
        }
    }
}

impl fmt::Display for Compact {
    /// Compact JSON; the alternate flag (`{:#}`) pretty-prints.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = if f.alternate() {
            simd_json::to_string_pretty(self)
        } else {
            simd_json::to_string(self)
        };
        f.write_str(&rendered.map_err(|_| fmt::Error)?)
    }
}

impl serde::Serialize for Compact {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match &self.0 {
            OwnedValue::Static(StaticNode::Null) => serializer.serialize_unit(),
            OwnedValue::Static(StaticNode::Bool(flag)) => serializer.serialize_bool(*flag),
            OwnedValue::Static(StaticNode::I64(number)) => serializer.serialize_i64(*number),
            OwnedValue::Static(StaticNode::U64(number)) => serializer.serialize_u64(*number),
            OwnedValue::Static(StaticNode::F64(number)) if number.is_finite() => {
                serializer.serialize_f64(*number)
            }
            // Non-finite nodes can still arrive through `From<OwnedValue>`.
            OwnedValue::Static(StaticNode::F64(_)) => serializer.serialize_unit(),
            #[allow(unreachable_patterns)]
            OwnedValue::Static(_) => serializer.serialize_unit(),
            OwnedValue::String(text) => serializer.serialize_str(text),
            OwnedValue::Array(elements) => serializer.collect_seq(cast::nodes(elements)),
            OwnedValue::Object(_) => serializer.collect_map(self.entries().unwrap_or_default()),
        }
    }
}

impl From<OwnedValue> for Compact {
    fn from(node: OwnedValue) -> Self {
        Compact(node)
    }
}

impl From<Compact> for OwnedValue {
    fn from(value: Compact) -> Self {
        value.0
    }
}

impl From<Scalar> for Compact {
    fn from(scalar: Scalar) -> Self {
        scalar.into_json()
    }
}

impl From<String> for Compact {
    fn from(value: String) -> Self {
        Compact(OwnedValue::from(value))
    }
}

impl From<&str> for Compact {
    fn from(value: &str) -> Self {
        Compact(OwnedValue::from(value))
    }
}

impl From<bool> for Compact {
    fn from(value: bool) -> Self {
        Compact(OwnedValue::Static(StaticNode::Bool(value)))
    }
}

impl From<f64> for Compact {
    /// NaN and infinities have no JSON spelling and become `null`.
    fn from(value: f64) -> Self {
        if value.is_finite() {
            Compact(OwnedValue::Static(StaticNode::F64(value)))
        } else {
            Compact::default()
        }
    }
}

impl From<f32> for Compact {
    fn from(value: f32) -> Self {
        Compact::from(f64::from(value))
    }
}

macro_rules! compact_from_integer {
    ($variant:ident as $wide:ty: $($ty:ty),*) => {$(
        impl From<$ty> for Compact {
            fn from(value: $ty) -> Self {
                Compact(OwnedValue::Static(StaticNode::$variant(value as $wide)))
            }
        }
    )*};
}

compact_from_integer!(I64 as i64: i8, i16, i32, i64, isize);
compact_from_integer!(U64 as u64: u8, u16, u32, u64, usize);

impl<T: Into<Compact>> From<Vec<T>> for Compact {
    fn from(elements: Vec<T>) -> Self {
        Compact::array_from(elements)
    }
}

impl<T: Into<Compact>> From<Option<T>> for Compact {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Compact::default, Into::into)
    }
}

impl Index<&str> for Compact {
    type Output = Compact;

    /// Missing keys and non-objects read as `null`; nothing is inserted.
    fn index(&self, key: &str) -> &Compact {
        self.field(key).unwrap_or(&NULL)
    }
}

impl Index<usize> for Compact {
    type Output = Compact;

    /// # Panics
    ///
    /// Panics when `self` is not an array or the index is past the end; use [`Json::at`]
    /// to get an error instead.
    fn index(&self, index: usize) -> &Compact {
        match self.at(index) {
            Ok(element) => element,
            Err(err) => panic!("{err}"),
        }
    }
}

impl IndexMut<&str> for Compact {
    /// Auto-vivifying write access.
    ///
    /// # Panics
    ///
    /// Panics when `self` is neither null nor an object; use [`Json::entry`] to get an error
    /// instead.
    fn index_mut(&mut self, key: &str) -> &mut Compact {
        match self.entry(key) {
            Ok(slot) => slot,
            Err(err) => panic!("{err}"),
        }
    }
}

impl IndexMut<usize> for Compact {
    /// # Panics
    ///
    /// Panics when `self` is not an array or the index is past the end.
    fn index_mut(&mut self, index: usize) -> &mut Compact {
        match self.entry(index) {
            Ok(slot) => slot,
            Err(err) => panic!("{err}"),
        }
    }
}

impl PartialEq for Compact {
    fn eq(&self, other: &Self) -> bool {
        equivalent(self, other)
    }
}

impl PartialEq<serde_json::Value> for Compact {
    fn eq(&self, other: &serde_json::Value) -> bool {
        equivalent(self, other)
    }
}

impl PartialEq<Compact> for serde_json::Value {
    fn eq(&self, other: &Compact) -> bool {
        equivalent(self, other)
    }
}

impl PartialEq<str> for Compact {
    fn eq(&self, other: &str) -> bool {
        other.json_eq(self)
    }
}

impl PartialEq<&str> for Compact {
    fn eq(&self, other: &&str) -> bool {
        other.json_eq(self)
    }
}

impl PartialEq<String> for Compact {
    fn eq(&self, other: &String) -> bool {
        other.json_eq(self)
    }
}

macro_rules! compact_eq_native {
    ($($ty:ty),*) => {$(
        impl PartialEq<$ty> for Compact {
            fn eq(&self, other: &$ty) -> bool {
                other.json_eq(self)
            }
        }
    )*};
}

compact_eq_native!(bool, f32, f64, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<T: JsonEq> PartialEq<Vec<T>> for Compact {
    fn eq(&self, other: &Vec<T>) -> bool {
        other.json_eq(self)
    }
}

impl<T: JsonEq> PartialEq<[T]> for Compact {
    fn eq(&self, other: &[T]) -> bool {
        other.json_eq(self)
    }
}

impl<T: JsonEq, const N: usize> PartialEq<[T; N]> for Compact {
    fn eq(&self, other: &[T; N]) -> bool {
        other.json_eq(self)
    }
}
