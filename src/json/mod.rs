//! Purpose: Define the JSON value contract that every backend satisfies.
//! Exports: `Json`, `Kind`, `Locator`, `Items`, `ItemsMut`, `equivalent`, `transcode`, both backends.
//! Role: Application code is generic over `Json` only; backend internals never leak through it.
//! Invariants: A value holds exactly one kind; assignment replaces the previous content wholesale.
//! Invariants: Object enumeration and serialization use ascending key order on every backend.
//! Invariants: Numbers have no integer sub-kind; typed reads go through `f64`.
//! Invariants: `as_i64`/`as_u64` expose exact integers for transfer and comparison.
use std::fmt;

use crate::core::error::{Error, ErrorKind};

pub mod coerce;
mod compact;
mod convert;
pub(crate) mod parse;
mod reference;

pub use coerce::{Coerce, CoercionError, coerce};
pub use compact::Compact;
pub use convert::{FromJson, JsonEq, Scalar};
pub use parse::{ParseFailureCategory, categorize_message};
/// The reference backend is serde_json's own tree node.
pub use serde_json::Value as Reference;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Kind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The capability set a JSON document type must provide to be interchangeable with the others.
///
/// Backends implement the required methods, which are thin views over their engine's tree.
/// Everything else (strict access, auto-vivification, predicates, enumeration, strict getters,
/// coercion and heterogeneous equality) is provided here once, in terms of those views.
pub trait Json:
    Clone
    + Default
    + fmt::Debug
    + From<bool>
    + From<i64>
    + From<u64>
    + From<f64>
    + From<String>
    + for<'a> From<&'a str>
    + From<Scalar>
{
    /// The engine's own object container.
    type Object;
    /// The array container accepted by [`Json::from_array`].
    type Array;

    /// Parses `text` into a new document.
    fn parse(text: &str) -> Result<Self, Error>;

    /// Renders the document. Pretty output differs from compact output only in whitespace.
    fn serialize(&self, pretty: bool) -> String;

    fn kind(&self) -> Kind;

    fn as_bool(&self) -> Option<bool>;

    fn as_f64(&self) -> Option<f64>;

    /// Exact integer view; `None` for floats and for integers outside `i64`.
    fn as_i64(&self) -> Option<i64>;

    /// Exact integer view; `None` for floats and for negative integers.
    fn as_u64(&self) -> Option<u64>;

    fn as_str(&self) -> Option<&str>;

    fn as_slice(&self) -> Option<&[Self]>;

    fn as_mut_slice(&mut self) -> Option<&mut [Self]>;

    fn as_object(&self) -> Option<&Self::Object>;

    /// Member lookup; `None` when absent or when `self` is not an object.
    fn field(&self, key: &str) -> Option<&Self>;

    fn field_mut(&mut self, key: &str) -> Option<&mut Self>;

    /// Returns the member under `key`, inserting `null` first if it is absent.
    /// `None` when `self` is not an object.
    fn field_or_null(&mut self, key: &str) -> Option<&mut Self>;

    /// Object members in ascending key order; `None` when `self` is not an object.
    fn entries(&self) -> Option<Vec<(&str, &Self)>>;

    fn entries_mut(&mut self) -> Option<Vec<(&str, &mut Self)>>;

    /// Element count for containers, 0 for `null` and 1 for any other scalar.
    fn len(&self) -> usize;

    fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Self)>;

    fn from_elements<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = Self>;

    fn from_object(object: Self::Object) -> Self;

    fn from_array(array: Self::Array) -> Self;

    /// Inserts a member, turning `null` into an empty object first.
    fn insert(&mut self, key: impl Into<String>, value: Self) -> Result<Option<Self>, Error>;

    fn remove(&mut self, key: &str) -> Option<Self>;

    /// Appends an element, turning `null` into an empty array first.
    fn push(&mut self, value: Self) -> Result<(), Error>;

    fn new_object() -> Self {
        Self::from_entries(std::iter::empty())
    }

    fn new_array() -> Self {
        Self::from_elements(std::iter::empty())
    }

    /// Replaces the content of `self` in place and hands `self` back for chaining.
    ///
    /// On failure `self` is left untouched and the error carries a rendering of it.
    fn deserialize(&mut self, text: &str) -> Result<&mut Self, Error> {
        match Self::parse(text) {
            Ok(parsed) => {
                *self = parsed;
                Ok(self)
            }
            Err(err) => Err(err.with_snapshot(self.serialize(false))),
        }
    }

    fn is_null(&self) -> bool {
        self.kind() == Kind::Null
    }

    fn is_boolean(&self) -> bool {
        self.kind() == Kind::Boolean
    }

    fn is_number(&self) -> bool {
        self.kind() == Kind::Number
    }

    fn is_string(&self) -> bool {
        self.kind() == Kind::String
    }

    fn is_array(&self) -> bool {
        self.kind() == Kind::Array
    }

    fn is_object(&self) -> bool {
        self.kind() == Kind::Object
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    fn has_boolean_field(&self, key: &str) -> bool {
        self.field(key).is_some_and(|value| value.is_boolean())
    }

    fn has_number_field(&self, key: &str) -> bool {
        self.field(key).is_some_and(|value| value.is_number())
    }

    fn has_string_field(&self, key: &str) -> bool {
        self.field(key).is_some_and(|value| value.is_string())
    }

    /// True only for numbers with a fractional part larger than machine epsilon.
    fn has_double_field(&self, key: &str) -> bool {
        self.field(key)
            .and_then(|value| value.as_f64())
            .is_some_and(|number| number.fract().abs() > f64::EPSILON)
    }

    /// Strict lookup that never creates anything.
    fn at<L: Locator>(&self, locator: L) -> Result<&Self, Error> {
        locator.locate(self)
    }

    fn at_mut<L: Locator>(&mut self, locator: L) -> Result<&mut Self, Error> {
        locator.locate_mut(self)
    }

    /// Builder-style access: a `null` value becomes the container the locator asks for.
    ///
    /// Keys are created on demand; array indices must already exist.
    fn entry<L: Locator>(&mut self, locator: L) -> Result<&mut Self, Error> {
        locator.vivify(self)
    }

    fn items(&self) -> Result<Items<'_, Self>, Error> {
        let found = self.kind();
        self.entries()
            .map(|entries| Items {
                inner: entries.into_iter(),
            })
            .ok_or_else(|| type_mismatch(Kind::Object, found))
    }

    fn items_mut(&mut self) -> Result<ItemsMut<'_, Self>, Error> {
        let found = self.kind();
        self.entries_mut()
            .map(|entries| ItemsMut {
                inner: entries.into_iter(),
            })
            .ok_or_else(|| type_mismatch(Kind::Object, found))
    }

    fn elements(&self) -> Result<&[Self], Error> {
        let found = self.kind();
        self.as_slice()
            .ok_or_else(|| type_mismatch(Kind::Array, found))
    }

    fn elements_mut(&mut self) -> Result<&mut [Self], Error> {
        let found = self.kind();
        self.as_mut_slice()
            .ok_or_else(|| type_mismatch(Kind::Array, found))
    }

    /// Strict typed read; any kind mismatch is an error.
    fn get_as<T: FromJson>(&self) -> Result<T, Error> {
        T::from_json(self)
    }

    /// Lenient typed read for loosely-typed input.
    fn coerce<T: Coerce>(&self) -> Result<T, CoercionError> {
        coerce::coerce::<T, Self>(self)
    }

    fn equals<T: JsonEq + ?Sized>(&self, other: &T) -> bool {
        other.json_eq(self)
    }

    fn set<V: Into<Self>>(&mut self, value: V) {
        *self = value.into();
    }

    fn object_from<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Self>,
    {
        Self::from_entries(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        )
    }

    fn array_from<I, V>(elements: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Self>,
    {
        Self::from_elements(elements.into_iter().map(Into::into))
    }

    /// Builds a 2-D array from rows; a single row collapses to a flat array.
    fn matrix_from<R, I, V>(rows: R) -> Self
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = V>,
        V: Into<Self>,
    {
        let mut rows: Vec<Self> = rows.into_iter().map(Self::array_from).collect();
        match rows.len() {
            1 => rows.swap_remove(0),
            _ => Self::from_elements(rows),
        }
    }
}

/// Something that addresses a child: a `&str` key or a `usize` index.
pub trait Locator: Copy + fmt::Display {
    fn locate<'v, J: Json>(self, value: &'v J) -> Result<&'v J, Error>;

    fn locate_mut<'v, J: Json>(self, value: &'v mut J) -> Result<&'v mut J, Error>;

    fn vivify<'v, J: Json>(self, value: &'v mut J) -> Result<&'v mut J, Error>;
}

impl Locator for &str {
    fn locate<'v, J: Json>(self, value: &'v J) -> Result<&'v J, Error> {
        if !value.is_object() {
            return Err(type_mismatch(Kind::Object, value.kind()).with_key(self));
        }
        value.field(self).ok_or_else(|| key_not_found(self))
    }

    fn locate_mut<'v, J: Json>(self, value: &'v mut J) -> Result<&'v mut J, Error> {
        if !value.is_object() {
            return Err(type_mismatch(Kind::Object, value.kind()).with_key(self));
        }
        value.field_mut(self).ok_or_else(|| key_not_found(self))
    }

    fn vivify<'v, J: Json>(self, value: &'v mut J) -> Result<&'v mut J, Error> {
        if value.is_null() {
            *value = J::new_object();
        }
        if !value.is_object() {
            return Err(type_mismatch(Kind::Object, value.kind()).with_key(self));
        }
        value.field_or_null(self).ok_or_else(|| {
            Error::new(ErrorKind::Internal)
                .with_message("object refused member insertion")
                .with_key(self)
        })
    }
}

impl Locator for &String {
    fn locate<'v, J: Json>(self, value: &'v J) -> Result<&'v J, Error> {
        self.as_str().locate(value)
    }

    fn locate_mut<'v, J: Json>(self, value: &'v mut J) -> Result<&'v mut J, Error> {
        self.as_str().locate_mut(value)
    }

    fn vivify<'v, J: Json>(self, value: &'v mut J) -> Result<&'v mut J, Error> {
        self.as_str().vivify(value)
    }
}

impl Locator for usize {
    fn locate<'v, J: Json>(self, value: &'v J) -> Result<&'v J, Error> {
        let found = value.kind();
        let elements = value
            .as_slice()
            .ok_or_else(|| type_mismatch(Kind::Array, found).with_index(self))?;
        elements
            .get(self)
            .ok_or_else(|| index_out_of_range(self, elements.len()))
    }

    fn locate_mut<'v, J: Json>(self, value: &'v mut J) -> Result<&'v mut J, Error> {
        let found = value.kind();
        let elements = value
            .as_mut_slice()
            .ok_or_else(|| type_mismatch(Kind::Array, found).with_index(self))?;
        let len = elements.len();
        elements
            .get_mut(self)
            .ok_or_else(|| index_out_of_range(self, len))
    }

    fn vivify<'v, J: Json>(self, value: &'v mut J) -> Result<&'v mut J, Error> {
        if value.is_null() {
            *value = J::new_array();
        }
        self.locate_mut(value)
    }
}

/// Object members as `(key, value)` pairs in ascending key order.
#[derive(Clone, Debug)]
pub struct Items<'a, J> {
    inner: std::vec::IntoIter<(&'a str, &'a J)>,
}

impl<'a, J> Iterator for Items<'a, J> {
    type Item = (&'a str, &'a J);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<J> ExactSizeIterator for Items<'_, J> {}

impl<J> DoubleEndedIterator for Items<'_, J> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

#[derive(Debug)]
pub struct ItemsMut<'a, J> {
    inner: std::vec::IntoIter<(&'a str, &'a mut J)>,
}

impl<'a, J> Iterator for ItemsMut<'a, J> {
    type Item = (&'a str, &'a mut J);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<J> ExactSizeIterator for ItemsMut<'_, J> {}

/// Structural equality across backends: member order is ignored, integers compare exactly and
/// anything involving a float compares as `f64`.
pub fn equivalent<A: Json, B: Json>(left: &A, right: &B) -> bool {
    match (left.kind(), right.kind()) {
        (Kind::Null, Kind::Null) => true,
        (Kind::Boolean, Kind::Boolean) => left.as_bool() == right.as_bool(),
        (Kind::Number, Kind::Number) => numbers_equal(left, right),
        (Kind::String, Kind::String) => left.as_str() == right.as_str(),
        (Kind::Array, Kind::Array) => match (left.as_slice(), right.as_slice()) {
            (Some(lhs), Some(rhs)) => {
                lhs.len() == rhs.len() && lhs.iter().zip(rhs).all(|(l, r)| equivalent(l, r))
            }
            _ => false,
        },
        (Kind::Object, Kind::Object) => {
            left.len() == right.len()
                && left.entries().is_some_and(|entries| {
                    entries.into_iter().all(|(key, value)| {
                        right
                            .field(key)
                            .is_some_and(|other| equivalent(value, other))
                    })
                })
        }
        _ => false,
    }
}

fn numbers_equal<A: Json, B: Json>(left: &A, right: &B) -> bool {
    if let (Some(lhs), Some(rhs)) = (left.as_i64(), right.as_i64()) {
        return lhs == rhs;
    }
    if let (Some(lhs), Some(rhs)) = (left.as_u64(), right.as_u64()) {
        return lhs == rhs;
    }
    left.as_f64() == right.as_f64()
}

/// Rebuilds a document of one backend as a document of another.
///
/// Integers move exactly and floats stay floats, so the copy renders like the source.
pub fn transcode<A: Json, B: Json>(value: &A) -> B {
    match value.kind() {
        Kind::Null => B::default(),
        Kind::Boolean => value.as_bool().map(B::from).unwrap_or_default(),
        Kind::Number => match (value.as_i64(), value.as_u64()) {
            (Some(number), _) => B::from(number),
            (None, Some(number)) => B::from(number),
            (None, None) => value.as_f64().map(B::from).unwrap_or_default(),
        },
        Kind::String => value.as_str().map(B::from).unwrap_or_default(),
        Kind::Array => B::from_elements(
            value
                .as_slice()
                .unwrap_or_default()
                .iter()
                .map(|element| transcode::<A, B>(element)),
        ),
        Kind::Object => B::from_entries(
            value
                .entries()
                .unwrap_or_default()
                .into_iter()
                .map(|(key, member)| (key.to_owned(), transcode::<A, B>(member))),
        ),
    }
}

pub(crate) fn type_mismatch(expected: Kind, found: Kind) -> Error {
    Error::new(ErrorKind::TypeMismatch).with_message(format!("expected {expected}, found {found}"))
}

fn key_not_found(key: &str) -> Error {
    Error::new(ErrorKind::KeyNotFound)
        .with_message("no member with this key")
        .with_key(key)
}

fn index_out_of_range(index: usize, len: usize) -> Error {
    Error::new(ErrorKind::IndexOutOfRange)
        .with_message(format!("array has {len} elements"))
        .with_index(index)
}
