//! Purpose: Typed reads, scalar construction and heterogeneous equality for the value contract.
//! Exports: `Scalar`, `FromJson`, `JsonEq`.
//! Role: Shared by both backends through provided methods on `Json`.
//! Invariants: `FromJson` is strict; it never converts across kinds.
//! Invariants: Numeric equality is decided in `f64`, except `f32` which compares after narrowing.
use std::fmt;

use super::{Json, Kind, equivalent, type_mismatch};
use crate::core::error::{Error, ErrorKind};

/// Largest magnitude below which every integral `f64` is exactly an `i64`.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// A single JSON scalar detached from any backend.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
}

impl Scalar {
    pub fn kind(&self) -> Kind {
        match self {
            Scalar::Null => Kind::Null,
            Scalar::Bool(_) => Kind::Boolean,
            Scalar::Int(_) | Scalar::UInt(_) | Scalar::Float(_) => Kind::Number,
            Scalar::String(_) => Kind::String,
        }
    }

    pub fn into_json<J: Json>(self) -> J {
        match self {
            Scalar::Null => J::default(),
            Scalar::Bool(flag) => J::from(flag),
            Scalar::Int(number) => J::from(number),
            Scalar::UInt(number) => J::from(number),
            Scalar::Float(number) => number_from_f64(number),
            Scalar::String(text) => J::from(text),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(flag) => write!(f, "{flag}"),
            Scalar::Int(number) => write!(f, "{number}"),
            Scalar::UInt(number) => write!(f, "{number}"),
            Scalar::Float(number) => write!(f, "{number}"),
            Scalar::String(text) => f.write_str(text),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_owned())
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Scalar::Null, Into::into)
    }
}

macro_rules! scalar_from {
    ($variant:ident as $wide:ty: $($ty:ty),*) => {$(
        impl From<$ty> for Scalar {
            fn from(value: $ty) -> Self {
                Scalar::$variant(<$wide>::from(value))
            }
        }
    )*};
}

scalar_from!(Int as i64: i8, i16, i32, i64);
scalar_from!(UInt as u64: u8, u16, u32, u64);
scalar_from!(Float as f64: f32, f64);

/// Integral values that fit exactly are stored as integers so they render without a fraction.
pub(crate) fn number_from_f64<J: Json>(number: f64) -> J {
    if number.fract() == 0.0 && number.abs() <= EXACT_INTEGER_LIMIT {
        J::from(number as i64)
    } else {
        J::from(number)
    }
}

/// Strict conversion out of a JSON value.
pub trait FromJson: Sized {
    fn from_json<J: Json>(value: &J) -> Result<Self, Error>;
}

impl FromJson for bool {
    fn from_json<J: Json>(value: &J) -> Result<Self, Error> {
        value
            .as_bool()
            .ok_or_else(|| type_mismatch(Kind::Boolean, value.kind()))
    }
}

impl FromJson for String {
    fn from_json<J: Json>(value: &J) -> Result<Self, Error> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| type_mismatch(Kind::String, value.kind()))
    }
}

impl FromJson for f64 {
    fn from_json<J: Json>(value: &J) -> Result<Self, Error> {
        value
            .as_f64()
            .ok_or_else(|| type_mismatch(Kind::Number, value.kind()))
    }
}

impl FromJson for f32 {
    fn from_json<J: Json>(value: &J) -> Result<Self, Error> {
        f64::from_json(value).map(|number| number as f32)
    }
}

// Integers read the double and truncate toward zero, saturating at the type bounds.
macro_rules! integer_from_json {
    ($($ty:ty),*) => {$(
        impl FromJson for $ty {
            fn from_json<J: Json>(value: &J) -> Result<Self, Error> {
                f64::from_json(value).map(|number| number as $ty)
            }
        }
    )*};
}

integer_from_json!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromJson for Scalar {
    fn from_json<J: Json>(value: &J) -> Result<Self, Error> {
        match value.kind() {
            Kind::Null => Ok(Scalar::Null),
            Kind::Boolean => bool::from_json(value).map(Scalar::Bool),
            Kind::Number => match (value.as_i64(), value.as_u64()) {
                (Some(number), _) => Ok(Scalar::Int(number)),
                (None, Some(number)) => Ok(Scalar::UInt(number)),
                (None, None) => f64::from_json(value).map(Scalar::Float),
            },
            Kind::String => String::from_json(value).map(Scalar::String),
            found => Err(Error::new(ErrorKind::TypeMismatch)
                .with_message(format!("expected scalar, found {found}"))),
        }
    }
}

impl<T: FromJson> FromJson for Option<T> {
    fn from_json<J: Json>(value: &J) -> Result<Self, Error> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_json(value).map(Some)
    }
}

impl<T: FromJson> FromJson for Vec<T> {
    fn from_json<J: Json>(value: &J) -> Result<Self, Error> {
        value
            .elements()?
            .iter()
            .enumerate()
            .map(|(index, element)| {
                T::from_json(element).map_err(|err| err.with_index(index))
            })
            .collect()
    }
}

/// Equality between a native value and a JSON value of any backend.
pub trait JsonEq {
    fn json_eq<J: Json>(&self, value: &J) -> bool;
}

impl JsonEq for str {
    fn json_eq<J: Json>(&self, value: &J) -> bool {
        value.as_str() == Some(self)
    }
}

impl JsonEq for String {
    fn json_eq<J: Json>(&self, value: &J) -> bool {
        self.as_str().json_eq(value)
    }
}

impl JsonEq for bool {
    fn json_eq<J: Json>(&self, value: &J) -> bool {
        value.as_bool() == Some(*self)
    }
}

impl JsonEq for f64 {
    fn json_eq<J: Json>(&self, value: &J) -> bool {
        value.as_f64().is_some_and(|number| number == *self)
    }
}

impl JsonEq for f32 {
    fn json_eq<J: Json>(&self, value: &J) -> bool {
        value.as_f64().is_some_and(|number| number as f32 == *self)
    }
}

macro_rules! integer_json_eq {
    ($($ty:ty),*) => {$(
        impl JsonEq for $ty {
            fn json_eq<J: Json>(&self, value: &J) -> bool {
                value.as_f64().is_some_and(|number| number == *self as f64)
            }
        }
    )*};
}

integer_json_eq!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl JsonEq for Scalar {
    fn json_eq<J: Json>(&self, value: &J) -> bool {
        match self {
            Scalar::Null => value.is_null(),
            Scalar::Bool(flag) => flag.json_eq(value),
            Scalar::Int(number) => number.json_eq(value),
            Scalar::UInt(number) => number.json_eq(value),
            Scalar::Float(number) => number.json_eq(value),
            Scalar::String(text) => text.json_eq(value),
        }
    }
}

impl<T: JsonEq> JsonEq for Option<T> {
    fn json_eq<J: Json>(&self, value: &J) -> bool {
        match self {
            Some(inner) => inner.json_eq(value),
            None => value.is_null(),
        }
    }
}

impl<T: JsonEq> JsonEq for [T] {
    fn json_eq<J: Json>(&self, value: &J) -> bool {
        value.as_slice().is_some_and(|elements| {
            elements.len() == self.len()
                && self
                    .iter()
                    .zip(elements)
                    .all(|(expected, element)| expected.json_eq(element))
        })
    }
}

impl<T: JsonEq> JsonEq for Vec<T> {
    fn json_eq<J: Json>(&self, value: &J) -> bool {
        self.as_slice().json_eq(value)
    }
}

impl<T: JsonEq, const N: usize> JsonEq for [T; N] {
    fn json_eq<J: Json>(&self, value: &J) -> bool {
        self.as_slice().json_eq(value)
    }
}

impl<T: JsonEq + ?Sized> JsonEq for &T {
    fn json_eq<J: Json>(&self, value: &J) -> bool {
        (**self).json_eq(value)
    }
}

impl JsonEq for serde_json::Value {
    fn json_eq<J: Json>(&self, value: &J) -> bool {
        equivalent(self, value)
    }
}

impl JsonEq for super::Compact {
    fn json_eq<J: Json>(&self, value: &J) -> bool {
        equivalent(self, value)
    }
}
