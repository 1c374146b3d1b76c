//! Purpose: Lenient conversion of JSON scalars into native types.
//! Exports: `coerce`, `Coerce`, `CoercionError`.
//! Role: Written once against the `Json` contract and shared by every backend.
//! Invariants: Never panics; every refusal is a typed `CoercionError`, never a default value.
//! Invariants: Only scalars coerce; null, arrays and objects are type mismatches.
//! Invariants: Number to integer truncates toward zero and refuses values outside the target range.
//!
//! A borrowed string target is refused at compile time, since a number has no string to lend:
//!
//! ```compile_fail
//! use xson::json::{Json, Reference};
//!
//! let value = Reference::from(42);
//! let _text: &str = value.coerce().unwrap();
//! ```
use std::fmt;
use std::num::IntErrorKind;

use super::{Json, Kind};
use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CoercionError {
    /// The source is null, an array or an object.
    TypeMismatch { found: Kind },
    /// The source is well formed but does not fit the target.
    OutOfRange,
    /// A string source that is not a number (or boolean, for boolean targets).
    MalformedNumericString,
    EmptyString,
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoercionError::TypeMismatch { found } => write!(f, "cannot coerce {found}"),
            CoercionError::OutOfRange => f.write_str("value out of range for target type"),
            CoercionError::MalformedNumericString => f.write_str("string is not numeric"),
            CoercionError::EmptyString => f.write_str("string is empty"),
        }
    }
}

impl std::error::Error for CoercionError {}

impl From<CoercionError> for Error {
    fn from(err: CoercionError) -> Self {
        let kind = match err {
            CoercionError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            _ => ErrorKind::Coercion,
        };
        Error::new(kind).with_message(err.to_string())
    }
}

/// Native targets that can be coerced out of a JSON scalar.
pub trait Coerce: Sized {
    fn coerce_from<J: Json>(value: &J) -> Result<Self, CoercionError>;
}

pub fn coerce<T: Coerce, J: Json>(value: &J) -> Result<T, CoercionError> {
    T::coerce_from(value)
}

enum Source<'a> {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(&'a str),
}

fn source<J: Json>(value: &J) -> Result<Source<'_>, CoercionError> {
    if let Some(flag) = value.as_bool() {
        return Ok(Source::Bool(flag));
    }
    if let Some(number) = value.as_i64() {
        return Ok(Source::Int(number));
    }
    if let Some(number) = value.as_u64() {
        return Ok(Source::UInt(number));
    }
    if let Some(number) = value.as_f64() {
        return Ok(Source::Float(number));
    }
    if let Some(text) = value.as_str() {
        return Ok(Source::Text(text));
    }
    Err(CoercionError::TypeMismatch {
        found: value.kind(),
    })
}

/// `bound` is exclusive: `MAX as f64` rounds up to a power of two for 64-bit targets.
fn truncate(number: f64, min: f64, bound: f64) -> Result<f64, CoercionError> {
    let whole = number.trunc();
    if whole.is_finite() && whole >= min && whole < bound {
        Ok(whole)
    } else {
        Err(CoercionError::OutOfRange)
    }
}

fn parse_float(text: &str) -> Result<f64, CoercionError> {
    if text.is_empty() {
        return Err(CoercionError::EmptyString);
    }
    match text.parse::<f64>() {
        Ok(number) if !number.is_nan() => Ok(number),
        _ => Err(CoercionError::MalformedNumericString),
    }
}

macro_rules! coerce_integer {
    ($($ty:ty),*) => {$(
        impl Coerce for $ty {
            fn coerce_from<J: Json>(value: &J) -> Result<Self, CoercionError> {
                let (min, bound) = (<$ty>::MIN as f64, <$ty>::MAX as f64 + 1.0);
                match source(value)? {
                    Source::Bool(flag) => Ok(<$ty>::from(flag)),
                    Source::Int(number) => {
                        <$ty>::try_from(number).map_err(|_| CoercionError::OutOfRange)
                    }
                    Source::UInt(number) => {
                        <$ty>::try_from(number).map_err(|_| CoercionError::OutOfRange)
                    }
                    Source::Float(number) => {
                        truncate(number, min, bound).map(|whole| whole as $ty)
                    }
                    Source::Text("") => Err(CoercionError::EmptyString),
                    Source::Text(text) => match text.parse::<$ty>() {
                        Ok(parsed) => Ok(parsed),
                        Err(err)
                            if matches!(
                                err.kind(),
                                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow
                            ) =>
                        {
                            Err(CoercionError::OutOfRange)
                        }
                        // "3.7" and "1e3" are numeric but not integer literals.
                        Err(_) => parse_float(text)
                            .and_then(|number| truncate(number, min, bound))
                            .map(|whole| whole as $ty),
                    },
                }
            }
        }
    )*};
}

coerce_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Coerce for f64 {
    fn coerce_from<J: Json>(value: &J) -> Result<Self, CoercionError> {
        match source(value)? {
            Source::Bool(flag) => Ok(if flag { 1.0 } else { 0.0 }),
            Source::Int(number) => Ok(number as f64),
            Source::UInt(number) => Ok(number as f64),
            Source::Float(number) => Ok(number),
            Source::Text(text) => parse_float(text),
        }
    }
}

impl Coerce for f32 {
    fn coerce_from<J: Json>(value: &J) -> Result<Self, CoercionError> {
        let number = f64::coerce_from(value)?;
        if number.is_finite() && number.abs() > f64::from(f32::MAX) {
            return Err(CoercionError::OutOfRange);
        }
        Ok(number as f32)
    }
}

impl Coerce for bool {
    fn coerce_from<J: Json>(value: &J) -> Result<Self, CoercionError> {
        match source(value)? {
            Source::Bool(flag) => Ok(flag),
            Source::Int(number) => Ok(number != 0),
            Source::UInt(number) => Ok(number != 0),
            Source::Float(number) => Ok(number != 0.0),
            Source::Text("true" | "1") => Ok(true),
            Source::Text("false" | "0") => Ok(false),
            Source::Text("") => Err(CoercionError::EmptyString),
            Source::Text(_) => Err(CoercionError::MalformedNumericString),
        }
    }
}

impl Coerce for String {
    fn coerce_from<J: Json>(value: &J) -> Result<Self, CoercionError> {
        match source(value)? {
            Source::Bool(flag) => Ok(flag.to_string()),
            Source::Int(number) => Ok(number.to_string()),
            Source::UInt(number) => Ok(number.to_string()),
            Source::Float(number) => Ok(number.to_string()),
            Source::Text(text) => Ok(text.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CoercionError, coerce};
    use crate::core::error::{Error, ErrorKind};
    use crate::json::{Compact, Json, Kind, Reference};

    fn integer_table<J: Json>() {
        let cases: [(&str, Result<i32, CoercionError>); 10] = [
            ("42", Ok(42)),
            ("\"42\"", Ok(42)),
            ("3.7", Ok(3)),
            ("-3.7", Ok(-3)),
            ("\"3.7\"", Ok(3)),
            ("\"1e3\"", Ok(1000)),
            ("true", Ok(1)),
            ("\"\"", Err(CoercionError::EmptyString)),
            ("\"abc\"", Err(CoercionError::MalformedNumericString)),
            ("1e10", Err(CoercionError::OutOfRange)),
        ];
        for (text, expected) in cases {
            let value = J::parse(text).expect("parse");
            assert_eq!(coerce::<i32, J>(&value), expected, "input {text}");
        }
    }

    fn narrow_integer_table<J: Json>() {
        assert_eq!(
            J::from(300i64).coerce::<u8>(),
            Err(CoercionError::OutOfRange)
        );
        assert_eq!(J::from(-1i64).coerce::<u32>(), Err(CoercionError::OutOfRange));
        assert_eq!(
            J::from("99999999999").coerce::<i32>(),
            Err(CoercionError::OutOfRange)
        );
        assert_eq!(J::from("255").coerce::<u8>(), Ok(255));
    }

    fn sixty_four_bit_edges<J: Json>() {
        let two_pow_63 = 9_223_372_036_854_775_808u64;
        assert_eq!(
            J::from(two_pow_63).coerce::<i64>(),
            Err(CoercionError::OutOfRange)
        );
        assert_eq!(
            J::from(two_pow_63 as f64).coerce::<i64>(),
            Err(CoercionError::OutOfRange)
        );
        assert_eq!(
            J::from("9223372036854775808").coerce::<i64>(),
            Err(CoercionError::OutOfRange)
        );
        assert_eq!(J::from(i64::MAX).coerce::<i64>(), Ok(i64::MAX));
        assert_eq!(J::from(i64::MIN).coerce::<i64>(), Ok(i64::MIN));
        assert_eq!(
            J::from(-(two_pow_63 as f64)).coerce::<i64>(),
            Ok(i64::MIN)
        );

        let two_pow_64 = 18_446_744_073_709_551_616f64;
        assert_eq!(
            J::from(two_pow_64).coerce::<u64>(),
            Err(CoercionError::OutOfRange)
        );
        assert_eq!(
            J::from("18446744073709551616").coerce::<u64>(),
            Err(CoercionError::OutOfRange)
        );
        assert_eq!(J::from(u64::MAX).coerce::<u64>(), Ok(u64::MAX));
        assert_eq!(J::from(two_pow_63).coerce::<u64>(), Ok(two_pow_63));
        assert_eq!(
            J::from(-1i64).coerce::<u64>(),
            Err(CoercionError::OutOfRange)
        );

        // Integers beyond 2^53 keep every digit instead of passing through a double.
        let odd = 9_007_199_254_740_993i64;
        assert_eq!(J::from(odd).coerce::<i64>(), Ok(odd));
        assert_eq!(J::from(odd).coerce::<String>(), Ok(odd.to_string()));
    }

    fn bool_table<J: Json>() {
        assert_eq!(J::from("true").coerce::<bool>(), Ok(true));
        assert_eq!(J::from("1").coerce::<bool>(), Ok(true));
        assert_eq!(J::from("0").coerce::<bool>(), Ok(false));
        assert_eq!(J::from(2.5f64).coerce::<bool>(), Ok(true));
        assert_eq!(J::from(0i64).coerce::<bool>(), Ok(false));
        assert_eq!(
            J::from("yes").coerce::<bool>(),
            Err(CoercionError::MalformedNumericString)
        );
        assert_eq!(J::from("").coerce::<bool>(), Err(CoercionError::EmptyString));
    }

    fn string_and_float_table<J: Json>() {
        assert_eq!(J::from(false).coerce::<String>(), Ok("false".to_string()));
        assert_eq!(J::from(2.5f64).coerce::<String>(), Ok("2.5".to_string()));
        assert_eq!(J::from("  x ").coerce::<String>(), Ok("  x ".to_string()));
        assert_eq!(J::from("2.5").coerce::<f64>(), Ok(2.5));
        assert_eq!(J::from(true).coerce::<f32>(), Ok(1.0));
        assert_eq!(J::from(1e300f64).coerce::<f32>(), Err(CoercionError::OutOfRange));
    }

    fn non_scalars_are_type_mismatches<J: Json>() {
        let cases = [("null", Kind::Null), ("[1]", Kind::Array), ("{}", Kind::Object)];
        for (text, found) in cases {
            let value = J::parse(text).expect("parse");
            assert_eq!(
                value.coerce::<i64>(),
                Err(CoercionError::TypeMismatch { found })
            );
            assert_eq!(
                value.coerce::<String>(),
                Err(CoercionError::TypeMismatch { found })
            );
        }
    }

    #[test]
    fn reference_backend_coercions() {
        integer_table::<Reference>();
        narrow_integer_table::<Reference>();
        sixty_four_bit_edges::<Reference>();
        bool_table::<Reference>();
        string_and_float_table::<Reference>();
        non_scalars_are_type_mismatches::<Reference>();
    }

    #[test]
    fn compact_backend_coercions() {
        integer_table::<Compact>();
        narrow_integer_table::<Compact>();
        sixty_four_bit_edges::<Compact>();
        bool_table::<Compact>();
        string_and_float_table::<Compact>();
        non_scalars_are_type_mismatches::<Compact>();
    }

    #[test]
    fn coercion_error_maps_into_crate_error() {
        let err: Error = CoercionError::TypeMismatch { found: Kind::Array }.into();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.message(), Some("cannot coerce array"));

        let err: Error = CoercionError::EmptyString.into();
        assert_eq!(err.kind(), ErrorKind::Coercion);
    }
}
