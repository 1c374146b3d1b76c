//! Purpose: Decode entrypoints for both engines and the mapping of their failures.
//! Exports: `ParseFailureCategory`, `categorize_message` (plus crate-internal decoders).
//! Role: Parser boundary that centralizes serde_json and simd-json usage details.
//! Invariants: Input buffers are copied once to satisfy simd-json mutable-slice API.
//! Invariants: Every parse error carries line, column, byte offset and the rejected input.
//! Invariants: Lines and columns are 1-based; columns count bytes.
use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseFailureCategory {
    Syntax,
    Eof,
    Utf8,
    NumericRange,
    DepthLimit,
    Unknown,
}

impl ParseFailureCategory {
    pub fn label(self) -> &'static str {
        match self {
            ParseFailureCategory::Syntax => "syntax",
            ParseFailureCategory::Eof => "eof",
            ParseFailureCategory::Utf8 => "utf8",
            ParseFailureCategory::NumericRange => "numeric-range",
            ParseFailureCategory::DepthLimit => "depth-limit",
            ParseFailureCategory::Unknown => "unknown",
        }
    }
}

/// Buckets an engine's error message; the two engines word their failures differently.
pub fn categorize_message(message: &str) -> ParseFailureCategory {
    let message = message.to_ascii_lowercase();
    if message.contains("utf-8") || message.contains("utf8") {
        ParseFailureCategory::Utf8
    } else if message.contains("recursion") || message.contains("depth") {
        ParseFailureCategory::DepthLimit
    } else if message.contains("eof") || message.contains("end of") {
        ParseFailureCategory::Eof
    } else if message.contains("number") || message.contains("out of range") {
        ParseFailureCategory::NumericRange
    } else if ["expected", "invalid", "unexpected", "trailing", "syntax"]
        .iter()
        .any(|needle| message.contains(needle))
    {
        ParseFailureCategory::Syntax
    } else {
        ParseFailureCategory::Unknown
    }
}

pub(crate) fn serde_value(input: &str) -> Result<serde_json::Value, Error> {
    serde_json::from_str(input).map_err(|err| from_serde_error(err, input))
}

pub(crate) fn simd_value(input: &str) -> Result<simd_json::OwnedValue, Error> {
    let mut bytes = input.as_bytes().to_vec();
    simd_json::to_owned_value(&mut bytes).map_err(|err| from_simd_error(err, input))
}

fn from_serde_error(err: serde_json::Error, input: &str) -> Error {
    let category = match err.classify() {
        serde_json::error::Category::Eof => ParseFailureCategory::Eof,
        _ => categorize_message(&err.to_string()),
    };
    let (line, column) = (err.line(), err.column());
    let offset = offset_of(input, line, column);
    tracing::debug!(
        backend = "reference",
        category = category.label(),
        line,
        column,
        "json parse failed"
    );
    parse_error(err.to_string(), category, line, column, offset, input).with_source(err)
}

fn from_simd_error(err: simd_json::Error, input: &str) -> Error {
    let offset = err.index().min(input.len());
    let (line, column) = line_and_column(input, offset);
    let category = categorize_message(&err.to_string());
    tracing::debug!(
        backend = "compact",
        category = category.label(),
        line,
        column,
        "json parse failed"
    );
    parse_error(err.to_string(), category, line, column, offset, input).with_source(err)
}

fn parse_error(
    message: String,
    category: ParseFailureCategory,
    line: usize,
    column: usize,
    offset: usize,
    input: &str,
) -> Error {
    Error::new(ErrorKind::Parse)
        .with_message(message)
        .with_hint(format!("parse category: {}", category.label()))
        .with_line(line)
        .with_column(column)
        .with_offset(offset)
        .with_input(input)
}

pub(crate) fn line_and_column(input: &str, offset: usize) -> (usize, usize) {
    let prefix = &input.as_bytes()[..offset.min(input.len())];
    let line = 1 + prefix.iter().filter(|byte| **byte == b'\n').count();
    let column = 1 + prefix.iter().rev().take_while(|byte| **byte != b'\n').count();
    (line, column)
}

fn offset_of(input: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (index, text) in input.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            return (offset + column.saturating_sub(1)).min(input.len());
        }
        offset += text.len();
    }
    input.len()
}
