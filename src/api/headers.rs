//! Purpose: HTTP header map that converts to and from JSON documents.
//! Exports: `Headers`.
//! Role: Container consumed by the client; JSON exchange goes through the value contract.
//! Invariants: Names and values are stored verbatim; on a name collision the later value wins.
//! Invariants: Lookups fall back to an ASCII case-insensitive match, as HTTP names are.
use std::collections::BTreeMap;
use std::ops::{Add, AddAssign};

use crate::core::error::{Error, ErrorKind};
use crate::json::Json;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_LENGTH: &str = "Content-Length";

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Headers {
    entries: BTreeMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        match self.entries.get(name) {
            Some(value) => Some(value.as_str()),
            None => self
                .iter()
                .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
                .map(|(_, value)| value),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn merge(&mut self, other: &Headers) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }

    /// Merges the members of a JSON object. Scalars are rendered as text, containers as JSON.
    pub fn merge_json<J: Json>(&mut self, json: &J) -> Result<(), Error> {
        for (name, value) in json.items()? {
            let rendered = if value.is_array() || value.is_object() || value.is_null() {
                value.serialize(false)
            } else {
                value.coerce::<String>()?
            };
            self.insert(name, rendered);
        }
        Ok(())
    }

    pub fn from_json<J: Json>(json: &J) -> Result<Self, Error> {
        let mut headers = Self::new();
        headers.merge_json(json)?;
        Ok(headers)
    }

    pub fn to_json<J: Json>(&self) -> J {
        J::object_from(self.iter())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.get(CONTENT_TYPE)
    }

    pub fn set_content_type(&mut self, value: impl Into<String>) -> &mut Self {
        self.insert(CONTENT_TYPE, value);
        self
    }

    /// `Ok(None)` when the header is absent; a present but non-numeric value is an error.
    pub fn content_length(&self) -> Result<Option<u64>, Error> {
        self.get(CONTENT_LENGTH)
            .map(|raw| {
                raw.trim().parse::<u64>().map_err(|err| {
                    Error::new(ErrorKind::Parse)
                        .with_message("invalid Content-Length header")
                        .with_key(CONTENT_LENGTH)
                        .with_input(raw)
                        .with_source(err)
                })
            })
            .transpose()
    }

    pub fn set_content_length(&mut self, length: u64) -> &mut Self {
        self.insert(CONTENT_LENGTH, length.to_string());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        headers.extend(iter);
        headers
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Headers {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl AddAssign<&Headers> for Headers {
    fn add_assign(&mut self, rhs: &Headers) {
        self.merge(rhs);
    }
}

impl Add<&Headers> for Headers {
    type Output = Headers;

    fn add(mut self, rhs: &Headers) -> Headers {
        self.merge(rhs);
        self
    }
}
