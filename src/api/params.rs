//! Purpose: Query parameters that convert to and from JSON documents.
//! Exports: `Parameters`.
//! Role: Rendered into the request URL by the client.
//! Invariants: Rendering is percent-encoded and ordered by name, so it is deterministic.
use std::collections::BTreeMap;

use url::form_urlencoded;

use crate::core::error::Error;
use crate::json::{Json, Scalar};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Parameters {
    entries: BTreeMap<String, Scalar>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Option<Scalar> {
        self.entries.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.entries.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Scalar> {
        self.entries.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn merge(&mut self, other: &Parameters) {
        for (name, value) in other.iter() {
            self.insert(name, value.clone());
        }
    }

    /// Merges the members of a JSON object; containers are kept as their JSON text.
    pub fn merge_json<J: Json>(&mut self, json: &J) -> Result<(), Error> {
        for (name, value) in json.items()? {
            let scalar = if value.is_array() || value.is_object() {
                Scalar::String(value.serialize(false))
            } else {
                value.get_as::<Scalar>()?
            };
            self.insert(name, scalar);
        }
        Ok(())
    }

    pub fn from_json<J: Json>(json: &J) -> Result<Self, Error> {
        let mut params = Self::new();
        params.merge_json(json)?;
        Ok(params)
    }

    pub fn to_json<J: Json>(&self) -> J {
        J::object_from(self.iter().map(|(name, value)| (name, value.clone())))
    }

    /// The encoded pairs without a leading `?`.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter().map(|(name, value)| (name, value.to_string())))
            .finish()
    }

    /// `?name=value&...`, or an empty string when there are no parameters.
    pub fn query_string(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!("?{}", self.encode())
        }
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}
