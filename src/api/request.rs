//! Purpose: Request and response values exchanged with the client.
//! Exports: `Method`, `Body`, `RequestSpec`, `Response`.
//! Role: Plain data; the client fills in timings, the transport fills in status and payload.
//! Invariants: A non-2xx status is still a `Response`; only transport failures are errors.
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{Headers, Parameters, Status};
use crate::core::error::{Error, ErrorKind};
use crate::json::Json;

pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            "TRACE" => Ok(Method::Trace),
            _ => Err(Error::new(ErrorKind::Usage)
                .with_message(format!("unsupported http method: {raw}"))),
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Body {
    pub content_type: Option<String>,
    pub data: String,
}

impl Body {
    pub fn text(data: impl Into<String>) -> Self {
        Self {
            content_type: Some("text/plain".to_string()),
            data: data.into(),
        }
    }

    pub fn json<J: Json>(document: &J) -> Self {
        Self {
            content_type: Some(JSON_CONTENT_TYPE.to_string()),
            data: document.serialize(false),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// What to send: method, path relative to the client's base URL, and optional extras.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub params: Option<Parameters>,
    pub headers: Option<Headers>,
    pub body: Option<Body>,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: None,
            headers: None,
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn with_params(mut self, params: Parameters) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_json<J: Json>(self, document: &J) -> Self {
        self.with_body(Body::json(document))
    }
}

#[derive(Clone, Debug)]
pub struct Response {
    pub method: Method,
    pub path: String,
    pub status: Status,
    pub headers: Headers,
    pub body: Option<Body>,
    pub queued_at: Instant,
    pub started_at: Instant,
    pub finished_at: Instant,
}

impl Response {
    /// Parses the body into a document of the caller's chosen backend.
    pub fn json<J: Json>(&self) -> Result<J, Error> {
        J::parse(&self.body()?.data)
    }

    /// Deserializes the body straight into a typed value.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_str(&self.body()?.data).map_err(|err| {
            Error::new(ErrorKind::Parse)
                .with_message("response body does not match the expected shape")
                .with_source(err)
        })
    }

    pub fn text(&self) -> &str {
        self.body.as_ref().map_or("", |body| body.data.as_str())
    }

    /// Time spent waiting for a free worker.
    pub fn queued_for(&self) -> Duration {
        self.started_at.saturating_duration_since(self.queued_at)
    }

    /// Time spent on the wire.
    pub fn elapsed(&self) -> Duration {
        self.finished_at.saturating_duration_since(self.started_at)
    }

    fn body(&self) -> Result<&Body, Error> {
        self.body.as_ref().ok_or_else(|| {
            Error::new(ErrorKind::Usage)
                .with_message(format!("response to {} {} has no body", self.method, self.path))
        })
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.method, self.path, self.status)
    }
}
