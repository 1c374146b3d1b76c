//! Purpose: HTTP client facade whose payloads flow through the JSON value contract.
//! Exports: `Client`, `ClientConfig`, `Pending`, request/response types, `Headers`, `Parameters`.
//! Role: Thin, transport-pluggable surface; documents are built and read with `crate::json`.
//! Invariants: Headers and parameters convert to and from any `Json` backend without loss.
mod client;
mod headers;
mod params;
mod request;
mod status;
mod transport;

pub use crate::core::error::{Error, ErrorKind};
pub use client::{Client, ClientConfig, DEFAULT_MAX_IN_FLIGHT, DEFAULT_TIMEOUT, Pending};
pub use headers::{CONTENT_LENGTH, CONTENT_TYPE, Headers};
pub use params::Parameters;
pub use request::{Body, JSON_CONTENT_TYPE, Method, RequestSpec, Response};
pub use status::Status;
pub use transport::{Prepared, Reply, Transport, UreqTransport};
