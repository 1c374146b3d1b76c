//! Purpose: Library crate behind the `xson` CLI: one JSON contract over interchangeable engines.
//! Exports: `json` (contract, coercion, backends), `api` (HTTP client facade), `core` (errors).
//! Role: Application code is written against `json::Json` and never names an engine directly.
//! Invariants: Strict accessors fail with `core::error::Error`; lenient reads return `CoercionError`.
//! Invariants: Both backends render the same document to the same compact text.
pub mod api;
pub mod core;
pub mod json;
