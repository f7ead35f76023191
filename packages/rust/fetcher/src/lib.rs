//! HTTP side of eo-tracker.
//!
//! [`Fetcher`] runs the watermark-driven query against the documents search
//! API and downloads full-text documents; [`resolve_document_url`] maps a
//! record to its document location.

mod client;
mod document;

pub use client::{FetchOutcome, Fetcher};
pub use document::resolve_document_url;
