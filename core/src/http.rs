//! Plain-data request and response types.
//!
//! # Design
//! The pipeline never performs I/O. It produces `ResolvedRequest` values
//! and consumes `RawResponse` values; the host (the request-scheduling
//! layer, or the integration tests) executes the actual round-trip between
//! the two. This keeps every transform deterministic and unit-testable
//! without a network.
//!
//! All fields use owned types (`String`, `Vec`) so values can be handed
//! across task boundaries without lifetime concerns.

use crate::form::MultipartPart;

/// HTTP method for a request. Declarations default to `Get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// Whether the host should attach same-origin cookies to the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Credentials {
    #[default]
    Omit,
    Include,
}

/// Finalized body of a resolved request. Exactly one encoding is chosen
/// per request; the variants are mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    /// Serialized JSON text.
    Json(String),
    /// Multipart form-data parts, to be framed by the host (or by
    /// [`crate::form::encode_multipart`]).
    Multipart(Vec<MultipartPart>),
}

impl RequestBody {
    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }
}

/// The concrete request handed to the underlying fetch mechanism.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    pub credentials: Credentials,
}

impl ResolvedRequest {
    /// Value of the first header matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A raw response handed back by the host for decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    /// Value of the `Content-Type` header, if the response carried one.
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}
