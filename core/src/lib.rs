//! Request/response transformation pipeline for the DEEP client.
//!
//! # Overview
//! Every network call the application makes passes through this crate:
//! logical endpoint schemes (`server://`, `serverless://`, `pdf-cache://`)
//! are resolved to concrete URLs, request options are shaped per payload
//! kind (JSON, multipart form-data, binary passthrough), same-origin calls
//! get their CSRF token injected, successful responses are decoded by
//! content type, and every failure is normalized into one uniform
//! [`ClientError`] value that UI call sites branch on.
//!
//! # Design
//! - `RequestPipeline` is stateless — it holds only the endpoint
//!   configuration (host-does-IO pattern). The request-scheduling layer
//!   executes the actual round-trip between `build_request` and
//!   `decode_response`, making the pipeline fully deterministic and
//!   testable without a network.
//! - The pipeline never throws past its own boundary: transport, parse,
//!   and server failures all come back as data, and an unrecognized
//!   endpoint scheme degrades to a logged diagnostic plus passthrough.
//! - Error normalization is pure; the optional failure toast is a
//!   separate [`notify`] step composed only at call sites that asked
//!   for it.

pub mod build;
pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod form;
pub mod http;
pub mod notify;
pub mod scheme;

pub use build::{Body, RequestDeclaration, RequestOptions, CSRF_HEADER};
pub use client::RequestPipeline;
pub use config::Endpoints;
pub use decode::{DecodedResponse, DecodeError};
pub use error::{
    ClientError, ErrorReason, ErrorValue, FailureCause, FieldErrors, ServerErrorPayload,
    INTERNAL_ERROR_KEY,
};
pub use form::{FilePart, FormScalar, FormValue, MultipartPart, PartBody};
pub use http::{Credentials, HttpMethod, RawResponse, RequestBody, ResolvedRequest};
pub use notify::{LogSink, Notification, NotificationSink, NOTIFICATION_DURATION};
pub use scheme::Scheme;
