//! Stateless facade over the four transforms.
//!
//! # Design
//! `RequestPipeline` holds only the endpoint configuration and carries no
//! mutable state between calls. Each network call passes through it
//! twice: once to lower the declaration into a [`ResolvedRequest`], and
//! once to decode the response (or normalize the failure) the host hands
//! back. The host executes the round-trip in between; retries,
//! cancellation and de-duplication belong to that scheduling layer, not
//! here.

use crate::build::{self, RequestDeclaration};
use crate::config::Endpoints;
use crate::decode::{self, DecodedResponse};
use crate::error::{normalize, ClientError, FailureCause};
use crate::http::{RawResponse, ResolvedRequest};
use crate::notify::{Notification, NotificationSink};
use crate::scheme;

/// Stateless request/response transformation pipeline.
#[derive(Debug, Clone)]
pub struct RequestPipeline {
    endpoints: Endpoints,
}

impl RequestPipeline {
    pub fn new(endpoints: Endpoints) -> Self {
        Self { endpoints }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Resolve a logical endpoint to the concrete URL. Never fails;
    /// unrecognized schemes pass through after a diagnostic.
    pub fn resolve_url(&self, endpoint: &str) -> String {
        scheme::resolve(&self.endpoints, endpoint)
    }

    /// Lower a declaration into the request the host should execute.
    /// `cookies` is the host's same-origin cookie string, if any.
    pub fn build_request(
        &self,
        declaration: &RequestDeclaration,
        cookies: Option<&str>,
    ) -> ResolvedRequest {
        build::build(&self.endpoints, declaration, cookies)
    }

    /// Decode a success-channel response. A 2xx body that claims JSON but
    /// fails to parse comes back as a normalized `parse` error, the same
    /// channel every other parse failure uses.
    pub fn decode_response(&self, response: RawResponse) -> Result<DecodedResponse, ClientError> {
        decode::decode(response).map_err(|e| {
            tracing::warn!("response decode failed: {e}");
            normalize(FailureCause::Parse)
        })
    }

    /// Normalize a failure without any notification side effect.
    pub fn normalize_failure(&self, cause: FailureCause) -> ClientError {
        normalize(cause)
    }

    /// Normalize a failure and, iff the declaration asked for one, emit a
    /// single notification through `sink`. The returned error is the same
    /// either way.
    pub fn fail(
        &self,
        declaration: &RequestDeclaration,
        cause: FailureCause,
        sink: &dyn NotificationSink,
    ) -> ClientError {
        let error = normalize(cause);
        if let Some(title) = &declaration.options.failure_message {
            sink.notify(Notification::for_failure(title, &error));
        }
        error
    }
}
