//! Logical endpoint scheme resolution.
//!
//! # Design
//! Call sites name endpoints with a logical scheme (`server://projects/`)
//! instead of hard-coding hosts, and the resolver maps each scheme to its
//! configured base URL. Main-API paths are version-remapped: a remainder
//! starting with `/v2` concatenates onto the configured base as-is, any
//! other remainder onto the base with its trailing `/v1` segment
//! stripped, so callers never carry per-call version configuration.
//!
//! An unrecognized scheme is a caller programming error, not a runtime
//! failure: the resolver logs a diagnostic and passes the input through
//! unchanged rather than panicking. A hard crash in a UI-facing layer is
//! worse than one malformed request.

use tracing::warn;

use crate::config::Endpoints;

pub const SERVER_SCHEME: &str = "server://";
pub const SERVERLESS_SCHEME: &str = "serverless://";
pub const PDF_CACHE_SCHEME: &str = "pdf-cache://";

/// Classification of a logical endpoint string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Main API, cookie-authenticated, gets the CSRF treatment.
    Server,
    Serverless,
    PdfCache,
    /// Bare absolute `http(s)://` URL, passed through untouched.
    External,
    /// Nothing we recognize; resolved as-is after a diagnostic.
    Unresolved,
}

/// Classify an endpoint string without resolving it.
pub fn classify(endpoint: &str) -> Scheme {
    if endpoint.starts_with(SERVER_SCHEME) {
        Scheme::Server
    } else if endpoint.starts_with(SERVERLESS_SCHEME) {
        Scheme::Serverless
    } else if endpoint.starts_with(PDF_CACHE_SCHEME) {
        Scheme::PdfCache
    } else if is_absolute_http(endpoint) {
        Scheme::External
    } else {
        Scheme::Unresolved
    }
}

/// Resolve a logical endpoint to the concrete URL to fetch. Never fails.
pub fn resolve(endpoints: &Endpoints, endpoint: &str) -> String {
    match classify(endpoint) {
        Scheme::Server => {
            let path = strip_scheme(endpoint, SERVER_SCHEME);
            if path.starts_with("/v2") {
                format!("{}{path}", endpoints.server)
            } else {
                format!("{}{path}", endpoints.server_version_root())
            }
        }
        Scheme::Serverless => {
            format!("{}{}", endpoints.serverless, strip_scheme(endpoint, SERVERLESS_SCHEME))
        }
        Scheme::PdfCache => {
            format!("{}{}", endpoints.pdf_cache, strip_scheme(endpoint, PDF_CACHE_SCHEME))
        }
        Scheme::External => endpoint.to_string(),
        Scheme::Unresolved => {
            warn!("unrecognized endpoint scheme: {endpoint}");
            endpoint.to_string()
        }
    }
}

/// Drop the scheme but keep the second slash, so `server://projects/`
/// leaves `/projects/`.
fn strip_scheme<'a>(endpoint: &'a str, scheme: &str) -> &'a str {
    &endpoint[scheme.len() - 1..]
}

fn is_absolute_http(endpoint: &str) -> bool {
    let head = endpoint.get(..8).unwrap_or(endpoint).to_ascii_lowercase();
    head.starts_with("http://") || head.starts_with("https://")
}
