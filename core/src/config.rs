//! Base-endpoint configuration for the DEEP backend family.
//!
//! # Design
//! The pipeline talks to three distinct backends (the versioned main API,
//! the serverless functions, and the pdf cache) plus arbitrary external
//! URLs. Each backend's base URL is configuration, not code, so the same
//! client binary can point at production, staging, or a local mock. The
//! `environment` tag namespaces the CSRF cookie so sessions from different
//! deployments sharing a domain cannot collide.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use tracing::warn;

/// Base URLs for every backend the pipeline can target, plus the
/// deployment environment tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Main API base, including its trailing version segment (`/v1`).
    pub server: String,
    /// Serverless functions base. No version remapping applies.
    pub serverless: String,
    /// Pdf cache base. No version remapping applies.
    pub pdf_cache: String,
    /// Deployment tag (`production`, `staging`, ...) used to name the
    /// CSRF cookie.
    pub environment: String,
}

impl Endpoints {
    pub fn new(server: &str, serverless: &str, pdf_cache: &str, environment: &str) -> Self {
        Self {
            server: server.trim_end_matches('/').to_string(),
            serverless: serverless.trim_end_matches('/').to_string(),
            pdf_cache: pdf_cache.trim_end_matches('/').to_string(),
            environment: environment.to_string(),
        }
    }

    /// Load endpoints from `DEEP_*` environment variables, falling back to
    /// local-development defaults with a warning per missing variable.
    pub fn from_env() -> Self {
        let server: String = try_load("DEEP_SERVER_ENDPOINT", "http://localhost:8000/api/v1");
        let serverless: String = try_load("DEEP_SERVERLESS_ENDPOINT", "http://localhost:8001");
        let pdf_cache: String = try_load("DEEP_PDF_CACHE_ENDPOINT", "http://localhost:8002");
        let environment: String = try_load("DEEP_ENVIRONMENT", "development");
        Self::new(&server, &serverless, &pdf_cache, &environment)
    }

    /// Name of the same-origin cookie carrying the CSRF token.
    pub fn csrf_cookie_name(&self) -> String {
        format!("deep-{}-csrftoken", self.environment)
    }

    /// The `server` base with its trailing API-version segment removed.
    /// Plain (non-`/v2`) server paths concatenate onto this root.
    pub fn server_version_root(&self) -> &str {
        self.server.strip_suffix("/v1").unwrap_or(&self.server)
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        warn!("environment variable {key} not found, using default {default}");
        default.to_string()
    });
    raw.parse().unwrap_or_else(|e| {
        warn!("could not parse {key}={raw}: {e}, using default {default}");
        default.parse().map_err(|_| ()).expect("default must parse")
    })
}
