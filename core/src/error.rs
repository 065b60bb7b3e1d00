//! Failure causes and the normalized client error.
//!
//! # Design
//! Every failure a call can hit (transport down, undecodable body, or a
//! server-side rejection) is folded into one [`ClientError`] value so UI
//! call sites branch on `reason` and nothing else. The server's per-field
//! error map is reshaped for form redisplay: the `nonFieldErrors` key is
//! remapped to the reserved `$internal` key, array messages are joined
//! with a single space, and everything else passes through by field path.
//!
//! `normalize` is pure. The user-facing notification that may accompany a
//! failure lives in [`crate::notify`], composed separately at the call
//! site that asked for it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Reserved `faram_errors` key for errors not tied to any form field.
pub const INTERNAL_ERROR_KEY: &str = "$internal";

const NETWORK_ERROR_MESSAGE: &str = "Network error";
const PARSE_ERROR_MESSAGE: &str = "Response parse error";
const SERVER_ERROR_MESSAGE: &str = "Server error";
const FALLBACK_ERROR_MESSAGE: &str = "Some error occurred";

/// Per-field error value as the server sends it: a single message or a
/// list of messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldErrors {
    Single(String),
    Multiple(Vec<String>),
}

impl FieldErrors {
    /// One display string per field: lists are joined with a single space.
    pub fn join(&self) -> String {
        match self {
            FieldErrors::Single(message) => message.clone(),
            FieldErrors::Multiple(messages) => messages.join(" "),
        }
    }
}

/// Structured error payload the server returns on failure statuses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerErrorPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub errors: BTreeMap<String, FieldErrors>,
}

/// Which channel a failure arrived on.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureCause {
    /// No response obtained at all.
    Network,
    /// A response body could not be decoded.
    Parse,
    /// A failure response, with the server's payload when it sent one.
    Server(Option<ServerErrorPayload>),
}

/// Failure classification surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorReason {
    Network,
    Parse,
    Server,
}

/// Message payload of a [`ClientError`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorValue {
    /// Human string for toasts. Always non-empty.
    pub message_for_notification: String,
    /// Field path to message, for inline form redisplay. Non-field errors
    /// live under [`INTERNAL_ERROR_KEY`].
    pub faram_errors: BTreeMap<String, String>,
    /// The untransformed server payload, when one was received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ServerErrorPayload>,
}

/// The uniform error shape surfaced to every caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientError {
    pub reason: ErrorReason,
    pub value: ErrorValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value.message_for_notification)
    }
}

impl std::error::Error for ClientError {}

/// Map a failure cause to the normalized error. Pure: no notification is
/// emitted here.
pub fn normalize(cause: FailureCause) -> ClientError {
    match cause {
        FailureCause::Network => fixed(ErrorReason::Network, NETWORK_ERROR_MESSAGE),
        FailureCause::Parse => fixed(ErrorReason::Parse, PARSE_ERROR_MESSAGE),
        FailureCause::Server(None) => fixed(ErrorReason::Server, SERVER_ERROR_MESSAGE),
        FailureCause::Server(Some(payload)) => {
            let mut faram_errors = BTreeMap::new();
            for (field, errors) in &payload.errors {
                let key = if field == "nonFieldErrors" {
                    INTERNAL_ERROR_KEY
                } else {
                    field.as_str()
                };
                faram_errors.insert(key.to_string(), errors.join());
            }
            let message_for_notification = faram_errors
                .get(INTERNAL_ERROR_KEY)
                .cloned()
                .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());
            ClientError {
                reason: ErrorReason::Server,
                error_code: payload.error_code,
                value: ErrorValue {
                    message_for_notification,
                    faram_errors,
                    errors: Some(payload),
                },
            }
        }
    }
}

fn fixed(reason: ErrorReason, message: &str) -> ClientError {
    ClientError {
        reason,
        value: ErrorValue {
            message_for_notification: message.to_string(),
            faram_errors: BTreeMap::from([(INTERNAL_ERROR_KEY.to_string(), message.to_string())]),
            errors: None,
        },
        error_code: None,
    }
}
