//! Response decoding on the success channel.
//!
//! # Design
//! Decoding branches only on `(status, content-type)`. Success bodies are
//! either JSON (parsed) or opaque bytes (returned untouched); failure
//! statuses yield [`DecodedResponse::Empty`] because error extraction
//! happens on the separate error channel, where the request layer hands
//! the parsed error payload to the normalizer.
//!
//! A 2xx JSON body that fails to parse yields a [`DecodeError`]; the
//! pipeline facade folds that into the normalized `parse` error rather
//! than letting it escape.

use std::fmt;

use crate::http::RawResponse;

/// Decoded body of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedResponse {
    Json(serde_json::Value),
    /// Non-JSON content (pdf exports and the like), bytes untouched.
    Binary(Vec<u8>),
    /// No decodable body: empty JSON response or a failure status.
    Empty,
}

/// A 2xx response that claimed JSON but did not contain it.
#[derive(Debug)]
pub struct DecodeError {
    message: String,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "response decode failed: {}", self.message)
    }
}

impl std::error::Error for DecodeError {}

/// Decode one raw response per the `(status, content-type)` state machine.
pub fn decode(response: RawResponse) -> Result<DecodedResponse, DecodeError> {
    if !(200..300).contains(&response.status) {
        return Ok(DecodedResponse::Empty);
    }

    if !is_json(response.content_type.as_deref()) {
        return Ok(DecodedResponse::Binary(response.body));
    }

    let text = std::str::from_utf8(&response.body).map_err(|e| DecodeError {
        message: e.to_string(),
    })?;
    if text.is_empty() {
        return Ok(DecodedResponse::Empty);
    }
    serde_json::from_str(text)
        .map(DecodedResponse::Json)
        .map_err(|e| DecodeError {
            message: e.to_string(),
        })
}

/// `application/json`, ignoring parameters like `; charset=utf-8`.
fn is_json(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };
    let media_type = content_type.split(';').next().unwrap_or("").trim();
    media_type.eq_ignore_ascii_case("application/json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn json_response(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status,
            content_type: Some("application/json".to_string()),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn json_body_is_parsed() {
        let decoded = decode(json_response(200, r#"{"id": 7}"#)).unwrap();
        assert_eq!(decoded, DecodedResponse::Json(json!({"id": 7})));
    }

    #[test]
    fn empty_json_body_decodes_to_empty_not_a_parse_error() {
        let decoded = decode(json_response(204, "")).unwrap();
        assert_eq!(decoded, DecodedResponse::Empty);
    }

    #[test]
    fn charset_parameter_still_counts_as_json() {
        let response = RawResponse {
            status: 200,
            content_type: Some("application/json; charset=utf-8".to_string()),
            body: b"[1,2]".to_vec(),
        };
        assert_eq!(decode(response).unwrap(), DecodedResponse::Json(json!([1, 2])));
    }

    #[test]
    fn non_json_content_returns_raw_bytes() {
        let bytes = b"%PDF-1.4 fake".to_vec();
        let response = RawResponse {
            status: 200,
            content_type: Some("application/pdf".to_string()),
            body: bytes.clone(),
        };
        assert_eq!(decode(response).unwrap(), DecodedResponse::Binary(bytes));
    }

    #[test]
    fn missing_content_type_is_treated_as_binary() {
        let response = RawResponse {
            status: 200,
            content_type: None,
            body: b"anything".to_vec(),
        };
        assert_eq!(decode(response).unwrap(), DecodedResponse::Binary(b"anything".to_vec()));
    }

    #[test]
    fn failure_status_decodes_to_empty_without_reading_body() {
        for status in [400, 403, 404, 500] {
            let decoded = decode(json_response(status, "this is not json")).unwrap();
            assert_eq!(decoded, DecodedResponse::Empty, "status {status}");
        }
    }

    #[test]
    fn malformed_json_on_success_status_is_a_decode_error() {
        let err = decode(json_response(200, "{broken")).unwrap_err();
        assert!(err.to_string().contains("decode failed"));
    }
}
