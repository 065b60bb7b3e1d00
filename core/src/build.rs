//! Request declarations and the option builder.
//!
//! # Design
//! Callers declare what they want to send (endpoint, verb, payload, header
//! overrides, option flags) and the builder lowers that into the one
//! concrete [`ResolvedRequest`] the host executes. Three mutually
//! exclusive encoding modes are selected by flag precedence
//! `form_data` > `is_file` > default JSON.
//!
//! The CSRF step runs after header merging, on purpose: callers must not
//! be able to override the token, and only `server://` targets (same
//! origin, cookie-authenticated) receive it at all.

use crate::config::Endpoints;
use crate::form::{self, FormValue};
use crate::http::{Credentials, HttpMethod, RequestBody, ResolvedRequest};
use crate::scheme::{self, Scheme};

pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Option flags attached to one request declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Encode the payload as multipart form-data. Wins over `is_file`.
    pub form_data: bool,
    /// Binary upload/download passthrough: no request body, octet-stream
    /// content type.
    pub is_file: bool,
    /// When set, a failure on this call raises a user-facing notification
    /// titled with this message.
    pub failure_message: Option<String>,
}

/// Payload declared by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(serde_json::Value),
    Form(Vec<(String, FormValue)>),
}

/// One network call as declared at the call site. Constructed fresh per
/// call, consumed once by the builder.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDeclaration {
    pub endpoint: String,
    pub method: HttpMethod,
    /// Header overrides; they win over mode defaults on key collision.
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
    pub options: RequestOptions,
}

impl RequestDeclaration {
    /// A plain GET of `endpoint` with no payload and default options.
    pub fn get(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            method: HttpMethod::Get,
            headers: Vec::new(),
            body: None,
            options: RequestOptions::default(),
        }
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn json_body(mut self, value: serde_json::Value) -> Self {
        self.body = Some(Body::Json(value));
        self
    }

    pub fn form_body(mut self, fields: Vec<(String, FormValue)>) -> Self {
        self.body = Some(Body::Form(fields));
        self.options.form_data = true;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn failure_message(mut self, message: &str) -> Self {
        self.options.failure_message = Some(message.to_string());
        self
    }
}

/// Lower a declaration into the concrete request, injecting credentials
/// and the CSRF token for same-origin targets. `cookies` is the host's
/// cookie string (`"a=1; b=2"`), if any.
pub fn build(
    endpoints: &Endpoints,
    declaration: &RequestDeclaration,
    cookies: Option<&str>,
) -> ResolvedRequest {
    let url = scheme::resolve(endpoints, &declaration.endpoint);

    let (defaults, body) = if declaration.options.form_data {
        (
            vec![("Accept".to_string(), "application/json".to_string())],
            RequestBody::Multipart(form_parts(declaration)),
        )
    } else if declaration.options.is_file {
        // Caller-supplied payload is discarded: file requests carry their
        // bytes outside this layer.
        (
            vec![
                ("Accept".to_string(), "*/*".to_string()),
                ("Content-Type".to_string(), "application/octet-stream".to_string()),
            ],
            RequestBody::Empty,
        )
    } else {
        (
            vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("Content-Type".to_string(), "application/json; charset=utf-8".to_string()),
            ],
            json_body(declaration),
        )
    };

    let mut headers = merge_headers(defaults, &declaration.headers);
    let mut credentials = Credentials::Omit;

    if scheme::classify(&declaration.endpoint) == Scheme::Server {
        credentials = Credentials::Include;
        let cookie_name = endpoints.csrf_cookie_name();
        match cookies.and_then(|c| cookie_value(c, &cookie_name)) {
            Some(token) => set_header(&mut headers, CSRF_HEADER, &token),
            // a caller-supplied token is never trusted; without the
            // cookie the header is dropped entirely
            None => remove_header(&mut headers, CSRF_HEADER),
        }
    }

    ResolvedRequest {
        method: declaration.method,
        url,
        headers,
        body,
        credentials,
    }
}

fn form_parts(declaration: &RequestDeclaration) -> Vec<form::MultipartPart> {
    match &declaration.body {
        Some(Body::Form(fields)) => form::to_parts(fields),
        Some(Body::Json(object)) => form::to_parts(&form::object_to_fields(object)),
        None => Vec::new(),
    }
}

fn json_body(declaration: &RequestDeclaration) -> RequestBody {
    match &declaration.body {
        Some(Body::Json(value)) => RequestBody::Json(value.to_string()),
        Some(Body::Form(_)) => {
            // Form payload without the form_data flag is a caller error.
            tracing::warn!(
                "form payload on non-form request to {}, sending empty body",
                declaration.endpoint
            );
            RequestBody::Empty
        }
        None => RequestBody::Empty,
    }
}

/// Defaults first, caller overrides win on case-insensitive key collision.
fn merge_headers(
    defaults: Vec<(String, String)>,
    overrides: &[(String, String)],
) -> Vec<(String, String)> {
    let mut merged = defaults;
    for (name, value) in overrides {
        set_header(&mut merged, name, value);
    }
    merged
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    match headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
        Some(existing) => existing.1 = value.to_string(),
        None => headers.push((name.to_string(), value.to_string())),
    }
}

fn remove_header(headers: &mut Vec<(String, String)>, name: &str) {
    headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
}

/// Value of the named cookie inside a `"a=1; b=2"` cookie string.
fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key.trim() == name).then(|| value.trim().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormScalar, PartBody};
    use serde_json::json;

    fn endpoints() -> Endpoints {
        Endpoints::new(
            "https://api.example.org/api/v1",
            "https://services.example.org",
            "https://pdf.example.org",
            "test",
        )
    }

    #[test]
    fn default_mode_serializes_json_and_sets_content_type() {
        let decl = RequestDeclaration::get("server://projects/")
            .method(HttpMethod::Post)
            .json_body(json!({"a": 1}));
        let req = build(&endpoints(), &decl, None);

        let RequestBody::Json(body) = &req.body else {
            panic!("expected JSON body, got {:?}", req.body);
        };
        let round_trip: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(round_trip, json!({"a": 1}));
        assert!(req.header("Content-Type").unwrap().starts_with("application/json"));
        assert_eq!(req.header("Accept"), Some("application/json"));
    }

    #[test]
    fn default_mode_without_payload_sends_empty_body() {
        let req = build(&endpoints(), &RequestDeclaration::get("server://projects/"), None);
        assert!(req.body.is_empty());
    }

    #[test]
    fn form_data_mode_encodes_multipart() {
        let decl = RequestDeclaration::get("server://leads/")
            .method(HttpMethod::Post)
            .form_body(vec![
                (
                    "tags".to_string(),
                    FormValue::List(vec![
                        FormScalar::Value(json!(1)),
                        FormScalar::Value(json!(2)),
                        FormScalar::Value(json!(3)),
                    ]),
                ),
                ("assignee".to_string(), FormValue::Absent),
            ]);
        let req = build(&endpoints(), &decl, None);

        let RequestBody::Multipart(parts) = &req.body else {
            panic!("expected multipart body, got {:?}", req.body);
        };
        assert_eq!(parts.iter().filter(|p| p.name == "tags").count(), 3);
        let placeholders: Vec<_> = parts.iter().filter(|p| p.name == "assignee").collect();
        assert_eq!(placeholders.len(), 1);
        assert_eq!(placeholders[0].body, PartBody::Text(String::new()));
        assert_eq!(req.header("Accept"), Some("application/json"));
        // multipart requests leave the content type to the wire framer
        assert_eq!(req.header("Content-Type"), None);
    }

    #[test]
    fn form_data_flag_wins_over_is_file() {
        let mut decl = RequestDeclaration::get("server://leads/").form_body(Vec::new());
        decl.options.is_file = true;
        let req = build(&endpoints(), &decl, None);
        assert!(matches!(req.body, RequestBody::Multipart(_)));
    }

    #[test]
    fn is_file_mode_forces_empty_body() {
        let mut decl = RequestDeclaration::get("server://export/")
            .method(HttpMethod::Post)
            .json_body(json!({"ignored": true}));
        decl.options.is_file = true;
        let req = build(&endpoints(), &decl, None);

        assert!(req.body.is_empty());
        assert_eq!(req.header("Content-Type"), Some("application/octet-stream"));
        assert_eq!(req.header("Accept"), Some("*/*"));
    }

    #[test]
    fn caller_headers_win_over_mode_defaults() {
        let decl = RequestDeclaration::get("https://elsewhere.example.net/feed")
            .header("accept", "text/xml");
        let req = build(&endpoints(), &decl, None);
        assert_eq!(req.header("Accept"), Some("text/xml"));
        // only one Accept header survives the merge
        let count = req
            .headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case("accept"))
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn server_target_gets_csrf_token_and_credentials() {
        let decl = RequestDeclaration::get("server://projects/");
        let req = build(&endpoints(), &decl, Some("other=1; deep-test-csrftoken=XYZ"));
        assert_eq!(req.header(CSRF_HEADER), Some("XYZ"));
        assert_eq!(req.credentials, Credentials::Include);
    }

    #[test]
    fn serverless_target_gets_no_csrf_token() {
        let decl = RequestDeclaration::get("serverless://source-extract/");
        let req = build(&endpoints(), &decl, Some("deep-test-csrftoken=XYZ"));
        assert_eq!(req.header(CSRF_HEADER), None);
        assert_eq!(req.credentials, Credentials::Omit);
    }

    #[test]
    fn external_target_gets_no_csrf_token() {
        let decl = RequestDeclaration::get("https://elsewhere.example.net/x");
        let req = build(&endpoints(), &decl, Some("deep-test-csrftoken=XYZ"));
        assert_eq!(req.header(CSRF_HEADER), None);
        assert_eq!(req.credentials, Credentials::Omit);
    }

    #[test]
    fn caller_cannot_override_csrf_header() {
        let decl = RequestDeclaration::get("server://projects/")
            .header(CSRF_HEADER, "forged");
        let req = build(&endpoints(), &decl, Some("deep-test-csrftoken=real"));
        assert_eq!(req.header(CSRF_HEADER), Some("real"));
    }

    #[test]
    fn forged_csrf_header_is_dropped_when_cookie_is_missing() {
        let decl = RequestDeclaration::get("server://projects/")
            .header(CSRF_HEADER, "forged");
        let req = build(&endpoints(), &decl, None);
        assert_eq!(req.header(CSRF_HEADER), None);

        let req = build(&endpoints(), &decl, Some("unrelated=1"));
        assert_eq!(req.header(CSRF_HEADER), None);
    }

    #[test]
    fn missing_cookie_leaves_header_unset_but_includes_credentials() {
        let decl = RequestDeclaration::get("server://projects/");
        let req = build(&endpoints(), &decl, Some("unrelated=1"));
        assert_eq!(req.header(CSRF_HEADER), None);
        assert_eq!(req.credentials, Credentials::Include);
    }

    #[test]
    fn cookie_value_handles_whitespace_and_order() {
        assert_eq!(
            cookie_value("  a=1;  deep-test-csrftoken=tok ; b=2", "deep-test-csrftoken"),
            Some("tok".to_string())
        );
        assert_eq!(cookie_value("a=1", "missing"), None);
    }

    #[test]
    fn declaration_defaults_to_get() {
        let decl = RequestDeclaration::get("server://projects/");
        assert_eq!(decl.method, HttpMethod::Get);
        let req = build(&endpoints(), &decl, None);
        assert_eq!(req.method, HttpMethod::Get);
    }
}
