//! Multipart form-data values and wire framing.
//!
//! # Design
//! Form payloads are declared as structured values and lowered to a flat
//! list of [`MultipartPart`]s by one rule set: list values append one part
//! per element, scalars append one part, and an absent value appends a
//! single empty-string part so the server always receives the key. File
//! values are appended as raw bytes; everything else is stringified.
//!
//! The part list is the unit the builder and the tests reason about;
//! [`encode_multipart`] frames it into RFC 2046 bytes when the host needs
//! the wire form.

use uuid::Uuid;

/// Raw file content carried inside a form field.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// A single form field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FormScalar {
    /// Stringified on encode: strings are appended verbatim, every other
    /// JSON value via its JSON rendering (`1`, `true`, `null`, ...).
    Value(serde_json::Value),
    /// Appended as-is, bytes untouched.
    File(FilePart),
}

/// Value declared for one form key.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    /// Declared but absent. Encoded as one empty-string part so the server
    /// still sees the key.
    Absent,
    Scalar(FormScalar),
    List(Vec<FormScalar>),
}

/// Body of one multipart part.
#[derive(Debug, Clone, PartialEq)]
pub enum PartBody {
    Text(String),
    File(FilePart),
}

/// One `name`/`body` pair of a multipart form-data body.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartPart {
    pub name: String,
    pub body: PartBody,
}

/// Lower declared form fields to the flat part list.
pub fn to_parts(fields: &[(String, FormValue)]) -> Vec<MultipartPart> {
    let mut parts = Vec::new();
    for (name, value) in fields {
        match value {
            FormValue::Absent => parts.push(MultipartPart {
                name: name.clone(),
                body: PartBody::Text(String::new()),
            }),
            FormValue::Scalar(scalar) => parts.push(scalar_part(name, scalar)),
            FormValue::List(scalars) => {
                for scalar in scalars {
                    parts.push(scalar_part(name, scalar));
                }
            }
        }
    }
    parts
}

fn scalar_part(name: &str, scalar: &FormScalar) -> MultipartPart {
    let body = match scalar {
        FormScalar::Value(serde_json::Value::String(s)) => PartBody::Text(s.clone()),
        FormScalar::Value(other) => PartBody::Text(other.to_string()),
        FormScalar::File(file) => PartBody::File(file.clone()),
    };
    MultipartPart {
        name: name.to_string(),
        body,
    }
}

/// Interpret a JSON object as form fields, one field per key. `null`
/// maps to [`FormValue::Absent`], arrays to [`FormValue::List`].
pub fn object_to_fields(object: &serde_json::Value) -> Vec<(String, FormValue)> {
    let Some(map) = object.as_object() else {
        return Vec::new();
    };
    map.iter()
        .map(|(key, value)| {
            let form_value = match value {
                serde_json::Value::Null => FormValue::Absent,
                serde_json::Value::Array(items) => {
                    FormValue::List(items.iter().cloned().map(FormScalar::Value).collect())
                }
                other => FormValue::Scalar(FormScalar::Value(other.clone())),
            };
            (key.clone(), form_value)
        })
        .collect()
}

/// Fresh multipart boundary, unique per request.
pub fn boundary() -> String {
    format!("deep-boundary-{}", Uuid::new_v4().simple())
}

/// Frame parts as `multipart/form-data` bytes with the given boundary.
pub fn encode_multipart(parts: &[MultipartPart], boundary: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for part in parts {
        out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        match &part.body {
            PartBody::Text(text) => {
                out.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                        part.name
                    )
                    .as_bytes(),
                );
                out.extend_from_slice(text.as_bytes());
            }
            PartBody::File(file) => {
                out.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        part.name, file.filename, file.content_type
                    )
                    .as_bytes(),
                );
                out.extend_from_slice(&file.data);
            }
        }
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    out
}
