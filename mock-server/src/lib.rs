//! Mock DEEP backend for pipeline integration tests.
//!
//! Serves the response shapes the request pipeline has to survive, laid
//! out the way version remapping resolves them for a configured base of
//! `/api/v1` (plain endpoints at the `/api` version root, the `/v2`
//! family under the versioned base): a CSRF-protected mutation with
//! django-style per-field validation errors, a multipart upload endpoint
//! that reports what it received, a binary pdf route, an empty 204, and
//! a serverless-style function route.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateLead {
    pub title: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Lead>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/api/projects/", get(list_projects))
        .route("/api/v1/v2/analysis-frameworks/", get(list_frameworks))
        .route("/api/leads/", post(create_lead))
        .route("/api/leads/{id}/", delete(delete_lead))
        .route("/api/files/", post(receive_files))
        .route("/pdf/{name}", get(serve_pdf))
        .route("/fn/source-extract/", get(source_extract))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_projects() -> Json<serde_json::Value> {
    Json(json!({
        "count": 2,
        "results": [
            {"id": 1, "title": "Crisis overview"},
            {"id": 2, "title": "Field assessments"},
        ]
    }))
}

async fn list_frameworks() -> Json<serde_json::Value> {
    Json(json!({
        "count": 1,
        "results": [{"id": 11, "title": "Generic framework", "generation": 2}]
    }))
}

/// Django-style error body: `{errorCode, errors: {field: [messages]}}`.
fn error_body(
    status: StatusCode,
    error_code: i64,
    errors: serde_json::Value,
) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(json!({"errorCode": error_code, "errors": errors})))
}

async fn create_lead(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateLead>,
) -> impl IntoResponse {
    if headers.get(CSRF_HEADER).is_none() {
        return error_body(
            StatusCode::FORBIDDEN,
            4031,
            json!({"nonFieldErrors": ["CSRF token missing"]}),
        )
        .into_response();
    }

    let Some(title) = input.title.filter(|t| !t.is_empty()) else {
        return error_body(
            StatusCode::BAD_REQUEST,
            400,
            json!({
                "nonFieldErrors": ["Lead is not valid"],
                "title": ["This field is required."],
            }),
        )
        .into_response();
    };

    let lead = Lead {
        id: Uuid::new_v4(),
        title,
        source: input.source,
    };
    db.write().await.insert(lead.id, lead.clone());
    (StatusCode::CREATED, Json(lead)).into_response()
}

async fn delete_lead(State(db): State<Db>, Path(id): Path<Uuid>) -> StatusCode {
    if db.write().await.remove(&id).is_some() {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Echo back how many parts arrived under each field name, so tests can
/// assert the multipart framing survived the wire.
async fn receive_files(mut multipart: Multipart) -> impl IntoResponse {
    let mut counts: HashMap<String, u32> = HashMap::new();
    let mut empty_values = 0u32;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let name = field.name().unwrap_or("").to_string();
                let bytes = match field.bytes().await {
                    Ok(bytes) => bytes,
                    Err(_) => {
                        return error_body(
                            StatusCode::BAD_REQUEST,
                            400,
                            json!({"nonFieldErrors": ["Malformed multipart body"]}),
                        )
                        .into_response()
                    }
                };
                if bytes.is_empty() {
                    empty_values += 1;
                }
                *counts.entry(name).or_default() += 1;
            }
            Ok(None) => break,
            Err(_) => {
                return error_body(
                    StatusCode::BAD_REQUEST,
                    400,
                    json!({"nonFieldErrors": ["Malformed multipart body"]}),
                )
                .into_response()
            }
        }
    }
    Json(json!({"counts": counts, "emptyValues": empty_values})).into_response()
}

async fn serve_pdf(Path(name): Path<String>) -> impl IntoResponse {
    let body = format!("%PDF-1.4\n% mock document {name}\n%%EOF\n");
    ([(header::CONTENT_TYPE, "application/pdf")], body.into_bytes())
}

/// Serverless-style function. Reports whether a CSRF header arrived so
/// tests can assert the pipeline withheld it for this trust domain.
async fn source_extract(headers: HeaderMap) -> Json<serde_json::Value> {
    Json(json!({
        "extract": "Sample extracted text.",
        "csrfSeen": headers.get(CSRF_HEADER).is_some(),
    }))
}
