//! Analysis Client — the single point of contact with the résumé analysis service.
//!
//! One request per call: no retry, no timeout beyond the transport defaults,
//! no cancellation. Every response goes through `classify_response` so HTTP
//! status, envelope flags and missing substructures map to one error taxonomy.

use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::Endpoints;
use crate::intake::{Submission, PDF_MIME};
use crate::models::{AnalysisResult, ApiEnvelope, RawAnalysis};

/// Shown when neither the transport nor the server says anything more useful.
pub const GENERIC_FAILURE: &str = "Analysis failed, please try again";
/// `success: false` without an error string.
pub const REJECTED_FALLBACK: &str = "Analysis failed";

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Network failure, non-2xx status, or a body that is not an envelope.
    #[error("{message}")]
    Transport { status: Option<u16>, message: String },

    /// The envelope carried `success: false`. The server text is kept verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error("Analysis returned no result")]
    EmptyResult,

    #[error("Analysis result is incomplete ({detail})")]
    Malformed { detail: String },
}

impl AnalysisError {
    fn generic(status: Option<u16>) -> Self {
        AnalysisError::Transport {
            status,
            message: GENERIC_FAILURE.to_string(),
        }
    }
}

/// The analysis service as seen by the session. Swappable for tests.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    async fn analyze(&self, submission: &Submission) -> Result<AnalysisResult, AnalysisError>;

    /// The server's canned sample analysis.
    async fn sample(&self) -> Result<AnalysisResult, AnalysisError>;

    /// Liveness check; returns the server's greeting.
    async fn ping(&self) -> Result<String, AnalysisError>;
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    content: &'a str,
}

#[derive(Clone)]
pub struct HttpAnalysisClient {
    client: Client,
    endpoints: Endpoints,
}

impl HttpAnalysisClient {
    pub fn new(endpoints: Endpoints) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, endpoints })
    }

    fn request_for(&self, submission: &Submission) -> Result<RequestBuilder, AnalysisError> {
        match submission {
            Submission::File(pdf) => {
                let part = multipart::Part::bytes(pdf.bytes().to_vec())
                    .file_name(pdf.file_name().to_string())
                    .mime_str(PDF_MIME)
                    .map_err(|e| {
                        error!("Failed to build multipart body: {e}");
                        AnalysisError::generic(None)
                    })?;
                let form = multipart::Form::new().part("file", part);
                Ok(self.client.post(&self.endpoints.upload).multipart(form))
            }
            Submission::Text(text) => Ok(self
                .client
                .post(&self.endpoints.analyze)
                .json(&AnalyzeRequest { content: text })),
        }
    }

    /// Sends the request once and returns the status and body text.
    async fn execute(&self, request: RequestBuilder) -> Result<(u16, String), AnalysisError> {
        let response = request.send().await.map_err(|e| {
            error!("Analysis request failed: {e}");
            AnalysisError::generic(None)
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read analysis response body (status {status}): {e}");
            AnalysisError::generic(Some(status))
        })?;

        debug!("Analysis service answered {status} with {} bytes", body.len());
        Ok((status, body))
    }
}

#[async_trait]
impl AnalysisApi for HttpAnalysisClient {
    async fn analyze(&self, submission: &Submission) -> Result<AnalysisResult, AnalysisError> {
        info!("Submitting {} payload for analysis", submission.kind());
        let request = self.request_for(submission)?;
        let (status, body) = self.execute(request).await?;
        classify_response(status, &body)
    }

    async fn sample(&self) -> Result<AnalysisResult, AnalysisError> {
        let (status, body) = self.execute(self.client.get(&self.endpoints.sample)).await?;
        classify_response(status, &body)
    }

    async fn ping(&self) -> Result<String, AnalysisError> {
        let (status, body) = self.execute(self.client.get(&self.endpoints.test)).await?;
        unwrap_envelope::<String>(status, &body)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Response classification
// ────────────────────────────────────────────────────────────────────────────

/// Maps one HTTP exchange to a validated result or a descriptive error.
pub fn classify_response(status: u16, body: &str) -> Result<AnalysisResult, AnalysisError> {
    let raw: RawAnalysis = unwrap_envelope(status, body)?;
    raw.into_result().map_err(|e| {
        warn!("Analysis service returned an incomplete result: {e}");
        AnalysisError::Malformed {
            detail: e.to_string(),
        }
    })
}

fn unwrap_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, AnalysisError> {
    if !(200..300).contains(&status) {
        let message = server_message(body).unwrap_or_else(|| GENERIC_FAILURE.to_string());
        warn!("Analysis service returned {status}: {message}");
        return Err(AnalysisError::Transport {
            status: Some(status),
            message,
        });
    }

    let envelope: ApiEnvelope<Value> = serde_json::from_str(body).map_err(|e| {
        warn!("Analysis response is not a valid envelope: {e}");
        AnalysisError::generic(Some(status))
    })?;

    if !envelope.success {
        let message = envelope
            .error
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| REJECTED_FALLBACK.to_string());
        return Err(AnalysisError::Rejected(message));
    }

    let data = envelope.data.ok_or(AnalysisError::EmptyResult)?;
    serde_json::from_value(data).map_err(|e| AnalysisError::Malformed {
        detail: e.to_string(),
    })
}

/// Extracts a human-readable message from an error body, if the server sent one.
/// Accepts `{error: "..."}`, `{error: {message: "..."}}` and `{message: "..."}`.
fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = match value.get("error") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(obj @ Value::Object(_)) => obj
            .get("message")
            .and_then(Value::as_str)
            .map(String::from),
        _ => None,
    }
    .or_else(|| value.get("message").and_then(Value::as_str).map(String::from));
    message.filter(|m| !m.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Multipart, State},
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;

    use super::*;
    use crate::intake::PdfFile;
    use crate::models::TagCategory;

    fn john_doe_envelope() -> Value {
        json!({
            "success": true,
            "data": {
                "personalInfo": {"name": "John Doe"},
                "tags": [{"id": "1", "name": "Python", "type": "SKILL", "confidence": 0.9}]
            }
        })
    }

    async fn spawn_stub(router: Router) -> Endpoints {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Endpoints::from_base(&format!("http://{addr}")).unwrap()
    }

    // ── classify_response ───────────────────────────────────────────────────

    #[test]
    fn test_rejected_message_surfaced_unmodified() {
        let err = classify_response(200, r#"{"success": false, "error": "X"}"#).unwrap_err();
        match err {
            AnalysisError::Rejected(message) => assert_eq!(message, "X"),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn test_rejected_without_message_uses_fallback() {
        let err = classify_response(200, r#"{"success": false}"#).unwrap_err();
        assert_eq!(err.to_string(), REJECTED_FALLBACK);
    }

    #[test]
    fn test_success_without_data_is_empty_result() {
        let err = classify_response(200, r#"{"success": true, "data": null}"#).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyResult));
    }

    #[test]
    fn test_missing_tags_is_malformed() {
        let body = r#"{"success": true, "data": {"personalInfo": {"name": "A"}}}"#;
        let err = classify_response(200, body).unwrap_err();
        match err {
            AnalysisError::Malformed { detail } => assert!(detail.contains("tags")),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_wrongly_typed_data_is_malformed() {
        let body = r#"{"success": true, "data": {"personalInfo": {}, "tags": "oops"}}"#;
        let err = classify_response(200, body).unwrap_err();
        assert!(matches!(err, AnalysisError::Malformed { .. }));
    }

    #[test]
    fn test_non_2xx_surfaces_server_message() {
        let err = classify_response(500, r#"{"success": false, "error": "PDF parse blew up"}"#)
            .unwrap_err();
        match err {
            AnalysisError::Transport { status, message } => {
                assert_eq!(status, Some(500));
                assert_eq!(message, "PDF parse blew up");
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[test]
    fn test_non_2xx_nested_error_message() {
        let err = classify_response(400, r#"{"error": {"code": "X", "message": "bad input"}}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "bad input");
    }

    #[test]
    fn test_non_2xx_without_body_is_generic() {
        let err = classify_response(502, "<html>Bad Gateway</html>").unwrap_err();
        assert_eq!(err.to_string(), GENERIC_FAILURE);
    }

    #[test]
    fn test_2xx_non_envelope_is_generic_transport() {
        let err = classify_response(200, "not json").unwrap_err();
        assert!(matches!(err, AnalysisError::Transport { .. }));
    }

    #[test]
    fn test_well_formed_envelope_classified_ok() {
        let result = classify_response(200, &john_doe_envelope().to_string()).unwrap();
        assert_eq!(result.personal_info().display_name(), "John Doe");
        assert_eq!(result.tags().len(), 1);
        assert_eq!(result.tags()[0].category, TagCategory::Skill);
    }

    #[test]
    fn test_fractional_score_is_accepted() {
        let body = json!({
            "success": true,
            "data": {
                "personalInfo": {"name": "John Doe"},
                "tags": [{"id": "1", "name": "Python", "type": "SKILL", "confidence": 0.9, "score": 7.5}]
            }
        });
        let result = classify_response(200, &body.to_string()).unwrap();
        assert_eq!(result.tags()[0].score, Some(7.5));
    }

    // ── HTTP round trips against a stub server ──────────────────────────────

    #[tokio::test]
    async fn test_text_path_posts_content_json() {
        let captured: Arc<Mutex<Option<Value>>> = Arc::default();

        async fn analyze(
            State(captured): State<Arc<Mutex<Option<Value>>>>,
            Json(body): Json<Value>,
        ) -> Json<Value> {
            *captured.lock().unwrap() = Some(body);
            Json(john_doe_envelope())
        }

        let router = Router::new()
            .route("/api/resume/analyze", post(analyze))
            .with_state(captured.clone());
        let client = HttpAnalysisClient::new(spawn_stub(router).await).unwrap();

        let submission = Submission::Text("John Doe, Skills: Python, Go".to_string());
        let result = client.analyze(&submission).await.unwrap();

        assert_eq!(
            captured.lock().unwrap().clone(),
            Some(json!({"content": "John Doe, Skills: Python, Go"}))
        );
        assert_eq!(result.tags()[0].name, "Python");
    }

    #[tokio::test]
    async fn test_file_path_posts_single_multipart_file_field() {
        type Captured = Arc<Mutex<Vec<(String, String, String, usize)>>>;
        let captured: Captured = Arc::default();

        async fn upload(State(captured): State<Captured>, mut multipart: Multipart) -> Json<Value> {
            while let Some(field) = multipart.next_field().await.unwrap() {
                let name = field.name().unwrap_or_default().to_string();
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let len = field.bytes().await.unwrap().len();
                captured
                    .lock()
                    .unwrap()
                    .push((name, file_name, content_type, len));
            }
            Json(john_doe_envelope())
        }

        let router = Router::new()
            .route("/api/resume/upload", post(upload))
            .with_state(captured.clone());
        let client = HttpAnalysisClient::new(spawn_stub(router).await).unwrap();

        let bytes = b"%PDF-1.4\n%%EOF".to_vec();
        let pdf = PdfFile::from_bytes("cv.pdf", bytes.clone()).unwrap();
        client.analyze(&Submission::File(pdf)).await.unwrap();

        let fields = captured.lock().unwrap().clone();
        assert_eq!(
            fields,
            vec![(
                "file".to_string(),
                "cv.pdf".to_string(),
                PDF_MIME.to_string(),
                bytes.len()
            )]
        );
    }

    #[tokio::test]
    async fn test_http_error_status_surfaces_server_message() {
        let router = Router::new().route(
            "/api/resume/analyze",
            post(|| async {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({"success": false, "error": "model overloaded"})),
                )
            }),
        );
        let client = HttpAnalysisClient::new(spawn_stub(router).await).unwrap();

        let err = client
            .analyze(&Submission::Text("text".to_string()))
            .await
            .unwrap_err();
        match err {
            AnalysisError::Transport { status, message } => {
                assert_eq!(status, Some(503));
                assert_eq!(message, "model overloaded");
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_generic_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let endpoints = Endpoints::from_base(&format!("http://{addr}")).unwrap();
        let client = HttpAnalysisClient::new(endpoints).unwrap();
        let err = client
            .analyze(&Submission::Text("text".to_string()))
            .await
            .unwrap_err();
        match err {
            AnalysisError::Transport { status, message } => {
                assert_eq!(status, None);
                assert_eq!(message, GENERIC_FAILURE);
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_sample_and_ping() {
        let router = Router::new()
            .route("/api/resume/sample", get(|| async { Json(john_doe_envelope()) }))
            .route(
                "/api/resume/test",
                get(|| async { Json(json!({"success": true, "data": "API is working!"})) }),
            );
        let client = HttpAnalysisClient::new(spawn_stub(router).await).unwrap();

        let sample = client.sample().await.unwrap();
        assert_eq!(sample.personal_info().display_name(), "John Doe");
        assert_eq!(client.ping().await.unwrap(), "API is working!");
    }
}
