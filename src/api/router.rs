//! Report API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//!
//! Layers (outermost → innermost): request tracing → body size limit.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::AppState;

/// Build the report API router.
///
/// `/simplify_report/` is also served without the trailing slash.
pub fn report_api_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/simplify_report/", post(endpoints::reports::simplify))
        .route("/simplify_report", post(endpoints::reports::simplify))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::pipeline::extraction::ocr::MockOcrEngine;
    use crate::pipeline::extraction::orchestrator::ReportTextExtractor;
    use crate::pipeline::extraction::types::OcrConfig;
    use crate::pipeline::processor::ReportPipeline;
    use crate::pipeline::safety::grounding::ResultGuardrail;
    use crate::pipeline::structuring::gemini::MockLlmClient;
    use crate::pipeline::structuring::orchestrator::StructuredExtractor;
    use crate::pipeline::structuring::types::{FinishReason, GenerationParams, LlmResponse};
    use crate::pipeline::test_support::png_bytes;

    const BOUNDARY: &str = "report-simplifier-test-boundary";
    const REPORT_TEXT: &str = "Hemoglobin 10.2 g/dL Low WBC 11500 /uL High";
    const MODEL_JSON: &str = r#"{
        "tests": [
            {"name": "Hemoglobin", "value": 10.2, "unit": "g/dL", "status": "low",
             "ref_range": {"low": 12.0, "high": 16.0}},
            {"name": "Potassium", "value": 4.1, "unit": "mmol/L", "status": "normal"}
        ],
        "summary": "Your hemoglobin is a little low."
    }"#;

    fn test_state(ocr: MockOcrEngine, llm: MockLlmClient) -> AppState {
        let pipeline = ReportPipeline::new(
            ReportTextExtractor::new(Arc::new(ocr), OcrConfig::default()),
            StructuredExtractor::new(Arc::new(llm), GenerationParams::default()),
            ResultGuardrail::default(),
        );
        AppState::new(Arc::new(pipeline))
    }

    fn default_app() -> Router {
        report_api_router(test_state(
            MockOcrEngine::new(REPORT_TEXT),
            MockLlmClient::with_text(MODEL_JSON),
        ))
    }

    fn multipart_body(field: &str, content: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"report.png\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload(uri: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_reports_version() {
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = default_app().oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::config::APP_VERSION);
    }

    #[tokio::test]
    async fn simplify_returns_verified_result() {
        let req = upload("/simplify_report/", multipart_body("file", &png_bytes()));
        let response = default_app().oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["summary"], "Your hemoglobin is a little low.");
        assert_eq!(json["tests"].as_array().unwrap().len(), 1);
        assert_eq!(json["tests"][0]["name"], "Hemoglobin");
        assert_eq!(json["tests"][0]["ref_range"]["low"], 12.0);
        let warnings = json["warnings"].as_array().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].as_str().unwrap().contains("Potassium"));
        assert!(json.get("explanations").is_none());
    }

    #[tokio::test]
    async fn route_without_trailing_slash_also_works() {
        let req = upload("/simplify_report", multipart_body("file", &png_bytes()));
        let response = default_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn all_tests_verified_omits_warnings() {
        let app = report_api_router(test_state(
            MockOcrEngine::new(REPORT_TEXT),
            MockLlmClient::with_text(
                r#"{"tests": [{"name": "WBC", "value": 11500, "unit": "/uL", "status": "high"}],
                    "summary": "Your white cell count is high."}"#,
            ),
        ));
        let req = upload("/simplify_report/", multipart_body("file", &png_bytes()));
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert!(json.get("warnings").is_none());
        assert_eq!(json["tests"][0]["status"], "high");
    }

    #[tokio::test]
    async fn missing_file_field_is_400() {
        let req = upload("/simplify_report/", multipart_body("document", &png_bytes()));
        let response = default_app().oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["detail"], "No file provided");
    }

    #[tokio::test]
    async fn undecodable_image_is_400() {
        let req = upload("/simplify_report/", multipart_body("file", b"%PDF-1.4 not an image"));
        let response = default_app().oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert!(json["detail"].as_str().unwrap().contains("Invalid image file"));
    }

    #[tokio::test]
    async fn blank_ocr_text_is_400() {
        let app = report_api_router(test_state(
            MockOcrEngine::new("   "),
            MockLlmClient::with_text(MODEL_JSON),
        ));
        let req = upload("/simplify_report/", multipart_body("file", &png_bytes()));
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn safety_block_is_500_with_reason() {
        let app = report_api_router(test_state(
            MockOcrEngine::new(REPORT_TEXT),
            MockLlmClient::new(LlmResponse {
                text: None,
                finish_reason: Some(FinishReason::Safety),
                block_reason: None,
            }),
        ));
        let req = upload("/simplify_report/", multipart_body("file", &png_bytes()));
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert_eq!(json["reason"], "blocked_by_policy");
    }

    #[tokio::test]
    async fn oversized_upload_is_413() {
        let state = test_state(
            MockOcrEngine::new(REPORT_TEXT),
            MockLlmClient::with_text(MODEL_JSON),
        )
        .with_max_upload_bytes(1024);
        let app = report_api_router(state);

        let req = upload("/simplify_report/", multipart_body("file", &vec![0u8; 8 * 1024]));
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn non_multipart_body_is_400_with_json_detail() {
        let req = Request::builder()
            .method("POST")
            .uri("/simplify_report/")
            .header("Content-Type", "application/json")
            .body(Body::from(r#"{"file": "not an upload"}"#))
            .unwrap();
        let response = default_app().oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
        let json = json_body(response).await;
        assert!(!json["detail"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_on_simplify_is_405() {
        let req = Request::builder()
            .uri("/simplify_report/")
            .body(Body::empty())
            .unwrap();
        let response = default_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
