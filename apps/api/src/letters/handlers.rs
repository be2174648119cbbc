//! Axum route handlers for the Letters API.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::letters::models::{GenerateLettersRequest, GenerateLettersResponse};
use crate::letters::orchestrator;
use crate::letters::validation::validate_request;
use crate::state::AppState;

/// POST /api/generate
///
/// Validates the submission, generates one letter per valid application entry
/// and returns them in submission order. Individual generation failures come
/// back inside the affected letter, never as a request failure.
pub async fn handle_generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateLettersRequest>, JsonRejection>,
) -> Result<Json<GenerateLettersResponse>, AppError> {
    let Json(request) = payload
        .map_err(|e| AppError::Validation(format!("Invalid request body: {}", e.body_text())))?;

    let (profile, targets) = validate_request(request)?;

    let request_id = Uuid::new_v4();
    let span = info_span!("generate", %request_id, applications = targets.len());

    async move {
        info!("Accepted letter request");
        let letters = orchestrator::run(
            Arc::clone(&state.provider),
            Arc::new(profile),
            targets,
            state.config.max_concurrent_generations,
        )
        .await?;
        Ok::<_, AppError>(Json(GenerateLettersResponse { letters }))
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::routes::build_router;
    use crate::state::AppState;

    fn app() -> Router {
        build_router(AppState::for_tests())
    }

    async fn post_generate(body: String) -> (StatusCode, Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/generate")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_single_application_scenario() {
        let (status, body) = post_generate(
            json!({
                "fullName": "Asha Rai",
                "applications": [{ "company": "Acme", "role": "Frontend Developer" }]
            })
            .to_string(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let letters = body["letters"].as_array().unwrap();
        assert_eq!(letters.len(), 1);
        assert_eq!(letters[0]["emailSubject"], "Application for Frontend Developer at Acme");
        assert_eq!(letters[0]["hiringManager"], "Hiring Manager");
        assert!(!letters[0]["coverLetter"].as_str().unwrap().is_empty());
        assert_eq!(letters[0]["status"], "generated");
        assert_eq!(letters[0]["fullName"], "Asha Rai");
    }

    #[tokio::test]
    async fn test_letters_match_application_order() {
        let (status, body) = post_generate(
            json!({
                "fullName": "Asha Rai",
                "email": "asha@example.com",
                "applications": [
                    { "company": "Acme", "role": "Frontend Developer" },
                    { "company": "Globex", "role": "SRE", "hiringManager": "Hank" },
                    { "company": "Initech", "role": "Backend Engineer" }
                ]
            })
            .to_string(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let companies: Vec<&str> = body["letters"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["company"].as_str().unwrap())
            .collect();
        assert_eq!(companies, vec!["Acme", "Globex", "Initech"]);
        assert_eq!(body["letters"][1]["hiringManager"], "Hank");
        let email_body = body["letters"][0]["emailBody"].as_str().unwrap();
        assert!(email_body.contains("Email: asha@example.com"));
        assert!(!email_body.contains("Phone:"));
    }

    #[tokio::test]
    async fn test_empty_applications_is_400() {
        let (status, body) = post_generate(
            json!({ "fullName": "Asha Rai", "applications": [] }).to_string(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Missing required fields"));
        assert!(body.get("letters").is_none());
    }

    #[tokio::test]
    async fn test_missing_full_name_is_400() {
        let (status, body) = post_generate(
            json!({ "applications": [{ "company": "Acme", "role": "Dev" }] }).to_string(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let (status, body) = post_generate("{\"fullName\": ".to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn test_wrong_field_type_is_400() {
        let (status, _) = post_generate(
            json!({ "fullName": 42, "applications": [{ "company": "Acme", "role": "Dev" }] })
                .to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
