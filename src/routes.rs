use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use crate::translate::TranslateRequest;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/translate", post(translate))
        // Health check
        .route("/api/health", get(health_check))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "model": state.config.llm_config.model
    }))
}

async fn translate(
    State(state): State<AppState>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> Response {
    // An unreadable body is treated the same as an empty one
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("Rejected translate body: {}", rejection);
            TranslateRequest::default()
        }
    };

    let Some((text, target_lang)) = request.into_validated() else {
        return ApiError::Validation.into_response();
    };

    let request_id = Uuid::new_v4();
    let span = info_span!("translate", %request_id, target_lang = %target_lang);

    async move {
        info!("Translating {} bytes", text.len());
        match state.pipeline.run(&text, &target_lang).await {
            Ok(result) => Json(result).into_response(),
            Err(e) => ApiError::from(e).into_response(),
        }
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::llm::{ModelClient, ModelInvocationError};
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    struct FixedReply(&'static str);

    #[async_trait]
    impl ModelClient for FixedReply {
        async fn invoke(&self, _prompt: &str) -> Result<String, ModelInvocationError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingClient;

    #[async_trait]
    impl ModelClient for FailingClient {
        async fn invoke(&self, _prompt: &str) -> Result<String, ModelInvocationError> {
            Err(ModelInvocationError::Api {
                status: reqwest::StatusCode::UNAUTHORIZED,
                body: "Incorrect API key provided: sk-secret".to_string(),
            })
        }
    }

    /// Replies with a translation derived from the prompt's own text and
    /// language lines, after a delay that varies per input.
    struct EchoClient;

    #[async_trait]
    impl ModelClient for EchoClient {
        async fn invoke(&self, prompt: &str) -> Result<String, ModelInvocationError> {
            let line = |prefix: &str| {
                prompt
                    .lines()
                    .find_map(|l| l.strip_prefix(prefix))
                    .unwrap_or_default()
                    .to_string()
            };
            let text = line("Text: ");
            let language = line("Language: ");

            tokio::time::sleep(Duration::from_millis((text.len() % 7) as u64 * 5)).await;

            Ok(json!({
                "translatedText": format!("{}@{}", text, language),
                "language": language,
            })
            .to_string())
        }
    }

    fn app(llm: impl ModelClient + 'static) -> Router {
        create_routes().with_state(AppState::new(Config::default(), Arc::new(llm)))
    }

    fn translate_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/translate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn well_formed_reply_returns_translation() {
        let app = app(FixedReply(
            "```json\n{\"translatedText\": \"Bonjour\", \"language\": \"French\"}\n```",
        ));

        let (status, body) = send(
            app,
            translate_request(r#"{"text": "Hello", "targetLang": "French"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"translatedText": "Bonjour", "language": "French"}));
    }

    #[tokio::test]
    async fn unstructured_reply_returns_raw_with_200() {
        let prose = "Bonjour is the French word for hello.";
        let app = app(FixedReply(prose));

        let (status, body) = send(
            app,
            translate_request(r#"{"text": "Hello", "targetLang": "French"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"error": "Failed to parse response", "raw": prose}));
    }

    #[tokio::test]
    async fn missing_fields_return_400() {
        let bodies = [
            r#"{}"#,
            r#"{"text": "Hello"}"#,
            r#"{"targetLang": "French"}"#,
            r#"{"text": "", "targetLang": "French"}"#,
            r#"{"text": "Hello", "targetLang": ""}"#,
            r#"{"text": null, "targetLang": "French"}"#,
            r#"{"text": "Hello", "targetLang": null}"#,
        ];

        for raw in bodies {
            let (status, body) = send(app(EchoClient), translate_request(raw)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", raw);
            assert_eq!(
                body,
                json!({"error": "Missing 'text' or 'targetLang' in request body."}),
                "body: {}",
                raw
            );
        }
    }

    #[tokio::test]
    async fn unreadable_body_returns_400() {
        let (status, body) = send(app(EchoClient), translate_request("not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing 'text' or 'targetLang' in request body.");

        let no_content_type = Request::builder()
            .method("POST")
            .uri("/translate")
            .body(Body::from(r#"{"text": "Hello", "targetLang": "French"}"#))
            .unwrap();
        let (status, _) = send(app(EchoClient), no_content_type).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn model_failure_returns_generic_500() {
        let (status, body) = send(
            app(FailingClient),
            translate_request(r#"{"text": "Hello", "targetLang": "French"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Internal Server Error"}));
        assert!(!body.to_string().contains("sk-secret"));
    }

    #[tokio::test]
    async fn concurrent_requests_get_their_own_results() {
        let app = app(EchoClient);
        let languages = ["French", "German", "Spanish", "Italian", "Japanese"];

        let requests = (0..20).map(|i| {
            let app = app.clone();
            let text = format!("message number {}", i);
            let language = languages[i % languages.len()];
            async move {
                let body = json!({"text": text, "targetLang": language}).to_string();
                let (status, response) = send(app, translate_request(&body)).await;
                (text, language, status, response)
            }
        });

        for (text, language, status, response) in futures::future::join_all(requests).await {
            assert_eq!(status, StatusCode::OK);
            assert_eq!(
                response,
                json!({
                    "translatedText": format!("{}@{}", text, language),
                    "language": language,
                })
            );
        }
    }

    #[tokio::test]
    async fn server_keeps_serving_after_failure() {
        let app = app(FailingClient);
        let (status, _) = send(
            app.clone(),
            translate_request(r#"{"text": "Hello", "targetLang": "French"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, body) = send(
            app,
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["model"], "gpt-3.5-turbo");
    }
}
