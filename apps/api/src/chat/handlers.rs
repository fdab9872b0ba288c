use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// POST /httpchat
///
/// Forwards the message to the LLM unmodified and returns its reply.
pub async fn handle_http_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| AppError::Validation(rejection.body_text()))?;

    let response = state.llm.generate(&request.message).await?;

    Ok(Json(ChatResponse { response }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::classifier::RoleClassifier;
    use crate::llm_client::test_support::FakeGateway;
    use crate::routes::build_router;
    use crate::state::AppState;

    fn chat_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/httpchat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(llm: Arc<FakeGateway>, body: &str) -> (StatusCode, Value) {
        let state = AppState::new(llm, RoleClassifier::unavailable());
        let response = build_router(state).oneshot(chat_request(body)).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_chat_returns_gateway_reply() {
        let llm = Arc::new(FakeGateway::replying("hello"));
        let (status, body) = send(llm.clone(), r#"{"message": "hi"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"response": "hello"}));
        assert_eq!(llm.prompts(), vec!["hi".to_string()]);
    }

    #[tokio::test]
    async fn test_chat_gateway_failure_is_server_error_with_description() {
        let llm = Arc::new(FakeGateway::failing(500, "backend unavailable"));
        let (status, body) = send(llm, r#"{"message": "hi"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "LLM_ERROR");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("backend unavailable"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_client_error() {
        let llm = Arc::new(FakeGateway::replying("unused"));
        for body in [r#"{"text": "hi"}"#, "not json", r#"{"message": 42}"#] {
            let (status, response) = send(llm.clone(), body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
            assert_eq!(response["error"]["code"], "VALIDATION_ERROR");
        }
        assert_eq!(llm.calls(), 0);
    }
}
