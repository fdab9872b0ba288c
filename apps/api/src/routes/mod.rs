pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::chat::{handlers as chat_handlers, session};
use crate::resume::handlers as resume_handlers;
use crate::state::AppState;

const WELCOME_MESSAGE: &str =
    "Welcome to the resume role API. Upload a resume to get an analysis or a predicted job role.";

/// GET /
async fn root_handler() -> Json<Value> {
    Json(json!({ "message": WELCOME_MESSAGE }))
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health::health_handler))
        // Resume API
        .route("/upload_resume/", post(resume_handlers::handle_upload_resume))
        .route(
            "/predict_job_role/",
            post(resume_handlers::handle_predict_job_role),
        )
        // Chat API
        .route("/httpchat", post(chat_handlers::handle_http_chat))
        .route("/chat", get(session::handle_chat_socket))
        .layer(body_limit)
        .with_state(state)
}
