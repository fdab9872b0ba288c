use std::sync::Arc;

use crate::classifier::RoleClassifier;
use crate::llm_client::LlmGateway;

/// Default multipart body limit (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Gateway to the generative model. Default: `GeminiClient`.
    pub llm: Arc<dyn LlmGateway>,
    /// Built once at startup; unavailable if the artifacts failed to load.
    pub classifier: RoleClassifier,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(llm: Arc<dyn LlmGateway>, classifier: RoleClassifier) -> Self {
        Self {
            llm,
            classifier,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
