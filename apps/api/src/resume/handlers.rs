//! Axum route handlers for the resume endpoints.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::classifier::ClassificationResult;
use crate::errors::AppError;
use crate::extraction::{extract_document, UploadedDocument};
use crate::llm_client::prompts::resume_analysis_prompt;
use crate::resume::prediction::{predict_with_llm, LlmPrediction};
use crate::state::AppState;

/// Multipart field carrying the resume.
const FILE_FIELD: &str = "file";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub filename: String,
    pub analysis: String,
}

#[derive(Debug, Serialize)]
pub struct PredictRoleResponse {
    pub trained_model: ClassificationResult,
    pub gemini_prediction: LlmPrediction,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /upload_resume/
///
/// Extracts the resume text and returns the LLM's free-text analysis of it.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    let document = read_upload(multipart).await?;
    let filename = document.filename.clone();
    let text = extract_document(document).await?;
    info!("Analyzing resume '{filename}' ({} chars)", text.len());

    let analysis = state.llm.generate(&resume_analysis_prompt(&text)).await?;

    Ok(Json(AnalysisResponse { filename, analysis }))
}

/// POST /predict_job_role/
///
/// Runs the trained classifier and the LLM prediction side by side and returns both.
/// Only the classifier can fail the request; the LLM side degrades to a placeholder.
pub async fn handle_predict_job_role(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PredictRoleResponse>, AppError> {
    if !state.classifier.is_available() {
        return Err(AppError::ModelUnavailable);
    }

    let document = read_upload(multipart).await?;
    let text = extract_document(document).await?;

    let classifier = state.classifier.clone();
    let classifier_input = text.clone();
    let trained = tokio::task::spawn_blocking(move || classifier.classify(&classifier_input));
    let gemini = predict_with_llm(state.llm.as_ref(), &text);

    let (trained, gemini_prediction) = tokio::join!(trained, gemini);
    let trained_model = trained.map_err(anyhow::Error::from)??;

    info!(
        "Predicted role: model='{}' ({:.2}%), llm='{}' ({})",
        trained_model.job_role,
        trained_model.confidence,
        gemini_prediction.job_role,
        gemini_prediction.confidence
    );

    Ok(Json(PredictRoleResponse {
        trained_model,
        gemini_prediction,
    }))
}

/// Reads the `file` field of a multipart upload.
async fn read_upload(mut multipart: Multipart) -> Result<UploadedDocument, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("Uploaded file has no filename".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read uploaded file: {e}")))?;

        return Ok(UploadedDocument { filename, bytes });
    }

    Err(AppError::Validation(format!(
        "Multipart body has no '{FILE_FIELD}' field"
    )))
}
