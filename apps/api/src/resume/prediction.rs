//! LLM role prediction: prompt, strict reply parsing, and the sentinel fallback.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::llm_client::prompts::role_prediction_prompt;
use crate::llm_client::{strip_json_fences, LlmGateway};

pub const UNABLE_TO_PREDICT: &str = "Unable to predict";
pub const ZERO_CONFIDENCE: &str = "0.00%";

/// The LLM's competing role prediction, as returned under `gemini_prediction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmPrediction {
    pub job_role: String,
    pub confidence: String,
}

impl LlmPrediction {
    /// Placeholder returned when the LLM reply cannot be used.
    pub fn unavailable() -> Self {
        Self {
            job_role: UNABLE_TO_PREDICT.to_string(),
            confidence: ZERO_CONFIDENCE.to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PredictionError {
    #[error("reply is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("reply is not a JSON object")]
    NotAnObject,

    #[error("reply is missing '{0}'")]
    MissingField(&'static str),

    #[error("'{0}' is not a string")]
    InvalidField(&'static str),
}

/// Parses the reply to the role-prediction prompt. Both `job_role` and
/// `confidence` must be present and be strings; other keys are ignored.
pub fn parse_role_prediction(reply: &str) -> Result<LlmPrediction, PredictionError> {
    let value: Value = serde_json::from_str(strip_json_fences(reply))
        .map_err(|e| PredictionError::InvalidJson(e.to_string()))?;
    let object = value.as_object().ok_or(PredictionError::NotAnObject)?;

    let field = |name: &'static str| -> Result<String, PredictionError> {
        object
            .get(name)
            .ok_or(PredictionError::MissingField(name))?
            .as_str()
            .map(str::to_string)
            .ok_or(PredictionError::InvalidField(name))
    };

    Ok(LlmPrediction {
        job_role: field("job_role")?,
        confidence: field("confidence")?,
    })
}

/// Asks the LLM for a role prediction. Never fails: any gateway or parse
/// failure is logged and replaced by `LlmPrediction::unavailable()`.
pub async fn predict_with_llm(llm: &dyn LlmGateway, resume_text: &str) -> LlmPrediction {
    let reply = match llm.generate(&role_prediction_prompt(resume_text)).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("LLM role prediction failed: {e}");
            return LlmPrediction::unavailable();
        }
    };

    parse_role_prediction(&reply).unwrap_or_else(|e| {
        warn!("LLM role prediction unusable: {e}");
        LlmPrediction::unavailable()
    })
}
