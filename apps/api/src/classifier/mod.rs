//! Role classifier: normalize, vectorize and classify resume text with pre-fitted artifacts.
//!
//! The vectorizer and classifier sit behind traits so the artifact format can
//! change without touching the handlers. `AppState` holds a `RoleClassifier`,
//! which is unavailable (every call fails) when the artifacts did not load.

use std::path::Path;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{info, warn};

pub mod artifacts;
pub mod linear_model;
pub mod normalize;
pub mod tfidf;

pub use artifacts::{ClassifierArtifacts, LabelEncoder};

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Model files not loaded properly.")]
    ModelUnavailable,

    #[error("Predicted class {0} has no label")]
    UnknownLabel(u32),

    #[error("Classifier produced no probabilities")]
    EmptyDistribution,

    #[error("Classifier returned {probabilities} probabilities for {classes} classes")]
    ShapeMismatch { probabilities: usize, classes: usize },
}

/// Sparse feature vector as (column, weight) pairs sorted by column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector(Vec<(usize, f64)>);

impl FeatureVector {
    pub fn new(entries: Vec<(usize, f64)>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.0
    }
}

/// Turns normalized text into a fixed-dimension feature vector.
pub trait TextVectorizer: Send + Sync {
    fn transform(&self, text: &str) -> FeatureVector;
}

/// A fitted classifier exposing one probability per entry of `classes()`.
pub trait ProbabilisticClassifier: Send + Sync {
    /// Encoded label for each probability column.
    fn classes(&self) -> &[u32];

    fn predict_proba(&self, features: &FeatureVector) -> Vec<f64>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub job_role: String,
    /// Maximum class probability as a percentage, 0 to 100.
    #[serde(serialize_with = "serialize_percentage")]
    pub confidence: f64,
}

fn serialize_percentage<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_percentage(*value))
}

/// Two-decimal percentage, e.g. `85.50%`.
pub fn format_percentage(value: f64) -> String {
    format!("{value:.2}%")
}

#[derive(Clone, Default)]
pub struct RoleClassifier {
    artifacts: Option<Arc<ClassifierArtifacts>>,
}

impl RoleClassifier {
    pub fn new(artifacts: ClassifierArtifacts) -> Self {
        Self {
            artifacts: Some(Arc::new(artifacts)),
        }
    }

    pub fn unavailable() -> Self {
        Self { artifacts: None }
    }

    /// Loads artifacts from `dir`. A failure is logged and leaves the classifier unavailable;
    /// the rest of the service keeps running.
    pub fn load(dir: &Path) -> Self {
        match ClassifierArtifacts::load(dir) {
            Ok(artifacts) => {
                info!(
                    "Role classifier loaded from {} ({} roles)",
                    dir.display(),
                    artifacts.label_encoder.classes.len()
                );
                Self::new(artifacts)
            }
            Err(e) => {
                warn!("Role classifier unavailable: {e}");
                Self::unavailable()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.artifacts.is_some()
    }

    /// Predicts the job role for raw extracted resume text.
    pub fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifierError> {
        let artifacts = self
            .artifacts
            .as_ref()
            .ok_or(ClassifierError::ModelUnavailable)?;

        let normalized = normalize::normalize(text);
        let features = artifacts.vectorizer.transform(&normalized);
        let probabilities = artifacts.model.predict_proba(&features);
        let classes = artifacts.model.classes();
        if probabilities.len() != classes.len() {
            return Err(ClassifierError::ShapeMismatch {
                probabilities: probabilities.len(),
                classes: classes.len(),
            });
        }

        let (best, max_probability) = probabilities
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, p)| match best {
                Some((_, top)) if top >= p => best,
                _ => Some((i, p)),
            })
            .ok_or(ClassifierError::EmptyDistribution)?;

        let code = classes[best];
        let job_role = artifacts
            .label_encoder
            .inverse_transform(code)
            .ok_or(ClassifierError::UnknownLabel(code))?
            .to_string();

        Ok(ClassificationResult {
            job_role,
            confidence: max_probability * 100.0,
        })
    }
}
