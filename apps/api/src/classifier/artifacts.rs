use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use super::linear_model::LinearModel;
use super::tfidf::TfidfVectorizer;
use super::{ProbabilisticClassifier, TextVectorizer};

pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const MODEL_FILE: &str = "resume_model.json";
pub const LABEL_ENCODER_FILE: &str = "label_encoder.json";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("inconsistent artifacts: {0}")]
    Shape(String),
}

/// Maps encoded class indices back to role names.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn inverse_transform(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }
}

/// The fitted vectorizer, classifier and label encoder, loaded once and shared read-only.
pub struct ClassifierArtifacts {
    pub vectorizer: Box<dyn TextVectorizer>,
    pub model: Box<dyn ProbabilisticClassifier>,
    pub label_encoder: LabelEncoder,
}

impl ClassifierArtifacts {
    /// Loads `vectorizer.json`, `resume_model.json` and `label_encoder.json` from `dir`.
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        let vectorizer: TfidfVectorizer = read_json(&dir.join(VECTORIZER_FILE))?;
        let model: LinearModel = read_json(&dir.join(MODEL_FILE))?;
        let label_encoder: LabelEncoder = read_json(&dir.join(LABEL_ENCODER_FILE))?;

        vectorizer.validate().map_err(ArtifactError::Shape)?;
        model
            .validate(vectorizer.dimension())
            .map_err(ArtifactError::Shape)?;
        if let Some(code) = model
            .classes
            .iter()
            .find(|&&code| label_encoder.inverse_transform(code).is_none())
        {
            return Err(ArtifactError::Shape(format!(
                "model class {code} has no label ({} labels known)",
                label_encoder.classes.len()
            )));
        }

        Ok(Self {
            vectorizer: Box::new(vectorizer),
            model: Box::new(model),
            label_encoder,
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use std::path::Path;

    use serde_json::{json, Value};

    use super::{LABEL_ENCODER_FILE, MODEL_FILE, VECTORIZER_FILE};

    pub fn write_artifacts(dir: &Path, vectorizer: &Value, model: &Value, labels: &Value) {
        std::fs::write(dir.join(VECTORIZER_FILE), vectorizer.to_string()).unwrap();
        std::fs::write(dir.join(MODEL_FILE), model.to_string()).unwrap();
        std::fs::write(dir.join(LABEL_ENCODER_FILE), labels.to_string()).unwrap();
    }

    /// Two roles separated by a "rust" vs "excel" vocabulary.
    pub fn two_role_artifacts(dir: &Path) {
        write_artifacts(
            dir,
            &json!({"vocabulary": {"rust": 0, "excel": 1}, "idf": [1.0, 1.0]}),
            &json!({
                "classes": [0, 1],
                "coef": [[4.0, -4.0], [-4.0, 4.0]],
                "intercept": [0.0, 0.0]
            }),
            &json!({"classes": ["Software Engineer", "Data Analyst"]}),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::test_fixtures::{two_role_artifacts, write_artifacts};
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_valid_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        two_role_artifacts(dir.path());

        let artifacts = ClassifierArtifacts::load(dir.path()).unwrap();
        assert_eq!(artifacts.model.classes(), &[0, 1]);
        assert_eq!(artifacts.label_encoder.inverse_transform(1), Some("Data Analyst"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ClassifierArtifacts::load(dir.path()),
            Err(ArtifactError::Io { .. })
        ));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        two_role_artifacts(dir.path());
        std::fs::write(dir.path().join(MODEL_FILE), "{not json").unwrap();
        assert!(matches!(
            ClassifierArtifacts::load(dir.path()),
            Err(ArtifactError::Json { .. })
        ));
    }

    #[test]
    fn test_class_without_label_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(
            dir.path(),
            &json!({"vocabulary": {"rust": 0}, "idf": [1.0]}),
            &json!({"classes": [0, 5], "coef": [[1.0], [-1.0]], "intercept": [0.0, 0.0]}),
            &json!({"classes": ["Engineer"]}),
        );
        assert!(matches!(
            ClassifierArtifacts::load(dir.path()),
            Err(ArtifactError::Shape(_))
        ));
    }

    #[test]
    fn test_model_wider_than_vocabulary_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(
            dir.path(),
            &json!({"vocabulary": {"rust": 0}, "idf": [1.0]}),
            &json!({"classes": [0], "coef": [[1.0, 2.0]], "intercept": [0.0]}),
            &json!({"classes": ["Engineer"]}),
        );
        assert!(matches!(
            ClassifierArtifacts::load(dir.path()),
            Err(ArtifactError::Shape(_))
        ));
    }
}
