//! Fitted linear classifier (logistic regression) producing class probabilities.

use serde::Deserialize;

use super::{FeatureVector, ProbabilisticClassifier};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiClass {
    /// Softmax over all decision values.
    #[default]
    Multinomial,
    /// One-vs-rest: per-class sigmoid, renormalized to sum to one.
    Ovr,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    /// Encoded label for each probability column.
    pub classes: Vec<u32>,
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    #[serde(default)]
    pub multi_class: MultiClass,
}

impl LinearModel {
    fn is_binary(&self) -> bool {
        self.coef.len() == 1 && self.classes.len() == 2
    }

    /// Checks row/column counts against each other and the feature dimension.
    pub fn validate(&self, dimension: usize) -> Result<(), String> {
        if self.coef.is_empty() {
            return Err("model has no coefficient rows".to_string());
        }
        if self.intercept.len() != self.coef.len() {
            return Err(format!(
                "{} intercepts for {} coefficient rows",
                self.intercept.len(),
                self.coef.len()
            ));
        }
        if !self.is_binary() && self.classes.len() != self.coef.len() {
            return Err(format!(
                "{} classes for {} coefficient rows",
                self.classes.len(),
                self.coef.len()
            ));
        }
        if let Some(row) = self.coef.iter().find(|row| row.len() != dimension) {
            return Err(format!(
                "coefficient row has {} columns, vectorizer produces {dimension}",
                row.len()
            ));
        }
        Ok(())
    }

    fn decision(&self, features: &FeatureVector) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, intercept)| {
                intercept
                    + features
                        .entries()
                        .iter()
                        .filter_map(|(column, value)| row.get(*column).map(|w| w * value))
                        .sum::<f64>()
            })
            .collect()
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

impl ProbabilisticClassifier for LinearModel {
    fn classes(&self) -> &[u32] {
        &self.classes
    }

    fn predict_proba(&self, features: &FeatureVector) -> Vec<f64> {
        let scores = self.decision(features);

        if self.is_binary() {
            let positive = sigmoid(scores[0]);
            return vec![1.0 - positive, positive];
        }

        match self.multi_class {
            MultiClass::Multinomial => softmax(&scores),
            MultiClass::Ovr => {
                let probabilities: Vec<f64> = scores.into_iter().map(sigmoid).collect();
                let total: f64 = probabilities.iter().sum();
                probabilities.into_iter().map(|p| p / total).collect()
            }
        }
    }
}
