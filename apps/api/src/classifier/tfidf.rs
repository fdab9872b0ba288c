//! TF-IDF vectorizer restored from a fitted vocabulary and idf weights.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::{FeatureVector, TextVectorizer};

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid token pattern"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    L2,
    None,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

#[derive(Debug, Clone, Deserialize)]
pub struct TfidfVectorizer {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default, deserialize_with = "deserialize_norm")]
    pub norm: Norm,
}

/// `null` in the artifact means no normalization.
fn deserialize_norm<'de, D>(deserializer: D) -> Result<Norm, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Norm>::deserialize(deserializer)?.unwrap_or(Norm::None))
}

impl TfidfVectorizer {
    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    /// Checks the fitted state is internally consistent.
    pub fn validate(&self) -> Result<(), String> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(format!("invalid ngram_range ({min_n}, {max_n})"));
        }
        if let Some((term, column)) = self.vocabulary.iter().find(|(_, column)| **column >= self.idf.len()) {
            return Err(format!(
                "vocabulary term '{term}' maps to column {column} but idf has {} entries",
                self.idf.len()
            ));
        }
        Ok(())
    }

    fn terms(&self, tokens: &[&str]) -> Vec<String> {
        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            if n == 1 {
                terms.extend(tokens.iter().map(|t| t.to_string()));
            } else {
                terms.extend(tokens.windows(n).map(|w| w.join(" ")));
            }
        }
        terms
    }
}

impl TextVectorizer for TfidfVectorizer {
    fn transform(&self, text: &str) -> FeatureVector {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = TOKEN.find_iter(&lowered).map(|m| m.as_str()).collect();

        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in self.terms(&tokens) {
            if let Some(&column) = self.vocabulary.get(&term) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(column, count)| {
                let tf = if self.sublinear_tf { 1.0 + count.ln() } else { count };
                (column, tf * self.idf[column])
            })
            .collect();
        entries.sort_by_key(|(column, _)| *column);

        if self.norm == Norm::L2 {
            let length = entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
            if length > 0.0 {
                for (_, value) in entries.iter_mut() {
                    *value /= length;
                }
            }
        }

        FeatureVector::new(entries)
    }
}
