//! Linear text classifier evaluated from a [`ModelArtifact`]

use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::model::artifact::{ModelArtifact, Norm, ARTIFACT_FORMAT};
use crate::model::{Classifier, Label, ModelInfo};
use crate::{Error, Result};

/// Bag-of-n-grams vectorizer plus linear decision function
///
/// Immutable after construction; safe to share across request handlers.
#[derive(Debug)]
pub struct LinearTextModel {
    name: Option<String>,
    labels: [Label; 2],
    lowercase: bool,
    token_pattern: Regex,
    ngram_range: (usize, usize),
    stop_words: HashSet<String>,
    sublinear_tf: bool,
    norm: Norm,
    vocabulary: HashMap<String, usize>,
    idf: Option<Vec<f64>>,
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl LinearTextModel {
    /// Build the model from a validated artifact
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        let labels = artifact.validate()?;
        let spec = artifact.vectorizer;

        let token_pattern = Regex::new(&spec.token_pattern).map_err(|e| {
            Error::Model(format!("Invalid token_pattern '{}': {}", spec.token_pattern, e))
        })?;

        let stop_words = spec
            .stop_words
            .into_iter()
            .map(|w| if spec.lowercase { w.to_lowercase() } else { w })
            .collect();

        Ok(Self {
            name: artifact.name,
            labels,
            lowercase: spec.lowercase,
            token_pattern,
            ngram_range: (spec.ngram_range[0], spec.ngram_range[1]),
            stop_words,
            sublinear_tf: spec.sublinear_tf,
            norm: spec.norm,
            vocabulary: spec.vocabulary.into_iter().collect(),
            idf: spec.idf,
            weights: artifact.weights,
            intercepts: artifact.intercepts,
        })
    }

    /// Split text into the n-gram terms the vocabulary is keyed by
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let tokens: Vec<&str> = self
            .token_pattern
            .find_iter(&text)
            .map(|m| m.as_str())
            .filter(|token| !self.stop_words.contains(*token))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            if n > tokens.len() {
                break;
            }
            terms.extend(tokens.windows(n).map(|window| window.join(" ")));
        }
        terms
    }

    /// Sparse feature vector, sorted by vocabulary index
    pub fn transform(&self, text: &str) -> Vec<(usize, f64)> {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.analyze(text) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut features: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                let value = match &self.idf {
                    Some(idf) => tf * idf[index],
                    None => tf,
                };
                (index, value)
            })
            .collect();

        let norm = match self.norm {
            Norm::L2 => features.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
            Norm::L1 => features.iter().map(|(_, v)| v.abs()).sum::<f64>(),
            Norm::None => 1.0,
        };
        if norm > 0.0 {
            for (_, value) in features.iter_mut() {
                *value /= norm;
            }
        }
        features
    }

    /// Raw decision scores, one per weight row
    pub fn decision_scores(&self, text: &str) -> Vec<f64> {
        let features = self.transform(text);
        self.weights
            .iter()
            .zip(&self.intercepts)
            .map(|(weights, intercept)| {
                features
                    .iter()
                    .map(|&(index, value)| weights[index] * value)
                    .sum::<f64>()
                    + intercept
            })
            .collect()
    }
}

impl Classifier for LinearTextModel {
    fn predict(&self, text: &str) -> Result<Label> {
        let scores = self.decision_scores(text);

        let label = if scores.len() == 1 {
            if scores[0] > 0.0 {
                self.labels[1]
            } else {
                self.labels[0]
            }
        } else {
            // Ties resolve to the earliest label
            let mut best = 0;
            for (i, score) in scores.iter().enumerate().skip(1) {
                if *score > scores[best] {
                    best = i;
                }
            }
            self.labels[best]
        };

        Ok(label)
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            format: ARTIFACT_FORMAT.to_string(),
            name: self.name.clone(),
            labels: self.labels.to_vec(),
            vocabulary_size: self.vocabulary.len(),
            ngram_range: self.ngram_range,
        }
    }
}
