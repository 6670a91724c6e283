//! Model artifact format
//!
//! A JSON export of an already-trained text pipeline: a bag-of-n-grams
//! vectorizer (optionally IDF weighted) followed by linear weights.
//!
//! ```json
//! {
//!   "format": "linear-text",
//!   "labels": ["functional", "non-functional"],
//!   "vectorizer": {
//!     "ngram_range": [1, 2],
//!     "vocabulary": { "shall": 0, "response time": 1 },
//!     "idf": [1.2, 3.4]
//!   },
//!   "weights": [[-0.3, 2.1]],
//!   "intercepts": [0.05]
//! }
//! ```
//!
//! With a single weight row the positive side selects `labels[1]`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::model::Label;
use crate::{Error, Result};

/// Format tag every artifact must carry
pub const ARTIFACT_FORMAT: &str = "linear-text";

/// Serialized classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format: String,
    #[serde(default)]
    pub name: Option<String>,
    pub labels: Vec<String>,
    pub vectorizer: VectorizerSpec,
    pub weights: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

/// Text vectorizer parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerSpec {
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: [usize; 2],
    #[serde(default)]
    pub stop_words: Vec<String>,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default)]
    pub norm: Norm,
    pub vocabulary: BTreeMap<String, usize>,
    #[serde(default)]
    pub idf: Option<Vec<f64>>,
}

/// Feature vector normalisation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    L2,
    L1,
    None,
}

fn default_lowercase() -> bool {
    true
}

fn default_token_pattern() -> String {
    r"(?u)\b\w\w+\b".to_string()
}

fn default_ngram_range() -> [usize; 2] {
    [1, 1]
}

impl ModelArtifact {
    /// Read and validate an artifact file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Model(format!(
                "Cannot read model artifact {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate an artifact from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        let artifact: ModelArtifact = serde_json::from_str(content)
            .map_err(|e| Error::Model(format!("Invalid model artifact: {}", e)))?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Check structural consistency and resolve the two class labels
    pub fn validate(&self) -> Result<[Label; 2]> {
        if self.format != ARTIFACT_FORMAT {
            return Err(Error::Model(format!(
                "Unsupported artifact format '{}' (expected '{}')",
                self.format, ARTIFACT_FORMAT
            )));
        }

        let labels = self.class_labels()?;

        let vocabulary_size = self.vectorizer.vocabulary.len();
        if vocabulary_size == 0 {
            return Err(Error::Model("Vocabulary is empty".to_string()));
        }
        if let Some((term, index)) = self
            .vectorizer
            .vocabulary
            .iter()
            .find(|&(_, &index)| index >= vocabulary_size)
        {
            return Err(Error::Model(format!(
                "Vocabulary index {} for '{}' is out of range",
                index, term
            )));
        }

        if let Some(idf) = &self.vectorizer.idf {
            if idf.len() != vocabulary_size {
                return Err(Error::Model(format!(
                    "idf has {} values, vocabulary has {} terms",
                    idf.len(),
                    vocabulary_size
                )));
            }
        }

        let [min_n, max_n] = self.vectorizer.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(Error::Model(format!(
                "Invalid ngram_range [{}, {}]",
                min_n, max_n
            )));
        }

        if self.weights.is_empty() || self.weights.len() > labels.len() {
            return Err(Error::Model(format!(
                "Expected 1 or {} weight rows, found {}",
                labels.len(),
                self.weights.len()
            )));
        }
        if self.intercepts.len() != self.weights.len() {
            return Err(Error::Model(format!(
                "{} intercepts for {} weight rows",
                self.intercepts.len(),
                self.weights.len()
            )));
        }
        for (row, weights) in self.weights.iter().enumerate() {
            if weights.len() != vocabulary_size {
                return Err(Error::Model(format!(
                    "Weight row {} has {} values, vocabulary has {} terms",
                    row,
                    weights.len(),
                    vocabulary_size
                )));
            }
        }

        Ok(labels)
    }

    fn class_labels(&self) -> Result<[Label; 2]> {
        if self.labels.len() != 2 {
            return Err(Error::Model(format!(
                "Expected 2 labels, found {}",
                self.labels.len()
            )));
        }
        let first: Label = self.labels[0]
            .parse()
            .map_err(|e| Error::Model(format!("Label '{}': {}", self.labels[0], e)))?;
        let second: Label = self.labels[1]
            .parse()
            .map_err(|e| Error::Model(format!("Label '{}': {}", self.labels[1], e)))?;
        if first == second {
            return Err(Error::Model(format!("Duplicate label '{}'", first)));
        }
        Ok([first, second])
    }
}
