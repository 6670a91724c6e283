//! Requirement classification model
//!
//! The model artifact is a pre-trained linear text classifier serialized as
//! JSON (see [`artifact`]). It is loaded once at startup and shared read-only
//! behind the [`Classifier`] trait; nothing in this crate ever fits or mutates
//! it.

pub mod artifact;
pub mod linear;

pub use artifact::{ModelArtifact, Norm, VectorizerSpec, ARTIFACT_FORMAT};
pub use linear::LinearTextModel;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::sheet::RequirementRow;
use crate::{Error, Result};

/// Predicted requirement category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Label {
    /// Functional requirement (FR): describes system behavior
    Functional,
    /// Non-functional requirement (NFR): describes a quality attribute
    NonFunctional,
}

impl Label {
    /// Wire form, as stored in history and written to CSV output
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Functional => "functional",
            Label::NonFunctional => "non-functional",
        }
    }

    /// Short code shown in result tables
    pub fn code(&self) -> &'static str {
        match self {
            Label::Functional => "FR",
            Label::NonFunctional => "NFR",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Label::Functional => "Functional",
            Label::NonFunctional => "Non-Functional",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "functional" | "fr" | "f" => Ok(Label::Functional),
            "non-functional" | "nonfunctional" | "non_functional" | "nfr" | "nf" => {
                Ok(Label::NonFunctional)
            }
            other => Err(Error::InvalidInput(format!("Unknown label: {}", other))),
        }
    }
}

/// Metadata describing the loaded model, reported by `/health`
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub format: String,
    pub name: Option<String>,
    pub labels: Vec<Label>,
    pub vocabulary_size: usize,
    pub ngram_range: (usize, usize),
}

/// A pre-trained requirement classifier
///
/// Implementations must be deterministic: the same text always yields the
/// same label.
pub trait Classifier: Send + Sync {
    /// Predict the label of a single requirement statement
    fn predict(&self, text: &str) -> Result<Label>;

    /// Describe the loaded model
    fn info(&self) -> ModelInfo;
}

/// One requirement row paired with its predicted label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    #[serde(flatten)]
    pub row: RequirementRow,
    pub label: Label,
}

/// Classify every row, preserving row order
///
/// Produces exactly one result per input row. A prediction failure fails the
/// whole batch.
pub fn classify_rows(
    classifier: &dyn Classifier,
    rows: Vec<RequirementRow>,
) -> Result<Vec<ClassificationResult>> {
    rows.into_iter()
        .map(|row| {
            let label = classifier.predict(&row.text)?;
            Ok(ClassificationResult { row, label })
        })
        .collect()
}

/// FR/NFR counts over a set of predictions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ClassificationSummary {
    pub total: u64,
    pub functional: u64,
    pub non_functional: u64,
}

impl ClassificationSummary {
    pub fn new(functional: u64, non_functional: u64) -> Self {
        Self {
            total: functional + non_functional,
            functional,
            non_functional,
        }
    }

    pub fn from_labels<I: IntoIterator<Item = Label>>(labels: I) -> Self {
        let (functional, non_functional) =
            labels
                .into_iter()
                .fold((0, 0), |(fr, nfr), label| match label {
                    Label::Functional => (fr + 1, nfr),
                    Label::NonFunctional => (fr, nfr + 1),
                });
        Self::new(functional, non_functional)
    }

    /// Share of functional predictions in percent (0.0 when empty)
    pub fn functional_percent(&self) -> f64 {
        percent(self.functional, self.total)
    }

    /// Share of non-functional predictions in percent (0.0 when empty)
    pub fn non_functional_percent(&self) -> f64 {
        percent(self.non_functional, self.total)
    }
}

fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

/// Load the model artifact at `path` and build the classifier
///
/// Any failure here is fatal for the service: it must not serve requests
/// without a model.
pub fn load_model(path: &Path) -> Result<LinearTextModel> {
    let artifact = ModelArtifact::load(path)?;
    let model = LinearTextModel::from_artifact(artifact)?;
    tracing::info!(
        path = %path.display(),
        vocabulary_size = model.info().vocabulary_size,
        "Model artifact loaded"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct KeywordClassifier;

    impl Classifier for KeywordClassifier {
        fn predict(&self, text: &str) -> Result<Label> {
            if text.contains("fast") {
                Ok(Label::NonFunctional)
            } else {
                Ok(Label::Functional)
            }
        }

        fn info(&self) -> ModelInfo {
            ModelInfo {
                format: "keyword".to_string(),
                name: None,
                labels: vec![Label::Functional, Label::NonFunctional],
                vocabulary_size: 1,
                ngram_range: (1, 1),
            }
        }
    }

    fn row(index: usize, text: &str) -> RequirementRow {
        RequirementRow {
            index,
            source_row: index + 2,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_label_parsing_accepts_codes_and_names() {
        assert_eq!("functional".parse::<Label>().unwrap(), Label::Functional);
        assert_eq!(" FR ".parse::<Label>().unwrap(), Label::Functional);
        assert_eq!("Non-Functional".parse::<Label>().unwrap(), Label::NonFunctional);
        assert_eq!("nfr".parse::<Label>().unwrap(), Label::NonFunctional);
        assert!("maybe".parse::<Label>().is_err());
    }

    #[test]
    fn test_label_serializes_to_wire_form() {
        let json = serde_json::to_string(&Label::NonFunctional).unwrap();
        assert_eq!(json, "\"non-functional\"");
        assert_eq!(Label::NonFunctional.code(), "NFR");
    }

    #[test]
    fn test_classify_rows_preserves_order_and_count() {
        let rows = vec![
            row(0, "login page"),
            row(1, "must be fast"),
            row(2, "export report"),
        ];
        let results = classify_rows(&KeywordClassifier, rows).unwrap();

        assert_eq!(results.len(), 3);
        let indexes: Vec<usize> = results.iter().map(|r| r.row.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
        assert_eq!(results[1].label, Label::NonFunctional);
    }

    #[test]
    fn test_classify_rows_empty_input() {
        let results = classify_rows(&KeywordClassifier, Vec::new()).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_summary_percentages() {
        let summary = ClassificationSummary::from_labels(vec![
            Label::Functional,
            Label::Functional,
            Label::Functional,
            Label::NonFunctional,
        ]);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.functional_percent(), 75.0);
        assert_eq!(summary.non_functional_percent(), 25.0);

        let empty = ClassificationSummary::default();
        assert_eq!(empty.functional_percent(), 0.0);
    }

    #[test]
    fn test_result_serializes_flat() {
        let result = ClassificationResult {
            row: row(0, "login page"),
            label: Label::Functional,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["index"], 0);
        assert_eq!(value["source_row"], 2);
        assert_eq!(value["text"], "login page");
        assert_eq!(value["label"], "functional");
    }
}
