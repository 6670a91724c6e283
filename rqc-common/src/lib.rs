//! # RQC Common Library
//!
//! Shared code for the requirement classifier:
//! - Model artifact loading and the linear text classifier
//! - Spreadsheet row extraction (CSV / XLSX)
//! - History and user persistence (SQLite)
//! - Configuration loading
//! - Pagination helpers

pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod pagination;
pub mod sheet;

pub use error::{Error, Result};
pub use model::{ClassificationResult, ClassificationSummary, Classifier, Label};
pub use sheet::RequirementRow;
