//! Upload handling shared by the HTML form and the JSON API
//!
//! Reads the `file` multipart field, extracts requirement rows, classifies
//! them, records them in history and keeps them for /download.

use axum::body::Bytes;
use axum::extract::Multipart;
use rqc_common::model::classify_rows;
use rqc_common::{ClassificationResult, ClassificationSummary, Label};
use tracing::{debug, info};

use crate::{ApiError, ApiResult, AppState};

/// Multipart field carrying the spreadsheet
pub const FILE_FIELD: &str = "file";

/// A file received from the client
#[derive(Debug)]
pub struct UploadedFile {
    /// Base name as sent by the client, directories stripped
    pub filename: String,
    pub bytes: Bytes,
}

/// Classified upload
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub filename: String,
    pub results: Vec<ClassificationResult>,
    pub summary: ClassificationSummary,
}

/// Read the `file` field; other fields are ignored
pub async fn read_upload(multipart: &mut Multipart) -> ApiResult<UploadedFile> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().map(base_name).unwrap_or_default();
        // Logged only; the content itself is sniffed during extraction
        debug!(
            filename = %filename,
            content_type = field.content_type().unwrap_or("none"),
            "Receiving upload"
        );
        let bytes = field.bytes().await?;

        if filename.is_empty() {
            break;
        }
        return Ok(UploadedFile { filename, bytes });
    }

    Err(ApiError::BadRequest("No file selected".to_string()))
}

/// Extract, classify and record an uploaded spreadsheet
pub async fn process_upload(state: &AppState, upload: UploadedFile) -> ApiResult<UploadOutcome> {
    let UploadedFile { filename, bytes } = upload;

    let extractor = state.extractor.clone();
    let classifier = state.classifier.clone();
    let name = filename.clone();

    // Parsing and scoring are CPU-bound
    let results = tokio::task::spawn_blocking(move || {
        let rows = extractor.extract(&name, &bytes)?;
        classify_rows(classifier.as_ref(), rows)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Classification task failed: {}", e)))??;

    state.history.record_results(&results).await?;
    *state.last_output.write().await = Some(results.clone());

    let summary = ClassificationSummary::from_labels(results.iter().map(|r| r.label));
    info!(
        filename = %filename,
        rows = summary.total,
        functional = summary.functional,
        non_functional = summary.non_functional,
        "Upload classified"
    );

    Ok(UploadOutcome {
        filename,
        results,
        summary,
    })
}

/// Classify one typed statement and record it
pub async fn predict_statement(state: &AppState, text: &str) -> ApiResult<Label> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest(
            "Please enter a requirement".to_string(),
        ));
    }

    let label = state.classifier.predict(text)?;
    state.history.record_text(text, label).await?;
    Ok(label)
}

fn base_name(filename: &str) -> String {
    filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}
