//! Classification endpoints
//!
//! POST /api/classify - multipart spreadsheet upload
//! POST /api/predict - single statement

use axum::extract::{Multipart, State};
use axum::Json;
use rqc_common::{ClassificationResult, ClassificationSummary, Label};
use serde::{Deserialize, Serialize};

use super::upload::{predict_statement, process_upload, read_upload};
use crate::{ApiResult, AppState};

/// Response for a classified upload
#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub filename: String,
    pub summary: ClassificationSummary,
    /// One entry per data row, in sheet order
    pub results: Vec<ClassificationResult>,
}

/// POST /api/classify
pub async fn classify_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<ClassifyResponse>> {
    let upload = read_upload(&mut multipart).await?;
    let outcome = process_upload(&state, upload).await?;

    Ok(Json(ClassifyResponse {
        filename: outcome.filename,
        summary: outcome.summary,
        results: outcome.results,
    }))
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub text: String,
    pub label: Label,
    /// "FR" or "NFR"
    pub code: String,
}

/// POST /api/predict
pub async fn predict_text(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> ApiResult<Json<PredictResponse>> {
    let label = predict_statement(&state, &request.text).await?;

    Ok(Json(PredictResponse {
        text: request.text.trim().to_string(),
        label,
        code: label.code().to_string(),
    }))
}
