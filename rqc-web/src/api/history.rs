//! History and statistics endpoints

use axum::extract::{Path, Query, State};
use axum::Json;
use rqc_common::db::{HistoryEntry, HistoryPage};
use serde::{Deserialize, Serialize};

use crate::{ApiResult, AppState};

/// `?page=` query parameter (1-based, defaults to the first page)
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    pub page: i64,
}

fn first_page() -> i64 {
    1
}

impl Default for PageQuery {
    fn default() -> Self {
        Self { page: first_page() }
    }
}

/// GET /api/history?page=N
pub async fn list_history(
    State(state): State<AppState>,
    query: Option<Query<PageQuery>>,
) -> ApiResult<Json<HistoryPage>> {
    let Query(query) = query.unwrap_or_default();
    Ok(Json(state.history.page(query.page).await?))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: HistoryEntry,
}

/// DELETE /api/history/:index
pub async fn delete_history_entry(
    State(state): State<AppState>,
    Path(index): Path<i64>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = state.history.remove_at(index).await?;
    Ok(Json(DeleteResponse { deleted }))
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total: u64,
    pub functional: u64,
    pub non_functional: u64,
    pub functional_percent: f64,
    pub non_functional_percent: f64,
}

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let summary = state.history.summary().await?;

    Ok(Json(StatsResponse {
        total: summary.total,
        functional: summary.functional,
        non_functional: summary.non_functional,
        functional_percent: summary.functional_percent(),
        non_functional_percent: summary.non_functional_percent(),
    }))
}
