//! rqc-web library - requirement classifier web service
//!
//! Serves the upload form, classifies uploaded spreadsheets row by row and
//! keeps a browsable history of every prediction.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use rqc_common::config::Settings;
use rqc_common::db::{HistoryStore, UserStore};
use rqc_common::sheet::RowExtractor;
use rqc_common::{ClassificationResult, Classifier};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod session;
pub mod ui;

pub use error::{ApiError, ApiResult};
pub use session::{CurrentUser, SessionStore};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded model, read-only after startup
    pub classifier: Arc<dyn Classifier>,
    /// Locates the requirement column in uploads
    pub extractor: RowExtractor,
    pub history: HistoryStore,
    pub users: UserStore,
    pub sessions: SessionStore,
    /// Results of the most recent upload, served by /download
    pub last_output: Arc<RwLock<Option<Vec<ClassificationResult>>>>,
    pub settings: Arc<Settings>,
    /// Server start time, for uptime in /health
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(classifier: Arc<dyn Classifier>, db: SqlitePool, settings: Settings) -> Self {
        Self {
            classifier,
            extractor: RowExtractor::new(settings.requirement_column.clone()),
            history: HistoryStore::new(db.clone()),
            users: UserStore::new(db),
            sessions: SessionStore::default(),
            last_output: Arc::new(RwLock::new(None)),
            settings: Arc::new(settings),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// Pages that change state sit behind `require_login_page` (redirect to
/// /login), JSON endpoints behind `require_login_api` (401). Both pass
/// everything through when `require_login` is off.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post};

    let protected_pages = Router::new()
        .route("/upload", post(ui::upload))
        .route("/predict", post(ui::predict))
        .route("/delete/:index", post(ui::delete_history_item))
        .route("/download", get(ui::download_output))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_login_page,
        ));

    let protected_api = Router::new()
        .route("/api/classify", post(api::classify_upload))
        .route("/api/predict", post(api::predict_text))
        .route("/api/history/:index", delete(api::delete_history_entry))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_login_api,
        ));

    let public = Router::new()
        .merge(ui::page_routes())
        .route("/api/history", get(api::list_history))
        .route("/api/stats", get(api::get_stats))
        .merge(api::health_routes());

    let body_limit = state.settings.max_upload_bytes;

    Router::new()
        .merge(protected_pages)
        .merge(protected_api)
        .merge(public)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
