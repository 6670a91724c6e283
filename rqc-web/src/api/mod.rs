//! HTTP API handlers for rqc-web

pub mod classify;
pub mod health;
pub mod history;
pub mod upload;

pub use classify::{classify_upload, predict_text};
pub use health::health_routes;
pub use history::{delete_history_entry, get_stats, list_history};
