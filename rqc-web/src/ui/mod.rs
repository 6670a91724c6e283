//! HTML pages for rqc-web
//!
//! - **Home** (`home`): upload form, single prediction, CSV download
//! - **History** (`history`): paginated history, deletion, pie chart
//! - **Account** (`account`): sign-up, login, logout
//! - **Info** (`info`): about and FAQ
//! - **Static Assets** (`static_assets`): stylesheet

use axum::{routing::get, Router};

use crate::AppState;

mod account;
mod history;
mod home;
mod info;
pub mod layout;
mod static_assets;

pub use history::delete_history_item;
pub use home::{download_output, predict, upload, OUTPUT_FILENAME};

/// Pages open to anonymous visitors
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home_page))
        .route("/categories", get(history::categories))
        .route("/graph", get(history::graph))
        .route("/about", get(info::about_page))
        .route("/faq", get(info::faq_page))
        .route("/login", get(account::login_page).post(account::login))
        .route("/signup", get(account::signup_page).post(account::signup))
        .route("/logout", get(account::logout))
        .route("/static/rqc.css", get(static_assets::serve_rqc_css))
}
