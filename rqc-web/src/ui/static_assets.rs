//! Embedded stylesheet

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

const RQC_CSS: &str = include_str!("../../static/rqc.css");

/// GET /static/rqc.css
pub async fn serve_rqc_css() -> Response {
    (
        StatusCode::OK,
        [
            ("content-type", "text/css"),
            ("cache-control", "public, max-age=3600"),
        ],
        RQC_CSS,
    )
        .into_response()
}
