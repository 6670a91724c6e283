//! Home page: spreadsheet upload, single prediction and result download

use axum::extract::{Form, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use rqc_common::{ClassificationResult, Label};
use serde::Deserialize;
use tracing::warn;

use super::layout::{escape_html, page_response, Notice};
use crate::api::upload::{predict_statement, process_upload, read_upload, UploadOutcome};
use crate::{ApiError, ApiResult, AppState, CurrentUser};

/// File name offered by /download
pub const OUTPUT_FILENAME: &str = "categorized_output.csv";

#[derive(Debug, Default)]
struct HomeView {
    /// Statement typed into the predict form, with its label
    prediction: Option<(String, Label)>,
    outcome: Option<UploadOutcome>,
}

/// GET /
pub async fn home_page(State(state): State<AppState>, user: CurrentUser) -> Response {
    home_response(&state, &user, StatusCode::OK, None, HomeView::default())
}

/// POST /upload
pub async fn upload(
    State(state): State<AppState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> Response {
    let outcome = match read_upload(&mut multipart).await {
        Ok(file) => process_upload(&state, file).await,
        Err(err) => Err(err),
    };

    match outcome {
        Ok(outcome) => {
            let notice = if outcome.results.is_empty() {
                Notice::info(format!(
                    "{} contains no requirement rows",
                    outcome.filename
                ))
            } else {
                Notice::success(format!(
                    "Classified {} requirements from {}",
                    outcome.summary.total, outcome.filename
                ))
            };
            let view = HomeView {
                outcome: Some(outcome),
                ..Default::default()
            };
            home_response(&state, &user, StatusCode::OK, Some(notice), view)
        }
        Err(err) => home_error(&state, &user, err),
    }
}

#[derive(Debug, Deserialize)]
pub struct PredictForm {
    #[serde(default)]
    pub requirement_text: String,
}

/// POST /predict
pub async fn predict(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<PredictForm>,
) -> Response {
    match predict_statement(&state, &form.requirement_text).await {
        Ok(label) => {
            let view = HomeView {
                prediction: Some((form.requirement_text.trim().to_string(), label)),
                ..Default::default()
            };
            home_response(&state, &user, StatusCode::OK, None, view)
        }
        Err(err) => home_error(&state, &user, err),
    }
}

/// GET /download
///
/// CSV of the most recent upload: `requirement,prediction` per row.
pub async fn download_output(State(state): State<AppState>, user: CurrentUser) -> Response {
    let output = state.last_output.read().await.clone();
    let Some(results) = output else {
        return home_response(
            &state,
            &user,
            StatusCode::NOT_FOUND,
            Some(Notice::warning("No file available to download")),
            HomeView::default(),
        );
    };

    match results_csv(&results) {
        Ok(body) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", OUTPUT_FILENAME),
                ),
            ],
            body,
        )
            .into_response(),
        Err(err) => home_error(&state, &user, err),
    }
}

fn results_csv(results: &[ClassificationResult]) -> ApiResult<Vec<u8>> {
    let csv_error = |e: csv::Error| ApiError::Internal(format!("CSV write failed: {}", e));

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["requirement", "prediction"])
        .map_err(csv_error)?;
    for result in results {
        writer
            .write_record([result.row.text.as_str(), result.label.as_str()])
            .map_err(csv_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("CSV write failed: {}", e)))
}

fn home_error(state: &AppState, user: &CurrentUser, err: ApiError) -> Response {
    warn!(status = %err.status(), "{}", err);
    home_response(
        state,
        user,
        err.status(),
        Some(Notice::danger(err.message())),
        HomeView::default(),
    )
}

fn home_response(
    state: &AppState,
    user: &CurrentUser,
    status: StatusCode,
    notice: Option<Notice>,
    view: HomeView,
) -> Response {
    let body = render_home(state.extractor.column(), &view);
    let title = if view.outcome.is_some() { "Results" } else { "Home" };
    page_response(status, title, user, notice.as_ref(), &body)
}

fn render_home(column: &str, view: &HomeView) -> String {
    let mut body = format!(
        r#"<h1>Classify requirements</h1>
<section>
    <h2>Upload a spreadsheet</h2>
    <p class="muted">CSV or XLSX with a column named <code>{column}</code>. Each row is classified as functional (FR) or non-functional (NFR).</p>
    <form method="post" action="/upload" enctype="multipart/form-data">
        <input type="file" name="file" accept=".csv,.xlsx">
        <button type="submit">Upload and classify</button>
    </form>
</section>
<section>
    <h2>Classify a single requirement</h2>
    <form method="post" action="/predict">
        <textarea name="requirement_text" rows="3" placeholder="The system shall ..."></textarea>
        <button type="submit">Predict</button>
    </form>
</section>
"#,
        column = escape_html(column)
    );

    if let Some((text, label)) = &view.prediction {
        body.push_str(&format!(
            r#"<section>
    <h2>Prediction</h2>
    <p>{text}</p>
    <p><span class="badge {class}">{code}</span> {name}</p>
</section>
"#,
            text = escape_html(text),
            class = label.as_str(),
            code = label.code(),
            name = label.display_name(),
        ));
    }

    if let Some(outcome) = &view.outcome {
        body.push_str(&render_results(outcome));
    }

    body
}

fn render_results(outcome: &UploadOutcome) -> String {
    let rows: String = outcome
        .results
        .iter()
        .map(|result| {
            format!(
                r#"<tr><td>{row}</td><td>{text}</td><td><span class="badge {class}">{code}</span></td></tr>"#,
                row = result.row.source_row,
                text = escape_html(&result.row.text),
                class = result.label.as_str(),
                code = result.label.code(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<section>
    <h2>Results for {filename}</h2>
    <p>{total} requirements: {fr} functional, {nfr} non-functional. <a href="/download">Download CSV</a></p>
    <table>
        <thead><tr><th>Row</th><th>Requirement</th><th>Category</th></tr></thead>
        <tbody>
{rows}
        </tbody>
    </table>
</section>
"#,
        filename = escape_html(&outcome.filename),
        total = outcome.summary.total,
        fr = outcome.summary.functional,
        nfr = outcome.summary.non_functional,
        rows = rows,
    )
}
