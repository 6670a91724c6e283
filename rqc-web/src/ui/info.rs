//! Static information pages

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;

use super::layout::{escape_html, page_response};
use crate::{AppState, CurrentUser};

const FAQS: &[(&str, &str)] = &[
    (
        "What is this site about?",
        "It predicts whether a software requirement is functional (FR) or non-functional (NFR).",
    ),
    (
        "How accurate is the prediction?",
        "Accuracy depends on the model. The same text always receives the same label.",
    ),
    (
        "Which files can I upload?",
        "CSV and XLSX spreadsheets. The requirement text must be in a column whose header matches the configured column name; the first worksheet of a workbook is used.",
    ),
    (
        "What happens to blank rows?",
        "Rows with no content in any cell are skipped. Every other data row receives a label, in sheet order.",
    ),
    (
        "Can I get the results as a file?",
        "Yes. After an upload, use Download CSV to get each requirement with its prediction.",
    ),
];

/// GET /about
pub async fn about_page(State(state): State<AppState>, user: CurrentUser) -> Response {
    let info = state.classifier.info();
    let model_name = info.name.as_deref().unwrap_or("unnamed model");

    let body = format!(
        r#"<h1>About</h1>
<section>
    <p>The Requirement Classifier sorts software requirement statements into
    functional requirements, which describe what the system does, and
    non-functional requirements, which describe qualities such as performance,
    security or availability.</p>
    <p>Upload a spreadsheet to classify many statements at once, or type a
    single statement on the home page. Every prediction is kept in the
    <a href="/categories">history</a>.</p>
</section>
<section>
    <h2>Model</h2>
    <table>
        <tr><th>Name</th><td>{name}</td></tr>
        <tr><th>Format</th><td>{format}</td></tr>
        <tr><th>Vocabulary</th><td>{vocabulary} terms</td></tr>
        <tr><th>N-grams</th><td>{min_n} to {max_n}</td></tr>
    </table>
</section>
"#,
        name = escape_html(model_name),
        format = escape_html(&info.format),
        vocabulary = info.vocabulary_size,
        min_n = info.ngram_range.0,
        max_n = info.ngram_range.1,
    );

    page_response(StatusCode::OK, "About", &user, None, &body)
}

/// GET /faq
pub async fn faq_page(user: CurrentUser) -> Response {
    let entries: String = FAQS
        .iter()
        .map(|(question, answer)| {
            format!(
                "<h2>{}</h2>\n<p>{}</p>",
                escape_html(question),
                escape_html(answer)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let body = format!(
        "<h1>Frequently asked questions</h1>\n<section>\n{}\n</section>",
        entries
    );
    page_response(StatusCode::OK, "FAQ", &user, None, &body)
}
