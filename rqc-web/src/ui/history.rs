//! History pages: paginated prediction list, deletion and the FR/NFR pie chart

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use rqc_common::db::HistoryPage;
use rqc_common::pagination::PAGE_SIZE;
use rqc_common::ClassificationSummary;
use std::f64::consts::{FRAC_PI_2, TAU};
use tracing::warn;

use super::layout::{escape_html, page_response, Notice};
use crate::api::history::PageQuery;
use crate::{ApiError, AppState, CurrentUser};

const FUNCTIONAL_COLOR: &str = "#2f6da3";
const NON_FUNCTIONAL_COLOR: &str = "#e08a2c";

/// GET /categories?page=N
pub async fn categories(
    State(state): State<AppState>,
    user: CurrentUser,
    query: Option<Query<PageQuery>>,
) -> Response {
    let Query(query) = query.unwrap_or_default();
    categories_response(&state, &user, query.page, StatusCode::OK, None).await
}

/// POST /delete/:index
pub async fn delete_history_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(index): Path<i64>,
) -> Response {
    match state.history.remove_at(index).await {
        Ok(entry) => {
            let notice = Notice::success(format!("Deleted: {}", entry.requirement));
            let page = index.max(0) / PAGE_SIZE + 1;
            categories_response(&state, &user, page, StatusCode::OK, Some(notice)).await
        }
        Err(err) => {
            let err = ApiError::from(err);
            warn!(index, "History delete failed: {}", err);
            let notice = Notice::danger(err.message());
            categories_response(&state, &user, 1, err.status(), Some(notice)).await
        }
    }
}

async fn categories_response(
    state: &AppState,
    user: &CurrentUser,
    page: i64,
    status: StatusCode,
    notice: Option<Notice>,
) -> Response {
    let can_delete = !state.settings.require_login || user.is_logged_in();

    match state.history.page(page).await {
        Ok(history) => page_response(
            status,
            "History",
            user,
            notice.as_ref(),
            &render_history(&history, can_delete),
        ),
        Err(err) => {
            let err = ApiError::from(err);
            page_response(
                err.status(),
                "History",
                user,
                Some(&Notice::danger(err.message())),
                "<h1>Classification history</h1>",
            )
        }
    }
}

fn render_history(history: &HistoryPage, can_delete: bool) -> String {
    if history.entries.is_empty() {
        return r#"<h1>Classification history</h1>
<section><p>No predictions yet. <a href="/">Classify some requirements</a> first.</p></section>"#
            .to_string();
    }

    let rows: String = history
        .entries
        .iter()
        .enumerate()
        .map(|(offset, entry)| {
            let index = history.first_index + offset as i64;
            let action = if can_delete {
                format!(
                    r#"<form class="inline" method="post" action="/delete/{}"><button class="danger" type="submit">Delete</button></form>"#,
                    index
                )
            } else {
                String::new()
            };
            format!(
                r#"<tr><td>{number}</td><td>{text}</td><td><span class="badge {class}">{code}</span></td><td class="muted">{source}</td><td class="muted">{when}</td><td>{action}</td></tr>"#,
                number = index + 1,
                text = escape_html(&entry.requirement),
                class = entry.prediction.as_str(),
                code = entry.prediction.code(),
                source = entry.source.as_str(),
                when = entry.recorded_at.format("%Y-%m-%d %H:%M"),
                action = action,
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<h1>Classification history</h1>
<section>
    <table>
        <thead><tr><th>#</th><th>Requirement</th><th>Category</th><th>Source</th><th>Recorded</th><th></th></tr></thead>
        <tbody>
{rows}
        </tbody>
    </table>
    {pager}
</section>
"#,
        rows = rows,
        pager = render_pager(history),
    )
}

fn render_pager(history: &HistoryPage) -> String {
    let previous = if history.page > 1 {
        format!(r#"<a href="/categories?page={}">&laquo; Previous</a>"#, history.page - 1)
    } else {
        String::new()
    };
    let next = if history.page < history.total_pages {
        format!(r#"<a href="/categories?page={}">Next &raquo;</a>"#, history.page + 1)
    } else {
        String::new()
    };

    format!(
        r#"<div class="pager">{}<span>Page {} of {} ({} entries)</span>{}</div>"#,
        previous, history.page, history.total_pages, history.total_entries, next
    )
}

/// GET /graph
pub async fn graph(State(state): State<AppState>, user: CurrentUser) -> Response {
    let summary = match state.history.summary().await {
        Ok(summary) => summary,
        Err(err) => {
            let err = ApiError::from(err);
            return page_response(
                err.status(),
                "Graph",
                &user,
                Some(&Notice::danger(err.message())),
                "<h1>FR / NFR distribution</h1>",
            );
        }
    };

    if summary.total == 0 {
        return page_response(
            StatusCode::OK,
            "Graph",
            &user,
            Some(&Notice::warning("No data available to generate the graph")),
            "<h1>FR / NFR distribution</h1>",
        );
    }

    page_response(StatusCode::OK, "Graph", &user, None, &render_graph(&summary))
}

fn render_graph(summary: &ClassificationSummary) -> String {
    format!(
        r#"<h1>FR / NFR distribution</h1>
<section>
    {chart}
    <p class="legend"><span style="background:{fr_color}"></span>Functional: {fr} ({fr_pct:.1}%)</p>
    <p class="legend"><span style="background:{nfr_color}"></span>Non-functional: {nfr} ({nfr_pct:.1}%)</p>
    <p class="muted">Based on {total} recorded predictions.</p>
</section>
"#,
        chart = pie_chart(summary),
        fr_color = FUNCTIONAL_COLOR,
        nfr_color = NON_FUNCTIONAL_COLOR,
        fr = summary.functional,
        fr_pct = summary.functional_percent(),
        nfr = summary.non_functional,
        nfr_pct = summary.non_functional_percent(),
        total = summary.total,
    )
}

const CENTER: f64 = 100.0;
const RADIUS: f64 = 90.0;

/// Two-slice SVG pie chart
fn pie_chart(summary: &ClassificationSummary) -> String {
    let total = summary.total.max(1) as f64;
    let slices = [
        (summary.functional, FUNCTIONAL_COLOR),
        (summary.non_functional, NON_FUNCTIONAL_COLOR),
    ];

    let mut start = 0.0;
    let mut shapes = String::new();
    for (count, color) in slices {
        if count == 0 {
            continue;
        }
        let share = count as f64 / total;
        if share >= 1.0 {
            shapes.push_str(&format!(
                r#"<circle cx="{c}" cy="{c}" r="{r}" fill="{color}"/>"#,
                c = CENTER,
                r = RADIUS,
                color = color
            ));
        } else {
            let (x0, y0) = point_at(start);
            let (x1, y1) = point_at(start + share);
            let large_arc = if share > 0.5 { 1 } else { 0 };
            shapes.push_str(&format!(
                r#"<path d="M{c},{c} L{x0:.2},{y0:.2} A{r},{r} 0 {large_arc} 1 {x1:.2},{y1:.2} Z" fill="{color}"/>"#,
                c = CENTER,
                r = RADIUS,
                x0 = x0,
                y0 = y0,
                x1 = x1,
                y1 = y1,
                large_arc = large_arc,
                color = color
            ));
        }
        start += share;
    }

    format!(
        r#"<svg viewBox="0 0 200 200" width="240" height="240" role="img" aria-label="FR/NFR pie chart">{}</svg>"#,
        shapes
    )
}

/// Point on the circle at `fraction` of a turn, clockwise from 12 o'clock
fn point_at(fraction: f64) -> (f64, f64) {
    let angle = fraction * TAU - FRAC_PI_2;
    (CENTER + RADIUS * angle.cos(), CENTER + RADIUS * angle.sin())
}
