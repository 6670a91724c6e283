//! Page chrome shared by every HTML page

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::CurrentUser;

/// Colour of a notice banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Warning,
    Danger,
}

impl NoticeKind {
    fn class(&self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Info => "info",
            NoticeKind::Warning => "warning",
            NoticeKind::Danger => "danger",
        }
    }
}

/// One-off message shown above the page body
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Danger,
            message: message.into(),
        }
    }
}

/// Escape text for an HTML body or attribute
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Wrap `body` in the site layout
pub fn render_page(title: &str, user: &CurrentUser, notice: Option<&Notice>, body: &str) -> String {
    let account_links = match user.username() {
        Some(username) => format!(
            r#"<span class="user">{}</span><a href="/logout">Logout</a>"#,
            escape_html(username)
        ),
        None => r#"<a href="/login">Login</a><a href="/signup">Sign up</a>"#.to_string(),
    };

    let notice = notice
        .map(|n| {
            format!(
                r#"<div class="notice {}">{}</div>"#,
                n.kind.class(),
                escape_html(&n.message)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Requirement Classifier</title>
    <link rel="stylesheet" href="/static/rqc.css">
</head>
<body>
    <header>
        <nav>
            <a class="brand" href="/">Requirement Classifier</a>
            <a href="/categories">History</a>
            <a href="/graph">Graph</a>
            <a href="/about">About</a>
            <a href="/faq">FAQ</a>
        </nav>
        <div>{account_links}</div>
    </header>
    <main>
        {notice}
        {body}
    </main>
    <footer>rqc-web v{version} [{git_hash}]</footer>
</body>
</html>
"#,
        title = escape_html(title),
        account_links = account_links,
        notice = notice,
        body = body,
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
    )
}

/// Full page response with an explicit status
pub fn page_response(
    status: StatusCode,
    title: &str,
    user: &CurrentUser,
    notice: Option<&Notice>,
    body: &str,
) -> Response {
    (status, Html(render_page(title, user, notice, body))).into_response()
}
