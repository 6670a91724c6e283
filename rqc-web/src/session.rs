//! Login sessions
//!
//! A successful login issues a random token in the `rqc_session` cookie.
//! Tokens live in memory only, so a restart logs everyone out.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::{ApiError, AppState};

/// Session cookie name
pub const SESSION_COOKIE: &str = "rqc_session";

/// Token → username map
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, String>>>,
}

impl SessionStore {
    /// Start a session and return its token
    pub async fn create(&self, username: &str) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions
            .write()
            .await
            .insert(token.clone(), username.to_string());
        token
    }

    pub async fn username(&self, token: &str) -> Option<String> {
        self.sessions.read().await.get(token).cloned()
    }

    /// End a session; returns the username it belonged to
    pub async fn remove(&self, token: &str) -> Option<String> {
        self.sessions.write().await.remove(token)
    }
}

/// Read the session token from the request cookies
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value starting a session
pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, token
    )
}

/// `Set-Cookie` value ending a session
pub fn expired_session_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        SESSION_COOKIE
    )
}

/// Logged-in user, if any
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<String>);

impl CurrentUser {
    pub fn username(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.0.is_some()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let username = match session_token(&parts.headers) {
            Some(token) => state.sessions.username(&token).await,
            None => None,
        };
        Ok(CurrentUser(username))
    }
}

async fn has_session(state: &AppState, headers: &HeaderMap) -> bool {
    if !state.settings.require_login {
        return true;
    }
    match session_token(headers) {
        Some(token) => state.sessions.username(&token).await.is_some(),
        None => false,
    }
}

/// Page guard: anonymous visitors are sent to /login
pub async fn require_login_page(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if has_session(&state, request.headers()).await {
        return next.run(request).await;
    }
    debug!(path = %request.uri().path(), "Redirecting anonymous request to login");
    Redirect::to("/login").into_response()
}

/// API guard: anonymous callers get 401
pub async fn require_login_api(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if has_session(&state, request.headers()).await {
        return Ok(next.run(request).await);
    }
    Err(ApiError::Unauthorized)
}
