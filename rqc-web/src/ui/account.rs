//! Account pages: sign-up, login and logout

use axum::extract::{Form, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use rqc_common::db::Registration;
use serde::Deserialize;
use tracing::{info, warn};

use super::layout::{page_response, Notice};
use crate::session::{expired_session_cookie, session_cookie, session_token};
use crate::{ApiError, AppState, CurrentUser};

const LOGIN_FORM: &str = r#"<h1>Login</h1>
<section>
    <form method="post" action="/login">
        <label for="username">Username</label>
        <input type="text" id="username" name="username" required>
        <label for="password">Password</label>
        <input type="password" id="password" name="password" required>
        <button type="submit">Login</button>
    </form>
    <p class="muted">No account yet? <a href="/signup">Sign up</a></p>
</section>
"#;

const SIGNUP_FORM: &str = r#"<h1>Sign up</h1>
<section>
    <form method="post" action="/signup">
        <label for="username">Username</label>
        <input type="text" id="username" name="username" required>
        <label for="email">Email</label>
        <input type="email" id="email" name="email" required>
        <label for="password">Password</label>
        <input type="password" id="password" name="password" required>
        <label for="password2">Repeat password</label>
        <input type="password" id="password2" name="password2" required>
        <button type="submit">Create account</button>
    </form>
    <p class="muted">Already registered? <a href="/login">Login</a></p>
</section>
"#;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// GET /login
pub async fn login_page(user: CurrentUser) -> Response {
    if user.is_logged_in() {
        return Redirect::to("/").into_response();
    }
    page_response(StatusCode::OK, "Login", &user, None, LOGIN_FORM)
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<LoginForm>,
) -> Response {
    let username = form.username.trim();

    match state.users.verify(username, &form.password).await {
        Ok(true) => {
            let token = state.sessions.create(username).await;
            info!(username = %username, "User logged in");
            (
                [(header::SET_COOKIE, session_cookie(&token))],
                Redirect::to("/"),
            )
                .into_response()
        }
        Ok(false) => {
            warn!(username = %username, "Login failed");
            page_response(
                StatusCode::UNAUTHORIZED,
                "Login",
                &user,
                Some(&Notice::danger("Invalid username or password")),
                LOGIN_FORM,
            )
        }
        Err(err) => {
            let err = ApiError::from(err);
            page_response(
                err.status(),
                "Login",
                &user,
                Some(&Notice::danger(err.message())),
                LOGIN_FORM,
            )
        }
    }
}

/// GET /signup
pub async fn signup_page(user: CurrentUser) -> Response {
    if user.is_logged_in() {
        return Redirect::to("/").into_response();
    }
    page_response(StatusCode::OK, "Sign up", &user, None, SIGNUP_FORM)
}

/// POST /signup
///
/// On success the login form is shown with a confirmation.
pub async fn signup(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(registration): Form<Registration>,
) -> Response {
    match state.users.register(&registration).await {
        Ok(()) => page_response(
            StatusCode::OK,
            "Login",
            &user,
            Some(&Notice::success("Account created. Please log in.")),
            LOGIN_FORM,
        ),
        Err(err) => {
            let err = ApiError::from(err);
            page_response(
                err.status(),
                "Sign up",
                &user,
                Some(&Notice::danger(err.message())),
                SIGNUP_FORM,
            )
        }
    }
}

/// GET /logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        if let Some(username) = state.sessions.remove(&token).await {
            info!(username = %username, "User logged out");
        }
    }

    (
        [(header::SET_COOKIE, expired_session_cookie())],
        Redirect::to("/login"),
    )
        .into_response()
}
