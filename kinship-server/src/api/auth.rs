use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use kinship_types::{LoginForm, SignupForm, User};

use super::{ApiError, ApiResult};
use crate::auth::cookie::{access_token_cookie, clear_access_token_cookie};
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Issue an access token for `username` and send the browser home with it
fn start_session(state: &AppState, username: &str) -> ApiResult<Response> {
    let token = state.tokens.issue(username)?;
    let cookie = access_token_cookie(&token, state.tokens.lifetime());

    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}

/// POST /signup - Register and log in
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> ApiResult<Response> {
    // bcrypt is deliberately slow; keep it off the async workers
    let credentials = state.credentials.clone();
    let user = tokio::task::spawn_blocking(move || credentials.signup(&form))
        .await
        .map_err(|e| ApiError::InternalError(format!("Signup task failed: {}", e)))??;

    start_session(&state, &user.username)
}

/// POST /login - Exchange username and password for an access token cookie
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    let credentials = state.credentials.clone();
    let user = tokio::task::spawn_blocking(move || {
        credentials.authenticate(&form.username, &form.password)
    })
    .await
    .map_err(|e| ApiError::InternalError(format!("Login task failed: {}", e)))??
    .ok_or_else(|| ApiError::Unauthorized("Incorrect username or password".to_string()))?;

    tracing::info!("User {} logged in", user.username);
    start_session(&state, &user.username)
}

/// POST /logout - Drop the access token cookie
pub async fn logout() -> Response {
    (
        [(header::SET_COOKIE, clear_access_token_cookie())],
        Redirect::to("/login"),
    )
        .into_response()
}

/// GET /api/me - The authenticated user
pub async fn me(Extension(AuthUser(user)): Extension<AuthUser>) -> Json<User> {
    Json(user)
}
