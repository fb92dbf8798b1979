use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use kinship_types::User;

use crate::api::ApiError;
use crate::auth::cookie::request_credential;
use crate::state::AppState;

/// Identity resolved for the current request; `user` is `None` for anonymous requests
#[derive(Clone, Debug)]
pub struct RequestIdentity {
    pub user: Option<User>,
}

/// Extension inserted by `require_auth_middleware` for handlers behind it
#[derive(Clone, Debug)]
pub struct AuthUser(pub User);

/// Resolve the request's credential once and store the result as a request extension
pub async fn resolve_identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let credential = request_credential(request.headers()).map(str::to_owned);

    let identity = match state.sessions.resolve(credential.as_deref()) {
        Ok(user) => RequestIdentity { user },
        Err(e) => {
            return ApiError::InternalError(format!("Failed to resolve session: {:#}", e))
                .into_response();
        }
    };

    request.extensions_mut().insert(identity);
    next.run(request).await
}

/// Send anonymous requests to the login page
pub async fn require_auth_middleware(mut request: Request, next: Next) -> Response {
    let user = request
        .extensions()
        .get::<RequestIdentity>()
        .and_then(|identity| identity.user.clone());

    match user {
        Some(user) => {
            request.extensions_mut().insert(AuthUser(user));
            next.run(request).await
        }
        None => Redirect::to("/login").into_response(),
    }
}
