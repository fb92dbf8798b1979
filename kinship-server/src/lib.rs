// Library exports for kinship-server
// The binary and the integration tests both build the router from here

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod relation;
pub mod session;
pub mod state;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::middleware::{require_auth_middleware, resolve_identity_middleware};
use crate::state::AppState;

/// Build the full application router.
///
/// Every request has its identity resolved once up front; routes under
/// `/api` additionally redirect anonymous callers to `/login`.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/me", get(api::auth::me))
        .route("/api/me/groups", get(api::groups::my_groups))
        .route("/api/home", get(api::posts::home))
        // Post routes
        .route("/api/posts", get(api::posts::list_posts).post(api::posts::create_post))
        .route("/api/posts/:id/like", post(api::posts::like_post))
        .route("/api/posts/:id/comments", get(api::posts::list_comments))
        .route("/api/posts/:id/comment", post(api::posts::add_comment))
        .route("/api/posts/:id/share", post(api::posts::share_post))
        // Social graph routes
        .route("/api/users/:id/follow", post(api::users::follow_user))
        .route("/api/profile/:username", get(api::users::get_profile))
        .route("/api/profile/:username/followers", get(api::users::followers))
        .route("/api/profile/:username/following", get(api::users::following))
        // Group routes
        .route("/api/groups", get(api::groups::list_groups).post(api::groups::create_group))
        .route("/api/groups/:id", get(api::groups::group_detail))
        .route("/api/groups/:id/join", post(api::groups::join_group))
        .route_layer(from_fn(require_auth_middleware));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/signup", post(api::auth::signup))
        .route("/login", post(api::auth::login))
        .route("/logout", post(api::auth::logout))
        .merge(protected)
        .layer(from_fn_with_state(state.clone(), resolve_identity_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
