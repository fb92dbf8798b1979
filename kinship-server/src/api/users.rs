use axum::{
    extract::{Path, State},
    Extension, Json,
};

use kinship_types::{FollowToggleResponse, User, UserProfileView, UserSummary};

use super::{parse_id, ApiError, ApiResult};
use crate::db::repositories::{FollowRepository, PostRepository, UserRepository};
use crate::middleware::AuthUser;
use crate::state::AppState;

fn lookup_user(state: &AppState, username: &str) -> ApiResult<User> {
    UserRepository::new(state.db.pool.clone())
        .get_by_username(username)?
        .ok_or_else(|| ApiError::NotFound(format!("User '{}' not found", username)))
}

/// POST /api/users/:id/follow - Follow a user, or unfollow if already following
pub async fn follow_user(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(target_id): Path<String>,
) -> ApiResult<Json<FollowToggleResponse>> {
    let target_id = parse_id(&target_id, "user")?;

    let toggled = state.relations.toggle_follow(user.id, target_id)?;

    Ok(Json(FollowToggleResponse {
        following: toggled.active,
        follower_count: toggled.count,
    }))
}

/// GET /api/profile/:username - Profile with follow counts and posts as seen by the current user
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(AuthUser(viewer)): Extension<AuthUser>,
    Path(username): Path<String>,
) -> ApiResult<Json<UserProfileView>> {
    let user = lookup_user(&state, &username)?;
    let follow_repo = FollowRepository::new(state.db.pool.clone());

    let follower_count = follow_repo.get_follower_count(&user.id)?;
    let following_count = follow_repo.get_following_count(&user.id)?;
    let is_following = follow_repo.is_following(&viewer.id, &user.id)?;
    let posts = PostRepository::new(state.db.pool.clone()).list_by_owner(&user.id, &viewer.id)?;

    Ok(Json(UserProfileView {
        user: user.summary(),
        full_name: user.full_name,
        bio: user.bio,
        follower_count,
        following_count,
        is_following,
        posts,
    }))
}

/// GET /api/profile/:username/followers - Users following this user
pub async fn followers(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<Vec<UserSummary>>> {
    let user = lookup_user(&state, &username)?;

    let followers = FollowRepository::new(state.db.pool.clone())
        .get_followers(&user.id)
        .map_err(|e| ApiError::InternalError(format!("Failed to load followers: {:#}", e)))?;

    Ok(Json(followers))
}

/// GET /api/profile/:username/following - Users this user follows
pub async fn following(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<Vec<UserSummary>>> {
    let user = lookup_user(&state, &username)?;

    let following = FollowRepository::new(state.db.pool.clone())
        .get_following(&user.id)
        .map_err(|e| ApiError::InternalError(format!("Failed to load following: {:#}", e)))?;

    Ok(Json(following))
}
