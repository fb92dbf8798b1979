use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Form, Json,
};

use kinship_types::{
    Comment, CommentForm, CommentResponse, CreatePostForm, HomeView, LikeToggleResponse, Post,
    ShareResponse,
};

use super::{parse_id, required, ApiError, ApiResult};
use crate::db::repositories::{
    CommentRepository, GroupRepository, NewPost, PostRepository, UserRepository,
};
use crate::middleware::AuthUser;
use crate::state::AppState;

const SUGGESTED_USERS: usize = 5;
const SUGGESTED_GROUPS: usize = 3;

/// GET /api/posts - Every post, newest first
pub async fn list_posts(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Post>>> {
    let post_repo = PostRepository::new(state.db.pool.clone());

    let posts = post_repo
        .list_feed(&user.id)
        .map_err(|e| ApiError::InternalError(format!("Failed to load posts: {:#}", e)))?;

    Ok(Json(posts))
}

/// GET /api/home - Feed plus user and group suggestions
pub async fn home(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> ApiResult<Json<HomeView>> {
    let pool = state.db.pool.clone();

    let posts = PostRepository::new(pool.clone()).list_feed(&user.id)?;
    let suggestions = UserRepository::new(pool.clone()).suggestions(&user.id, SUGGESTED_USERS)?;
    let group_suggestions = GroupRepository::new(pool).suggestions(SUGGESTED_GROUPS)?;

    Ok(Json(HomeView {
        posts,
        suggestions,
        group_suggestions,
    }))
}

/// POST /api/posts - Create a post, optionally inside a group
pub async fn create_post(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Form(form): Form<CreatePostForm>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    let new_post = NewPost {
        title: required(&form.title, "Title")?,
        content: required(&form.content, "Content")?,
        image_url: None,
        video_url: None,
        owner_id: user.id,
        group_id: form.group_id,
    };

    let post = PostRepository::new(state.db.pool.clone()).create(&new_post)?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// POST /api/posts/:id/like - Like the post, or unlike it if already liked
pub async fn like_post(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> ApiResult<Json<LikeToggleResponse>> {
    let post_id = parse_id(&post_id, "post")?;

    let toggled = state.relations.toggle_like(user.id, post_id)?;

    Ok(Json(LikeToggleResponse {
        liked: toggled.active,
        like_count: toggled.count,
    }))
}

/// GET /api/posts/:id/comments - Comments on a post, oldest first
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> ApiResult<Json<Vec<Comment>>> {
    let post_id = parse_id(&post_id, "post")?;
    let pool = state.db.pool.clone();

    PostRepository::new(pool.clone())
        .get_by_id(&post_id)?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    let comments = CommentRepository::new(pool)
        .list_by_post(&post_id)
        .map_err(|e| ApiError::InternalError(format!("Failed to load comments: {:#}", e)))?;

    Ok(Json(comments))
}

/// POST /api/posts/:id/comment - Comment on a post
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(post_id): Path<String>,
    Form(form): Form<CommentForm>,
) -> ApiResult<Json<CommentResponse>> {
    let post_id = parse_id(&post_id, "post")?;
    let content = required(&form.content, "Content")?;

    let comment = CommentRepository::new(state.db.pool.clone()).add(&post_id, &user, &content)?;

    Ok(Json(CommentResponse {
        success: true,
        comment,
    }))
}

/// POST /api/posts/:id/share - Re-post someone's post under the current user
pub async fn share_post(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> ApiResult<Json<ShareResponse>> {
    let post_id = parse_id(&post_id, "post")?;

    let shared = PostRepository::new(state.db.pool.clone()).share(&post_id, user.id)?;
    tracing::debug!("User {} shared post {} as {}", user.username, post_id, shared.id);

    Ok(Json(ShareResponse {
        success: true,
        message: "Post shared successfully".to_string(),
    }))
}
