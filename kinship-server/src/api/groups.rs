use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Form, Json,
};

use kinship_types::{
    CreateGroupForm, Group, GroupDetail, MembershipToggleResponse, DEFAULT_PROFILE_PICTURE,
};

use super::{parse_id, required, ApiError, ApiResult};
use crate::db::repositories::{GroupRepository, PostRepository, UserRepository};
use crate::middleware::AuthUser;
use crate::state::AppState;

/// GET /api/groups - All groups with member counts
pub async fn list_groups(State(state): State<AppState>) -> ApiResult<Json<Vec<Group>>> {
    let groups = GroupRepository::new(state.db.pool.clone())
        .list_all()
        .map_err(|e| ApiError::InternalError(format!("Failed to load groups: {:#}", e)))?;

    Ok(Json(groups))
}

/// GET /api/me/groups - Groups the current user belongs to
pub async fn my_groups(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Group>>> {
    let groups = GroupRepository::new(state.db.pool.clone())
        .list_for_member(&user.id)
        .map_err(|e| ApiError::InternalError(format!("Failed to load groups: {:#}", e)))?;

    Ok(Json(groups))
}

/// POST /api/groups - Create a group; the creator becomes its admin
pub async fn create_group(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Form(form): Form<CreateGroupForm>,
) -> ApiResult<(StatusCode, Json<Group>)> {
    let name = required(&form.name, "Name")?;
    let description = form
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let group = GroupRepository::new(state.db.pool.clone()).create(&name, description, user.id)?;

    Ok((StatusCode::CREATED, Json(group)))
}

/// GET /api/groups/:id - Group with members, posts and the viewer's membership
pub async fn group_detail(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(group_id): Path<String>,
) -> ApiResult<Json<GroupDetail>> {
    let group_id = parse_id(&group_id, "group")?;
    let pool = state.db.pool.clone();
    let group_repo = GroupRepository::new(pool.clone());

    let group = group_repo
        .get_by_id(&group_id)?
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))?;
    let members = group_repo.members(&group_id)?;
    let membership = group_repo.membership(&group_id, &user.id)?;
    let posts = PostRepository::new(pool.clone()).list_by_group(&group_id, &user.id)?;

    let (creator_name, creator_profile_picture) =
        match UserRepository::new(pool).get_by_id(&group.created_by)? {
            Some(creator) => (creator.username, creator.profile_picture),
            None => (
                "Unknown User".to_string(),
                DEFAULT_PROFILE_PICTURE.to_string(),
            ),
        };

    Ok(Json(GroupDetail {
        group,
        creator_name,
        creator_profile_picture,
        members,
        posts,
        is_member: membership.is_some(),
        is_admin: membership.unwrap_or(false),
    }))
}

/// POST /api/groups/:id/join - Join the group, or leave it if already a member
pub async fn join_group(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(group_id): Path<String>,
) -> ApiResult<Json<MembershipToggleResponse>> {
    let group_id = parse_id(&group_id, "group")?;

    let toggled = state.relations.toggle_membership(user.id, group_id)?;

    Ok(Json(MembershipToggleResponse {
        joined: toggled.active,
        member_count: toggled.count,
    }))
}
