use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Custom serde module for DateTime to ensure RFC3339 string format
mod datetime_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = date.to_rfc3339();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom)
    }
}

// Browsers submit an untouched optional field as an empty string
mod empty_as_none {
    use serde::{self, Deserialize, Deserializer};
    use uuid::Uuid;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => Uuid::parse_str(s).map(Some).map_err(serde::de::Error::custom),
        }
    }
}

/// Profile picture assigned to every new account
pub const DEFAULT_PROFILE_PICTURE: &str = "/static/default_profile.png";

/// A registered user. The password hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub profile_picture: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            profile_picture: self.profile_picture.clone(),
        }
    }
}

/// Minimal user view embedded in comments and follower lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub profile_picture: String,
}

/// Another user's profile as seen by the viewer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfileView {
    pub user: UserSummary,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    pub follower_count: usize,
    pub following_count: usize,
    /// Whether the viewer follows this user
    pub is_following: bool,
    /// The user's posts, newest first
    #[serde(default)]
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    pub owner_id: Uuid,
    pub owner_username: String,
    /// Group the post was made in (None for the public feed)
    #[serde(default)]
    pub group_id: Option<Uuid>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub like_count: usize,
    #[serde(default)]
    pub comment_count: usize,
    /// Whether the requesting user likes this post
    #[serde(default)]
    pub user_liked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub post_id: Uuid,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub created_by: Uuid,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub member_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    pub group_id: Uuid,
    pub user: UserSummary,
    pub is_admin: bool,
    #[serde(with = "datetime_format")]
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDetail {
    pub group: Group,
    pub creator_name: String,
    pub creator_profile_picture: String,
    pub members: Vec<GroupMember>,
    pub posts: Vec<Post>,
    pub is_member: bool,
    pub is_admin: bool,
}

/// Landing view: the feed plus people and groups to discover
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeView {
    pub posts: Vec<Post>,
    pub suggestions: Vec<UserSummary>,
    pub group_suggestions: Vec<Group>,
}

// Form bodies accepted by the API
#[derive(Debug, Serialize, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePostForm {
    pub title: String,
    pub content: String,
    #[serde(default, deserialize_with = "empty_as_none::deserialize")]
    pub group_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentForm {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGroupForm {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// Toggle responses
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct FollowToggleResponse {
    pub following: bool,
    pub follower_count: usize,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LikeToggleResponse {
    pub liked: bool,
    pub like_count: usize,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MembershipToggleResponse {
    pub joined: bool,
    pub member_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentResponse {
    pub success: bool,
    pub comment: Comment,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShareResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serializes_rfc3339_timestamp() {
        let user = User {
            id: Uuid::nil(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            full_name: None,
            profile_picture: DEFAULT_PROFILE_PICTURE.to_string(),
            bio: None,
            created_at: "2024-01-02T03:04:05Z".parse().unwrap(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["created_at"], "2024-01-02T03:04:05+00:00");

        let back: User = serde_json::from_value(json).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn test_create_post_form_group_is_optional() {
        let form: CreatePostForm =
            serde_json::from_str(r#"{"title":"t","content":"c"}"#).unwrap();
        assert!(form.group_id.is_none());
    }

    #[test]
    fn test_create_post_form_empty_group_is_none() {
        let form: CreatePostForm =
            serde_json::from_str(r#"{"title":"t","content":"c","group_id":""}"#).unwrap();
        assert!(form.group_id.is_none());

        let form: CreatePostForm =
            serde_json::from_str(r#"{"title":"t","content":"c","group_id":null}"#).unwrap();
        assert!(form.group_id.is_none());

        let id = Uuid::new_v4();
        let form: CreatePostForm = serde_json::from_str(&format!(
            r#"{{"title":"t","content":"c","group_id":"{}"}}"#,
            id
        ))
        .unwrap();
        assert_eq!(form.group_id, Some(id));

        let bad = serde_json::from_str::<CreatePostForm>(
            r#"{"title":"t","content":"c","group_id":"nope"}"#,
        );
        assert!(bad.is_err());
    }
}
