use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params_from_iter, OptionalExtension, Row};
use uuid::Uuid;

use kinship_types::Post;

use super::{optional_uuid_at, timestamp_at, timestamp_text, uuid_at};
use crate::db::DbPool;
use crate::error::{DomainError, DomainResult};

/// Post columns plus owner name, derived like/comment counts, and whether
/// the viewer bound to `?1` likes the post. Filters bind from `?2`.
const POST_SELECT: &str = "
    SELECT p.id, p.title, p.content, p.image_url, p.video_url, p.owner_id, u.username,
           p.group_id, p.created_at,
           (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id),
           (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id),
           EXISTS(SELECT 1 FROM likes v WHERE v.post_id = p.id AND v.user_id = ?1)
    FROM posts p
    JOIN users u ON u.id = p.owner_id";

/// Bound as the viewer when nobody is looking; matches no like
const NO_VIEWER: &str = "";

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub owner_id: Uuid,
    pub group_id: Option<Uuid>,
}

pub struct PostRepository {
    pool: DbPool,
}

impl PostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn map_post(row: &Row<'_>) -> rusqlite::Result<Post> {
        Ok(Post {
            id: uuid_at(row, 0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            image_url: row.get(3)?,
            video_url: row.get(4)?,
            owner_id: uuid_at(row, 5)?,
            owner_username: row.get(6)?,
            group_id: optional_uuid_at(row, 7)?,
            created_at: timestamp_at(row, 8)?,
            like_count: row.get::<_, i64>(9)? as usize,
            comment_count: row.get::<_, i64>(10)? as usize,
            user_liked: row.get(11)?,
        })
    }

    /// Posts matching `filter`, newest first. `args[0]` is the viewer.
    fn list(&self, filter: &str, args: &[String]) -> Result<Vec<Post>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "{} {} ORDER BY p.created_at DESC, p.rowid DESC",
            POST_SELECT, filter
        ))?;
        let posts = stmt
            .query_map(params_from_iter(args), Self::map_post)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    /// Create a post. A post inside a group requires the group to exist.
    pub fn create(&self, new_post: &NewPost) -> DomainResult<Post> {
        let mut conn = self.pool.get().context("Failed to get database connection")?;
        let tx = conn.transaction().context("Failed to begin transaction")?;

        if let Some(group_id) = new_post.group_id {
            let exists: bool = tx
                .query_row(
                    "SELECT EXISTS(SELECT 1 FROM groups WHERE id = ?)",
                    [group_id.to_string()],
                    |row| row.get(0),
                )
                .context("Failed to look up group")?;
            if !exists {
                return Err(DomainError::NotFound("Group"));
            }
        }

        let id = Uuid::new_v4();
        tx.execute(
            "INSERT INTO posts (id, title, content, image_url, video_url, owner_id, group_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &new_post.title,
                &new_post.content,
                &new_post.image_url,
                &new_post.video_url,
                new_post.owner_id.to_string(),
                new_post.group_id.map(|g| g.to_string()),
                timestamp_text(&Utc::now()),
            ),
        )
        .context("Failed to create post")?;

        let post = tx
            .query_row(
                &format!("{} WHERE p.id = ?2", POST_SELECT),
                [NO_VIEWER.to_string(), id.to_string()],
                Self::map_post,
            )
            .context("Failed to read back created post")?;
        tx.commit().context("Failed to commit post")?;

        tracing::info!("Post {} created by {}", post.id, post.owner_username);
        Ok(post)
    }

    /// Get a post by ID
    pub fn get_by_id(&self, post_id: &Uuid) -> Result<Option<Post>> {
        let conn = self.pool.get()?;
        let post = conn
            .query_row(
                &format!("{} WHERE p.id = ?2", POST_SELECT),
                [NO_VIEWER.to_string(), post_id.to_string()],
                Self::map_post,
            )
            .optional()?;
        Ok(post)
    }

    /// Every post, group posts included, newest first
    pub fn list_feed(&self, viewer_id: &Uuid) -> Result<Vec<Post>> {
        self.list("", &[viewer_id.to_string()])
    }

    /// Posts made inside a group, newest first
    pub fn list_by_group(&self, group_id: &Uuid, viewer_id: &Uuid) -> Result<Vec<Post>> {
        self.list(
            "WHERE p.group_id = ?2",
            &[viewer_id.to_string(), group_id.to_string()],
        )
    }

    /// Posts owned by a user, newest first
    pub fn list_by_owner(&self, owner_id: &Uuid, viewer_id: &Uuid) -> Result<Vec<Post>> {
        self.list(
            "WHERE p.owner_id = ?2",
            &[viewer_id.to_string(), owner_id.to_string()],
        )
    }

    /// Re-post someone else's post into the sharer's feed
    pub fn share(&self, post_id: &Uuid, sharer_id: Uuid) -> DomainResult<Post> {
        let original = self
            .get_by_id(post_id)?
            .ok_or(DomainError::NotFound("Post"))?;

        self.create(&NewPost {
            title: format!("Shared: {}", original.title),
            content: format!(
                "Shared from @{}: {}",
                original.owner_username, original.content
            ),
            image_url: original.image_url,
            video_url: original.video_url,
            owner_id: sharer_id,
            group_id: None,
        })
    }
}
