use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::Row;
use uuid::Uuid;

use kinship_types::{Comment, User, UserSummary};

use super::{timestamp_at, timestamp_text, uuid_at};
use crate::db::DbPool;
use crate::error::{DomainError, DomainResult};

pub struct CommentRepository {
    pool: DbPool,
}

impl CommentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn map_comment(row: &Row<'_>) -> rusqlite::Result<Comment> {
        Ok(Comment {
            id: uuid_at(row, 0)?,
            content: row.get(1)?,
            post_id: uuid_at(row, 2)?,
            created_at: timestamp_at(row, 3)?,
            user: UserSummary {
                id: uuid_at(row, 4)?,
                username: row.get(5)?,
                profile_picture: row.get(6)?,
            },
        })
    }

    /// Add a comment to an existing post
    pub fn add(&self, post_id: &Uuid, author: &User, content: &str) -> DomainResult<Comment> {
        let mut conn = self.pool.get().context("Failed to get database connection")?;
        let tx = conn.transaction().context("Failed to begin transaction")?;

        let post_exists: bool = tx
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM posts WHERE id = ?)",
                [post_id.to_string()],
                |row| row.get(0),
            )
            .context("Failed to look up post")?;
        if !post_exists {
            return Err(DomainError::NotFound("Post"));
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            content: content.to_string(),
            post_id: *post_id,
            created_at: Utc::now(),
            user: author.summary(),
        };

        tx.execute(
            "INSERT INTO comments (id, content, user_id, post_id, created_at) VALUES (?, ?, ?, ?, ?)",
            (
                comment.id.to_string(),
                &comment.content,
                author.id.to_string(),
                post_id.to_string(),
                timestamp_text(&comment.created_at),
            ),
        )
        .context("Failed to add comment")?;
        tx.commit().context("Failed to commit comment")?;

        Ok(comment)
    }

    /// Comments on a post, oldest first
    pub fn list_by_post(&self, post_id: &Uuid) -> Result<Vec<Comment>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT c.id, c.content, c.post_id, c.created_at, u.id, u.username, u.profile_picture
             FROM comments c
             JOIN users u ON u.id = c.user_id
             WHERE c.post_id = ?
             ORDER BY c.created_at ASC, c.rowid ASC",
        )?;

        let comments = stmt
            .query_map([post_id.to_string()], Self::map_comment)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{fixtures, PostRepository};

    #[test]
    fn test_add_and_list_comments() {
        let db = fixtures::database();
        let alice = fixtures::user(&db, "alice");
        let bob = fixtures::user(&db, "bob");
        let post = fixtures::post(&db, &alice, None);
        let repo = CommentRepository::new(db.pool.clone());

        let comment = repo.add(&post.id, &bob, "nice post").unwrap();
        assert_eq!(comment.user.username, "bob");

        let comments = repo.list_by_post(&post.id).unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].content, "nice post");
        assert_eq!(comments[0].user.id, bob.id);

        let post = PostRepository::new(db.pool.clone())
            .get_by_id(&post.id)
            .unwrap()
            .unwrap();
        assert_eq!(post.comment_count, 1);
    }

    #[test]
    fn test_comment_on_missing_post() {
        let db = fixtures::database();
        let alice = fixtures::user(&db, "alice");
        let repo = CommentRepository::new(db.pool.clone());

        let err = repo.add(&Uuid::new_v4(), &alice, "hello?").unwrap_err();
        assert!(matches!(err, DomainError::NotFound("Post")));

        let stored: i64 = db
            .connection()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM comments", [], |row| row.get(0))
            .unwrap();
        assert_eq!(stored, 0);
    }
}
