use anyhow::Result;
use uuid::Uuid;

use kinship_types::UserSummary;

use super::uuid_at;
use crate::db::DbPool;

/// Read side of the follow graph. Writes go through `RelationToggler`.
pub struct FollowRepository {
    pool: DbPool,
}

impl FollowRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Check if user A is following user B
    pub fn is_following(&self, follower_id: &Uuid, following_id: &Uuid) -> Result<bool> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE follower_id = ? AND following_id = ?",
            (follower_id.to_string(), following_id.to_string()),
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn list(&self, sql: &str, user_id: &Uuid) -> Result<Vec<UserSummary>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(sql)?;
        let users = stmt
            .query_map([user_id.to_string()], |row| {
                Ok(UserSummary {
                    id: uuid_at(row, 0)?,
                    username: row.get(1)?,
                    profile_picture: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Users that follow this user, most recent first
    pub fn get_followers(&self, user_id: &Uuid) -> Result<Vec<UserSummary>> {
        self.list(
            "SELECT u.id, u.username, u.profile_picture
             FROM follows f
             JOIN users u ON u.id = f.follower_id
             WHERE f.following_id = ?
             ORDER BY f.created_at DESC",
            user_id,
        )
    }

    /// Users this user follows, most recent first
    pub fn get_following(&self, user_id: &Uuid) -> Result<Vec<UserSummary>> {
        self.list(
            "SELECT u.id, u.username, u.profile_picture
             FROM follows f
             JOIN users u ON u.id = f.following_id
             WHERE f.follower_id = ?
             ORDER BY f.created_at DESC",
            user_id,
        )
    }

    /// Get follower count
    pub fn get_follower_count(&self, user_id: &Uuid) -> Result<usize> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE following_id = ?",
            [user_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Get following count
    pub fn get_following_count(&self, user_id: &Uuid) -> Result<usize> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE follower_id = ?",
            [user_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::fixtures;

    fn follow(db: &crate::db::Database, follower: &Uuid, following: &Uuid) {
        let conn = db.connection().unwrap();
        conn.execute(
            "INSERT INTO follows (follower_id, following_id, created_at) VALUES (?, ?, ?)",
            (
                follower.to_string(),
                following.to_string(),
                chrono::Utc::now().to_rfc3339(),
            ),
        )
        .unwrap();
    }

    #[test]
    fn test_follow_lists_and_counts() {
        let db = fixtures::database();
        let alice = fixtures::user(&db, "alice");
        let bob = fixtures::user(&db, "bob");
        let carol = fixtures::user(&db, "carol");
        let repo = FollowRepository::new(db.pool.clone());

        follow(&db, &bob.id, &alice.id);
        follow(&db, &carol.id, &alice.id);
        follow(&db, &alice.id, &bob.id);

        assert!(repo.is_following(&bob.id, &alice.id).unwrap());
        assert!(!repo.is_following(&alice.id, &carol.id).unwrap());

        let followers: Vec<String> = repo
            .get_followers(&alice.id)
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(followers.len(), 2);
        assert!(followers.contains(&"bob".to_string()));
        assert!(followers.contains(&"carol".to_string()));

        let following = repo.get_following(&alice.id).unwrap();
        assert_eq!(following.len(), 1);
        assert_eq!(following[0].username, "bob");

        assert_eq!(repo.get_follower_count(&alice.id).unwrap(), 2);
        assert_eq!(repo.get_following_count(&alice.id).unwrap(), 1);
    }

    #[test]
    fn test_self_follow_rejected_by_schema() {
        let db = fixtures::database();
        let alice = fixtures::user(&db, "alice");

        let conn = db.connection().unwrap();
        let result = conn.execute(
            "INSERT INTO follows (follower_id, following_id, created_at) VALUES (?1, ?1, ?2)",
            (alice.id.to_string(), chrono::Utc::now().to_rfc3339()),
        );
        assert!(result.is_err());
    }
}
