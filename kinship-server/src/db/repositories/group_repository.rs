use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{OptionalExtension, Row, TransactionBehavior};
use uuid::Uuid;

use kinship_types::{Group, GroupMember, UserSummary};

use super::{timestamp_at, timestamp_text, uuid_at};
use crate::db::DbPool;
use crate::error::{unique_violation, DomainError, DomainResult};

const GROUP_SELECT: &str = "
    SELECT g.id, g.name, g.description, g.cover_image, g.created_by, g.created_at,
           (SELECT COUNT(*) FROM group_members m WHERE m.group_id = g.id)
    FROM groups g";

pub struct GroupRepository {
    pool: DbPool,
}

impl GroupRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn map_group(row: &Row<'_>) -> rusqlite::Result<Group> {
        Ok(Group {
            id: uuid_at(row, 0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            cover_image: row.get(3)?,
            created_by: uuid_at(row, 4)?,
            created_at: timestamp_at(row, 5)?,
            member_count: row.get::<_, i64>(6)? as usize,
        })
    }

    /// Create a group and make its creator the first (admin) member
    pub fn create(
        &self,
        name: &str,
        description: Option<&str>,
        creator_id: Uuid,
    ) -> DomainResult<Group> {
        let mut conn = self.pool.get().context("Failed to get database connection")?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("Failed to begin transaction")?;

        let taken: bool = tx
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM groups WHERE name = ?)",
                [name],
                |row| row.get(0),
            )
            .context("Failed to check group name")?;
        if taken {
            return Err(DomainError::GroupNameTaken);
        }

        let id = Uuid::new_v4();
        let now = timestamp_text(&Utc::now());

        let inserted = tx.execute(
            "INSERT INTO groups (id, name, description, cover_image, created_by, created_at)
             VALUES (?, ?, ?, NULL, ?, ?)",
            (id.to_string(), name, description, creator_id.to_string(), &now),
        );
        if let Err(e) = inserted {
            return match unique_violation(&e) {
                Some("groups.name") => Err(DomainError::GroupNameTaken),
                _ => Err(anyhow::Error::new(e).context("Failed to create group").into()),
            };
        }

        tx.execute(
            "INSERT INTO group_members (group_id, user_id, is_admin, joined_at) VALUES (?, ?, 1, ?)",
            (id.to_string(), creator_id.to_string(), &now),
        )
        .context("Failed to add group creator as admin")?;

        let group = tx
            .query_row(
                &format!("{} WHERE g.id = ?", GROUP_SELECT),
                [id.to_string()],
                Self::map_group,
            )
            .context("Failed to read back created group")?;
        tx.commit().context("Failed to commit group")?;

        tracing::info!("Group '{}' created by {}", group.name, creator_id);
        Ok(group)
    }

    /// Get group by ID
    pub fn get_by_id(&self, group_id: &Uuid) -> Result<Option<Group>> {
        let conn = self.pool.get()?;
        let group = conn
            .query_row(
                &format!("{} WHERE g.id = ?", GROUP_SELECT),
                [group_id.to_string()],
                Self::map_group,
            )
            .optional()?;
        Ok(group)
    }

    /// All groups, newest first
    pub fn list_all(&self) -> Result<Vec<Group>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY g.created_at DESC, g.rowid DESC", GROUP_SELECT))?;
        let groups = stmt
            .query_map([], Self::map_group)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(groups)
    }

    /// Up to `limit` groups to suggest, newest first
    pub fn suggestions(&self, limit: usize) -> Result<Vec<Group>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY g.created_at DESC, g.rowid DESC LIMIT ?",
            GROUP_SELECT
        ))?;
        let groups = stmt
            .query_map([limit as i64], Self::map_group)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(groups)
    }

    /// Groups the user belongs to, most recently joined first
    pub fn list_for_member(&self, user_id: &Uuid) -> Result<Vec<Group>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "{} JOIN group_members gm ON gm.group_id = g.id
             WHERE gm.user_id = ?
             ORDER BY gm.joined_at DESC, g.rowid DESC",
            GROUP_SELECT
        ))?;
        let groups = stmt
            .query_map([user_id.to_string()], Self::map_group)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(groups)
    }

    /// Members of a group, admins first, then by join time
    pub fn members(&self, group_id: &Uuid) -> Result<Vec<GroupMember>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT m.group_id, u.id, u.username, u.profile_picture, m.is_admin, m.joined_at
             FROM group_members m
             JOIN users u ON u.id = m.user_id
             WHERE m.group_id = ?
             ORDER BY m.is_admin DESC, m.joined_at ASC",
        )?;

        let members = stmt
            .query_map([group_id.to_string()], |row| {
                Ok(GroupMember {
                    group_id: uuid_at(row, 0)?,
                    user: UserSummary {
                        id: uuid_at(row, 1)?,
                        username: row.get(2)?,
                        profile_picture: row.get(3)?,
                    },
                    is_admin: row.get::<_, i32>(4)? == 1,
                    joined_at: timestamp_at(row, 5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(members)
    }

    /// `Some(is_admin)` when the user belongs to the group
    pub fn membership(&self, group_id: &Uuid, user_id: &Uuid) -> Result<Option<bool>> {
        let conn = self.pool.get()?;
        let is_admin = conn
            .query_row(
                "SELECT is_admin FROM group_members WHERE group_id = ? AND user_id = ?",
                (group_id.to_string(), user_id.to_string()),
                |row| Ok(row.get::<_, i32>(0)? == 1),
            )
            .optional()?;
        Ok(is_admin)
    }
}
