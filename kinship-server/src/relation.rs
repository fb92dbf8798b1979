use anyhow::Context;
use chrono::Utc;
use rusqlite::TransactionBehavior;
use uuid::Uuid;

use kinship_types::RelationKind;

use crate::db::repositories::timestamp_text;
use crate::db::Database;
use crate::error::{DomainError, DomainResult};

/// Storage layout of one edge relation
struct EdgeTable {
    table: &'static str,
    actor_column: &'static str,
    target_column: &'static str,
    timestamp_column: &'static str,
    /// Table the target id must exist in
    target_table: &'static str,
    target_label: &'static str,
}

fn edge_table(kind: RelationKind) -> EdgeTable {
    match kind {
        RelationKind::Follow => EdgeTable {
            table: "follows",
            actor_column: "follower_id",
            target_column: "following_id",
            timestamp_column: "created_at",
            target_table: "users",
            target_label: "User",
        },
        RelationKind::Like => EdgeTable {
            table: "likes",
            actor_column: "user_id",
            target_column: "post_id",
            timestamp_column: "created_at",
            target_table: "posts",
            target_label: "Post",
        },
        RelationKind::GroupMembership => EdgeTable {
            table: "group_members",
            actor_column: "user_id",
            target_column: "group_id",
            timestamp_column: "joined_at",
            target_table: "groups",
            target_label: "Group",
        },
    }
}

/// Result of flipping an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggled {
    /// Whether the edge exists after the toggle
    pub active: bool,
    /// Edges pointing at the target after the toggle
    pub count: usize,
}

/// Flips follow / like / membership edges.
///
/// Each toggle is one `BEGIN IMMEDIATE` transaction, so concurrent toggles
/// on the same pair serialize, and the composite primary key on every edge
/// table guarantees at most one row per pair.
#[derive(Clone)]
pub struct RelationToggler {
    db: Database,
}

impl RelationToggler {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn toggle(&self, kind: RelationKind, actor_id: Uuid, target_id: Uuid) -> DomainResult<Toggled> {
        if kind == RelationKind::Follow && actor_id == target_id {
            return Err(DomainError::SelfFollow);
        }

        let edge = edge_table(kind);
        let actor = actor_id.to_string();
        let target = target_id.to_string();

        let mut conn = self.db.connection()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("Failed to begin toggle transaction")?;

        let target_exists: bool = tx
            .query_row(
                &format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)", edge.target_table),
                [&target],
                |row| row.get(0),
            )
            .with_context(|| format!("Failed to look up {}", edge.target_label))?;
        if !target_exists {
            return Err(DomainError::NotFound(edge.target_label));
        }

        // Deleting doubles as the existence check
        let removed = tx
            .execute(
                &format!(
                    "DELETE FROM {} WHERE {} = ? AND {} = ?",
                    edge.table, edge.actor_column, edge.target_column
                ),
                [&actor, &target],
            )
            .with_context(|| format!("Failed to remove {} edge", kind.as_str()))?;

        let active = if removed > 0 {
            false
        } else {
            tx.execute(
                &format!(
                    "INSERT OR IGNORE INTO {} ({}, {}, {}) VALUES (?, ?, ?)",
                    edge.table, edge.actor_column, edge.target_column, edge.timestamp_column
                ),
                [&actor, &target, &timestamp_text(&Utc::now())],
            )
            .with_context(|| format!("Failed to insert {} edge", kind.as_str()))?;
            true
        };

        let count: i64 = tx
            .query_row(
                &format!(
                    "SELECT COUNT(*) FROM {} WHERE {} = ?",
                    edge.table, edge.target_column
                ),
                [&target],
                |row| row.get(0),
            )
            .with_context(|| format!("Failed to count {} edges", kind.as_str()))?;

        tx.commit().context("Failed to commit toggle")?;

        tracing::info!(
            "{} {} -> {}: {} (count {})",
            kind.as_str(),
            actor_id,
            target_id,
            if active { "on" } else { "off" },
            count
        );

        Ok(Toggled {
            active,
            count: count as usize,
        })
    }

    pub fn toggle_follow(&self, follower_id: Uuid, following_id: Uuid) -> DomainResult<Toggled> {
        self.toggle(RelationKind::Follow, follower_id, following_id)
    }

    pub fn toggle_like(&self, user_id: Uuid, post_id: Uuid) -> DomainResult<Toggled> {
        self.toggle(RelationKind::Like, user_id, post_id)
    }

    pub fn toggle_membership(&self, user_id: Uuid, group_id: Uuid) -> DomainResult<Toggled> {
        self.toggle(RelationKind::GroupMembership, user_id, group_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{fixtures, FollowRepository, GroupRepository};
    use proptest::prelude::*;

    #[test]
    fn test_follow_toggle_round_trip() {
        let db = fixtures::database();
        let alice = fixtures::user(&db, "alice");
        let bob = fixtures::user(&db, "bob");
        let toggler = RelationToggler::new(db.clone());

        let on = toggler.toggle_follow(alice.id, bob.id).unwrap();
        assert_eq!(on, Toggled { active: true, count: 1 });

        let off = toggler.toggle_follow(alice.id, bob.id).unwrap();
        assert_eq!(off, Toggled { active: false, count: 0 });

        assert!(!FollowRepository::new(db.pool.clone())
            .is_following(&alice.id, &bob.id)
            .unwrap());
    }

    #[test]
    fn test_follow_count_is_per_target() {
        let db = fixtures::database();
        let alice = fixtures::user(&db, "alice");
        let bob = fixtures::user(&db, "bob");
        let carol = fixtures::user(&db, "carol");
        let toggler = RelationToggler::new(db);

        assert_eq!(toggler.toggle_follow(alice.id, carol.id).unwrap().count, 1);
        assert_eq!(toggler.toggle_follow(bob.id, carol.id).unwrap().count, 2);
        // Following back does not change carol's follower count
        assert_eq!(toggler.toggle_follow(carol.id, alice.id).unwrap().count, 1);
        assert_eq!(toggler.toggle_follow(alice.id, carol.id).unwrap(), Toggled { active: false, count: 1 });
    }

    #[test]
    fn test_self_follow_rejected() {
        let db = fixtures::database();
        let alice = fixtures::user(&db, "alice");
        let toggler = RelationToggler::new(db);

        let err = toggler.toggle_follow(alice.id, alice.id).unwrap_err();
        assert!(matches!(err, DomainError::SelfFollow));
    }

    #[test]
    fn test_self_follow_rejected_even_for_unknown_ids() {
        let toggler = RelationToggler::new(fixtures::database());
        let id = Uuid::new_v4();
        assert!(matches!(
            toggler.toggle_follow(id, id).unwrap_err(),
            DomainError::SelfFollow
        ));
    }

    #[test]
    fn test_missing_targets() {
        let db = fixtures::database();
        let alice = fixtures::user(&db, "alice");
        let toggler = RelationToggler::new(db);
        let missing = Uuid::new_v4();

        assert!(matches!(
            toggler.toggle_follow(alice.id, missing).unwrap_err(),
            DomainError::NotFound("User")
        ));
        assert!(matches!(
            toggler.toggle_like(alice.id, missing).unwrap_err(),
            DomainError::NotFound("Post")
        ));
        assert!(matches!(
            toggler.toggle_membership(alice.id, missing).unwrap_err(),
            DomainError::NotFound("Group")
        ));
    }

    #[test]
    fn test_like_toggle() {
        let db = fixtures::database();
        let alice = fixtures::user(&db, "alice");
        let bob = fixtures::user(&db, "bob");
        let post = fixtures::post(&db, &alice, None);
        let toggler = RelationToggler::new(db);

        assert_eq!(toggler.toggle_like(alice.id, post.id).unwrap(), Toggled { active: true, count: 1 });
        assert_eq!(toggler.toggle_like(bob.id, post.id).unwrap(), Toggled { active: true, count: 2 });
        assert_eq!(toggler.toggle_like(alice.id, post.id).unwrap(), Toggled { active: false, count: 1 });
    }

    #[test]
    fn test_membership_toggle_counts_creator() {
        let db = fixtures::database();
        let alice = fixtures::user(&db, "alice");
        let bob = fixtures::user(&db, "bob");
        let group = fixtures::group(&db, &alice, "rustaceans");
        let toggler = RelationToggler::new(db.clone());

        let joined = toggler.toggle_membership(bob.id, group.id).unwrap();
        assert_eq!(joined, Toggled { active: true, count: 2 });

        let groups = GroupRepository::new(db.pool.clone());
        assert_eq!(groups.membership(&group.id, &bob.id).unwrap(), Some(false));

        let left = toggler.toggle_membership(bob.id, group.id).unwrap();
        assert_eq!(left, Toggled { active: false, count: 1 });
        assert_eq!(groups.membership(&group.id, &bob.id).unwrap(), None);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn even_number_of_toggles_restores_state(
            pre_followers in 0usize..4,
            rounds in 1usize..4,
        ) {
            let db = fixtures::database();
            let target = fixtures::user(&db, "target");
            let actor = fixtures::user(&db, "actor");
            let toggler = RelationToggler::new(db.clone());

            for i in 0..pre_followers {
                let other = fixtures::user(&db, &format!("other{}", i));
                toggler.toggle_follow(other.id, target.id).unwrap();
            }

            let follows = FollowRepository::new(db.pool.clone());
            let count_before = follows.get_follower_count(&target.id).unwrap();
            let state_before = follows.is_following(&actor.id, &target.id).unwrap();

            for _ in 0..rounds {
                let first = toggler.toggle_follow(actor.id, target.id).unwrap();
                prop_assert!(first.active);
                prop_assert_eq!(first.count, count_before + 1);

                let second = toggler.toggle_follow(actor.id, target.id).unwrap();
                prop_assert!(!second.active);
                prop_assert_eq!(second.count, count_before);
            }

            prop_assert_eq!(follows.get_follower_count(&target.id).unwrap(), count_before);
            prop_assert_eq!(follows.is_following(&actor.id, &target.id).unwrap(), state_before);
        }
    }
}
