use std::path::PathBuf;
use std::thread;

use anyhow::Result;
use uuid::Uuid;

use kinship_server::db::repositories::{
    GroupRepository, NewPost, NewUser, PostRepository, UserRepository,
};
use kinship_server::db::Database;
use kinship_server::error::DomainError;
use kinship_server::relation::RelationToggler;
use kinship_types::User;

/// On-disk database removed when dropped; in-memory databases would not
/// exercise SQLite's file locking.
struct TempDatabase {
    db: Database,
    path: PathBuf,
}

impl TempDatabase {
    fn new() -> Result<Self> {
        let path = std::env::temp_dir().join(format!("kinship-toggle-{}.db", Uuid::new_v4()));
        let db = Database::new(&path)?;
        db.initialize()?;
        Ok(Self { db, path })
    }
}

impl Drop for TempDatabase {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
        let _ = std::fs::remove_file(self.path.with_extension("db-journal"));
    }
}

fn create_user(db: &Database, username: &str) -> Result<User> {
    Ok(UserRepository::new(db.pool.clone()).create(&NewUser {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        full_name: None,
        hashed_password: "not-a-real-hash".to_string(),
    })?)
}

fn count_rows(db: &Database, sql: &str, a: &Uuid, b: &Uuid) -> Result<i64> {
    let conn = db.connection()?;
    Ok(conn.query_row(sql, (a.to_string(), b.to_string()), |row| row.get(0))?)
}

/// Run `toggles` concurrent toggles of the same pair
fn toggle_concurrently<F>(toggler: &RelationToggler, toggles: usize, op: F)
where
    F: Fn(&RelationToggler) + Send + Sync + Copy + 'static,
{
    let handles: Vec<_> = (0..toggles)
        .map(|_| {
            let toggler = toggler.clone();
            thread::spawn(move || op(&toggler))
        })
        .collect();

    for handle in handles {
        handle.join().expect("toggle thread panicked");
    }
}

#[test]
fn test_concurrent_membership_toggles_leave_at_most_one_row() -> Result<()> {
    let temp = TempDatabase::new()?;
    let alice = create_user(&temp.db, "alice")?;
    let bob = create_user(&temp.db, "bob")?;
    let group = GroupRepository::new(temp.db.pool.clone()).create("crabs", None, alice.id)?;
    let toggler = RelationToggler::new(temp.db.clone());

    for toggles in [7usize, 8] {
        let (bob_id, group_id) = (bob.id, group.id);
        let before = count_rows(
            &temp.db,
            "SELECT COUNT(*) FROM group_members WHERE user_id = ? AND group_id = ?",
            &bob_id,
            &group_id,
        )?;

        toggle_concurrently(&toggler, toggles, move |t| {
            t.toggle_membership(bob_id, group_id).expect("toggle failed");
        });

        let after = count_rows(
            &temp.db,
            "SELECT COUNT(*) FROM group_members WHERE user_id = ? AND group_id = ?",
            &bob_id,
            &group_id,
        )?;
        assert!(after <= 1);
        assert_eq!(after, (before + toggles as i64) % 2);
    }

    // The creator's own membership is never touched
    let alice_rows = count_rows(
        &temp.db,
        "SELECT COUNT(*) FROM group_members WHERE user_id = ? AND group_id = ?",
        &alice.id,
        &group.id,
    )?;
    assert_eq!(alice_rows, 1);

    Ok(())
}

#[test]
fn test_concurrent_like_and_follow_toggles() -> Result<()> {
    let temp = TempDatabase::new()?;
    let alice = create_user(&temp.db, "alice")?;
    let bob = create_user(&temp.db, "bob")?;
    let post = PostRepository::new(temp.db.pool.clone()).create(&NewPost {
        title: "Hello".to_string(),
        content: "Race me".to_string(),
        image_url: None,
        video_url: None,
        owner_id: alice.id,
        group_id: None,
    })?;
    let toggler = RelationToggler::new(temp.db.clone());

    let (bob_id, post_id, alice_id) = (bob.id, post.id, alice.id);
    toggle_concurrently(&toggler, 9, move |t| {
        t.toggle_like(bob_id, post_id).expect("like failed");
    });
    toggle_concurrently(&toggler, 6, move |t| {
        t.toggle_follow(bob_id, alice_id).expect("follow failed");
    });

    let likes = count_rows(
        &temp.db,
        "SELECT COUNT(*) FROM likes WHERE user_id = ? AND post_id = ?",
        &bob.id,
        &post.id,
    )?;
    let follows = count_rows(
        &temp.db,
        "SELECT COUNT(*) FROM follows WHERE follower_id = ? AND following_id = ?",
        &bob.id,
        &alice.id,
    )?;
    assert_eq!(likes, 1);
    assert_eq!(follows, 0);

    Ok(())
}

#[test]
fn test_concurrent_group_creation_with_same_name() -> Result<()> {
    let temp = TempDatabase::new()?;
    let alice = create_user(&temp.db, "alice")?;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let repo = GroupRepository::new(temp.db.pool.clone());
            let creator = alice.id;
            thread::spawn(move || repo.create("crabs", None, creator))
        })
        .collect();
    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("creator thread panicked"))
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for result in results.iter().filter(|r| r.is_err()) {
        assert!(matches!(result, Err(DomainError::GroupNameTaken)));
    }

    let conn = temp.db.connection()?;
    let groups: i64 = conn.query_row("SELECT COUNT(*) FROM groups", [], |row| row.get(0))?;
    let members: i64 = conn.query_row("SELECT COUNT(*) FROM group_members", [], |row| row.get(0))?;
    assert_eq!((groups, members), (1, 1));

    Ok(())
}
