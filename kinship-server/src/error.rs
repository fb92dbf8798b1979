use thiserror::Error;

/// Rule violations raised by the domain layer.
///
/// Everything except `Storage` is the caller's fault and maps to a 4xx
/// response; `Storage` wraps an unexpected database failure.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Username already taken")]
    UsernameTaken,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Group name already taken")]
    GroupNameTaken,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Cannot follow yourself")]
    SelfFollow,

    #[error("{0}")]
    Invalid(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Returns the constraint description ("users.username", ...) when `err` is a
/// UNIQUE or PRIMARY KEY violation.
pub(crate) fn unique_violation(err: &rusqlite::Error) -> Option<&str> {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(msg))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            msg.strip_prefix("UNIQUE constraint failed: ")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(DomainError::SelfFollow.to_string(), "Cannot follow yourself");
        assert_eq!(DomainError::NotFound("Post").to_string(), "Post not found");
        assert_eq!(
            DomainError::Invalid("Username is required".into()).to_string(),
            "Username is required"
        );
    }

    #[test]
    fn test_unique_violation_detection() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT UNIQUE NOT NULL); INSERT INTO t VALUES ('a');")
            .unwrap();

        let err = conn.execute("INSERT INTO t VALUES ('a')", []).unwrap_err();
        assert_eq!(unique_violation(&err), Some("t.name"));

        let err = conn.execute("INSERT INTO t VALUES (NULL)", []).unwrap_err();
        assert_eq!(unique_violation(&err), None);
    }
}
