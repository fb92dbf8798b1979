use anyhow::Context;

use kinship_types::{SignupForm, User};

use crate::db::repositories::{NewUser, UserRepository};
use crate::db::Database;
use crate::error::{DomainError, DomainResult};

/// Account registration and password checks
#[derive(Clone)]
pub struct CredentialStore {
    db: Database,
    bcrypt_cost: u32,
}

impl CredentialStore {
    pub fn new(db: Database, bcrypt_cost: u32) -> Self {
        Self { db, bcrypt_cost }
    }

    /// Register a new account.
    ///
    /// Validation order: required fields, password confirmation, username
    /// uniqueness, email uniqueness.
    pub fn signup(&self, form: &SignupForm) -> DomainResult<User> {
        let username = form.username.trim();
        let email = form.email.trim();

        if username.is_empty() {
            return Err(DomainError::Invalid("Username is required".to_string()));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::Invalid("A valid email is required".to_string()));
        }
        if form.password.is_empty() {
            return Err(DomainError::Invalid("Password is required".to_string()));
        }
        if form.password != form.confirm_password {
            return Err(DomainError::PasswordMismatch);
        }

        let hashed_password = bcrypt::hash(&form.password, self.bcrypt_cost)
            .context("Failed to hash password")?;

        let full_name = Some(form.full_name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        let user = UserRepository::new(self.db.pool.clone()).create(&NewUser {
            username: username.to_string(),
            email: email.to_string(),
            full_name,
            hashed_password,
        })?;

        tracing::info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Check a username/password pair. Unknown users and wrong passwords both
    /// yield `None`.
    pub fn authenticate(&self, username: &str, password: &str) -> anyhow::Result<Option<User>> {
        let repo = UserRepository::new(self.db.pool.clone());
        let Some((user, hashed_password)) = repo.get_credentials(username.trim())? else {
            tracing::debug!("Login attempt for unknown user");
            return Ok(None);
        };

        // A corrupt hash is treated as a failed check rather than a server error
        let matches = bcrypt::verify(password, &hashed_password).unwrap_or_else(|e| {
            tracing::error!("Stored password hash for {} is unreadable: {}", user.username, e);
            false
        });

        if matches {
            Ok(Some(user))
        } else {
            tracing::debug!("Wrong password for {}", user.username);
            Ok(None)
        }
    }
}
