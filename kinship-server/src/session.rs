use anyhow::Result;

use kinship_types::User;

use crate::auth::cookie::strip_scheme;
use crate::auth::TokenIssuer;
use crate::db::repositories::UserRepository;
use crate::db::Database;

/// Maps a request's stored credential to the user it belongs to.
///
/// Every authentication failure (no credential, malformed/expired/forged
/// token, user no longer exists) resolves to `Ok(None)`. Only a failing
/// database lookup is an error.
#[derive(Clone)]
pub struct SessionResolver {
    db: Database,
    tokens: TokenIssuer,
}

impl SessionResolver {
    pub fn new(db: Database, tokens: TokenIssuer) -> Self {
        Self { db, tokens }
    }

    /// Resolve a raw credential such as `"Bearer <token>"` to a user
    pub fn resolve(&self, credential: Option<&str>) -> Result<Option<User>> {
        let Some(credential) = credential else {
            return Ok(None);
        };

        let token = strip_scheme(credential);
        if token.is_empty() {
            return Ok(None);
        }

        let claims = match self.tokens.verify(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!("Rejected access token: {}", e);
                return Ok(None);
            }
        };

        let user = UserRepository::new(self.db.pool.clone()).get_by_username(&claims.sub)?;
        if user.is_none() {
            tracing::debug!("Access token subject {} no longer exists", claims.sub);
        }
        Ok(user)
    }
}
