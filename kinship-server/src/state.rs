use chrono::Duration;

use crate::auth::{CredentialStore, TokenIssuer};
use crate::config::Auth;
use crate::db::Database;
use crate::relation::RelationToggler;
use crate::session::SessionResolver;

/// Everything a request handler needs, passed explicitly through axum state
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tokens: TokenIssuer,
    pub credentials: CredentialStore,
    pub sessions: SessionResolver,
    pub relations: RelationToggler,
}

impl AppState {
    pub fn new(db: Database, auth: &Auth) -> Self {
        let tokens = TokenIssuer::new(
            auth.secret_key.as_bytes(),
            Duration::minutes(auth.access_token_expire_minutes),
        );
        Self {
            credentials: CredentialStore::new(db.clone(), auth.bcrypt_cost),
            sessions: SessionResolver::new(db.clone(), tokens.clone()),
            relations: RelationToggler::new(db.clone()),
            tokens,
            db,
        }
    }
}
