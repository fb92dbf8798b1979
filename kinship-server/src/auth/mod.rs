//! Credentials, access tokens and the cookie that carries them.

pub mod cookie;
pub mod credentials;
pub mod token;

pub use credentials::CredentialStore;
pub use token::{Claims, TokenError, TokenIssuer};
