pub mod auth;
pub mod error;
pub mod groups;
pub mod posts;
pub mod users;

pub use error::{ApiError, ApiResult};

use uuid::Uuid;

/// Parse an id taken from the URL path
pub(crate) fn parse_id(raw: &str, what: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid {} ID", what)))
}

/// Reject blank form fields
pub(crate) fn required(value: &str, field: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}
