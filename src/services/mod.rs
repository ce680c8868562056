//! Business logic behind the route handlers. Every function takes the shared
//! state, talks to the store through typed collections and reports failures
//! as [`ServiceError`](crate::error::ServiceError).

use bson::oid::ObjectId;

use crate::error::ServiceError;

/// Login, logout and password changes.
pub mod auth_service;
/// Category management.
pub mod category_service;
/// Game management.
pub mod game_service;
/// Store connectivity probe.
pub mod health_service;
/// Leaderboard aggregation and score listings.
pub mod leaderboard_service;
/// Games and their categories for the menu.
pub mod navigation;
/// Player management.
pub mod player_service;
/// Score entry and removal.
pub mod score_service;
/// Login credential management.
pub mod user_service;

/// Parse an identifier taken from a URL or form field.
///
/// A malformed identifier cannot name any stored document, so it is reported
/// as not found.
pub fn parse_id(raw: &str, what: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(raw.trim())
        .map_err(|_| ServiceError::NotFound(format!("{what} `{raw}` not found")))
}

/// Case-insensitive name ordering used by every listing.
pub(crate) fn by_lowercase_name(left: &str, right: &str) -> std::cmp::Ordering {
    left.to_lowercase().cmp(&right.to_lowercase())
}
