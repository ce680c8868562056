//! Form bodies submitted by the admin pages.
//!
//! Text fields are trimmed while deserializing, so a whitespace-only value
//! fails the same `length(min = 1)` rule as a missing one.

use serde::{Deserialize, Deserializer};
use serde_with::{NoneAsEmptyString, serde_as};
use validator::{Validate, ValidationError};

fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_owned())
}

/// Accepts only absolute `http` or `https` addresses.
pub fn validate_web_address(link: &str) -> Result<(), ValidationError> {
    let scheme = link.split_once("://").map(|(scheme, _)| scheme.to_ascii_lowercase());
    if matches!(scheme.as_deref(), Some("http" | "https")) {
        return Ok(());
    }
    let mut err = ValidationError::new("web_address_scheme");
    err.message = Some("Please enter a full web address for the link.".into());
    Err(err)
}

/// `POST /login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Username or password incorrect. Please try again."))]
    pub username: String,
    /// Plaintext password, hashed before it is stored.
    #[serde(default)]
    #[validate(length(min = 1, message = "Username or password incorrect. Please try again."))]
    pub password: String,
}

/// `POST /add_user`.
#[derive(Debug, Deserialize, Validate)]
pub struct NewUserForm {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 64, message = "Please enter a username of up to 64 characters."))]
    pub username: String,
    /// Plaintext password, hashed before it is stored.
    #[serde(default)]
    #[validate(length(min = 1, message = "Please enter a password."))]
    pub password: String,
}

/// `POST /edit_user/{id}`: admin reset of another user's password.
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordForm {
    /// New plaintext password.
    #[serde(default)]
    #[validate(length(min = 1, message = "Please enter a password."))]
    pub password: String,
}

/// `POST /update_password`: the logged-in user changes their own password.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePasswordForm {
    /// Current password.
    #[serde(default)]
    pub password: String,
    /// Replacement password.
    #[serde(default)]
    #[validate(length(min = 1, message = "Please enter a new password."))]
    pub new_password: String,
}

/// `POST /add_game` and `POST /edit_game/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct GameForm {
    /// Display name; stored in slug form.
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Please enter a game name."))]
    pub name: String,
}

/// `POST /add_category` and `POST /edit_category/{game_id}/{category_id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct CategoryForm {
    /// Identifier of the owning game.
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Please choose a game."))]
    pub game_id: String,
    /// Display name; stored in slug form.
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Please enter a category name."))]
    pub name: String,
    /// Rules text.
    #[serde(default, deserialize_with = "trimmed")]
    pub desc: String,
}

/// `POST /add_player` and `POST /edit_player/{id}`.
///
/// `twitch` and `youtube` take bare handles; `link` takes a full URL.
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct PlayerForm {
    /// Player name.
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Please enter a player name."))]
    pub name: String,
    /// Twitch handle or channel URL.
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub twitch: Option<String>,
    /// YouTube handle or channel URL.
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub youtube: Option<String>,
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    #[validate(
        url(message = "Please enter a full web address for the link."),
        custom(function = "validate_web_address")
    )]
    /// Full `http`/`https` address.
    pub link: Option<String>,
}

/// `POST /add_score/{category_id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct ScoreForm {
    /// Identifier of the player the run belongs to.
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Please choose a player."))]
    pub player_name: String,
    /// Hours of the run time.
    #[serde(default, deserialize_with = "trimmed")]
    pub hours: String,
    /// Minutes of the run time.
    #[serde(default, deserialize_with = "trimmed")]
    pub minutes: String,
    /// Seconds of the run time.
    #[serde(default, deserialize_with = "trimmed")]
    pub seconds: String,
    /// Centiseconds of the run time.
    #[serde(default, deserialize_with = "trimmed")]
    pub centiseconds: String,
}

impl ScoreForm {
    /// The time fields joined as `hours:minutes:seconds.centiseconds`.
    pub fn time_text(&self) -> String {
        format!(
            "{}:{}:{}.{}",
            self.hours, self.minutes, self.seconds, self.centiseconds
        )
    }
}
