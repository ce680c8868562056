//! Password hashing plus the login and password-change flows.

use argon2::{
    Argon2, PasswordHasher, PasswordVerifier,
    password_hash::{PasswordHash, SaltString},
};
use bson::doc;
use rand_core::OsRng;
use tokio::task;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    dao::models::UserEntity,
    dto::forms::{LoginForm, UpdatePasswordForm},
    error::ServiceError,
    state::SharedState,
};

/// Notice shown for any failed login, whatever the cause.
pub const LOGIN_FAILED: &str = "Username or password incorrect. Please try again.";
/// Notice shown when the current password does not match on a password change.
pub const WRONG_CURRENT_PASSWORD: &str =
    "The current password you entered was incorrect.  Please try again.";

/// Hash `password` into a PHC string with a fresh random salt.
///
/// Runs on the blocking pool since argon2 is deliberately slow.
pub async fn hash_password(password: String) -> Result<String, ServiceError> {
    task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| ServiceError::Internal(format!("failed to hash password: {err}")))
    })
    .await
    .map_err(|err| ServiceError::Internal(format!("hashing task failed: {err}")))?
}

/// Check `password` against a stored PHC string. Unparseable hashes never match.
pub async fn verify_password(hash: String, password: String) -> Result<bool, ServiceError> {
    task::spawn_blocking(move || {
        let Ok(parsed) = PasswordHash::new(&hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
    .await
    .map_err(|err| ServiceError::Internal(format!("verification task failed: {err}")))
}

/// Look up a user by username, lowercased.
pub async fn find_user(
    state: &SharedState,
    username: &str,
) -> Result<Option<UserEntity>, ServiceError> {
    Ok(state
        .collection::<UserEntity>()
        .find_one(doc! {"username": username.to_lowercase()})
        .await?)
}

/// Check credentials and return the username to store in the session.
///
/// Unknown users and wrong passwords are reported identically.
pub async fn login(state: &SharedState, form: LoginForm) -> Result<String, ServiceError> {
    if form.validate().is_err() {
        return Err(ServiceError::Unauthorized(LOGIN_FAILED.into()));
    }

    let Some(user) = find_user(state, &form.username).await? else {
        warn!(username = %form.username, "login rejected: unknown user");
        return Err(ServiceError::Unauthorized(LOGIN_FAILED.into()));
    };

    if !verify_password(user.password_hash, form.password).await? {
        warn!(user_id = %user.id, "login rejected: password mismatch");
        return Err(ServiceError::Unauthorized(LOGIN_FAILED.into()));
    }

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(user.username)
}

/// Replace the password of the logged-in `username` after checking the current one.
pub async fn update_password(
    state: &SharedState,
    username: &str,
    form: UpdatePasswordForm,
) -> Result<(), ServiceError> {
    let user = find_user(state, username)
        .await?
        .ok_or_else(|| ServiceError::Unauthorized(WRONG_CURRENT_PASSWORD.into()))?;

    if !verify_password(user.password_hash.clone(), form.password.clone()).await? {
        warn!(user_id = %user.id, "password change rejected: current password mismatch");
        return Err(ServiceError::Unauthorized(WRONG_CURRENT_PASSWORD.into()));
    }
    form.validate()?;

    let hash = hash_password(form.new_password).await?;
    state
        .collection::<UserEntity>()
        .update_one(doc! {"_id": user.id}, doc! {"password": hash})
        .await?;

    info!(user_id = %user.id, "password updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashes_verify_only_their_password() {
        let hash = hash_password("hunter2".into()).await.unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(hash.clone(), "hunter2".into()).await.unwrap());
        assert!(!verify_password(hash, "hunter3".into()).await.unwrap());
    }

    #[tokio::test]
    async fn unparseable_hash_is_a_mismatch() {
        let legacy = "pbkdf2:sha256:260000$salt$digest".to_owned();
        assert!(!verify_password(legacy, "anything".into()).await.unwrap());
    }
}
