use bson::doc;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    dao::models::UserEntity,
    dto::forms::{NewUserForm, ResetPasswordForm},
    error::ServiceError,
    services::{auth_service, by_lowercase_name, parse_id},
    session::ADMIN_USERNAME,
    state::SharedState,
};

/// Every login credential, ordered by username.
pub async fn list(state: &SharedState) -> Result<Vec<UserEntity>, ServiceError> {
    let mut users = state.collection::<UserEntity>().find_many(doc! {}).await?;
    users.sort_by(|a, b| by_lowercase_name(&a.username, &b.username));
    Ok(users)
}

/// Load one user by identifier.
pub async fn find(state: &SharedState, user_id: &str) -> Result<UserEntity, ServiceError> {
    let id = parse_id(user_id, "user")?;
    Ok(state.collection::<UserEntity>().find_by_id(id).await?)
}

/// Create a login credential. Returns the stored (lowercased) username.
pub async fn add(state: &SharedState, form: NewUserForm) -> Result<String, ServiceError> {
    form.validate()?;
    let username = form.username.to_lowercase();

    let users = state.collection::<UserEntity>();
    if users.find_one(doc! {"username": &username}).await?.is_some() {
        return Err(ServiceError::Duplicate(format!(
            "Username \"{username}\" is unavailable."
        )));
    }

    let user = UserEntity {
        id: bson::oid::ObjectId::new(),
        username,
        password_hash: auth_service::hash_password(form.password).await?,
    };
    users.insert_one(&user).await?;

    info!(user_id = %user.id, username = %user.username, "user added");
    Ok(user.username)
}

/// Replace the password of any user.
pub async fn set_password(
    state: &SharedState,
    user_id: &str,
    form: ResetPasswordForm,
) -> Result<(), ServiceError> {
    let user = find(state, user_id).await?;
    form.validate()?;

    let hash = auth_service::hash_password(form.password).await?;
    state
        .collection::<UserEntity>()
        .update_one(doc! {"_id": user.id}, doc! {"password": hash})
        .await?;

    info!(user_id = %user.id, "password reset by admin");
    Ok(())
}

/// Remove a login credential. Returns the removed username.
///
/// The admin account itself cannot be removed.
pub async fn delete(state: &SharedState, user_id: &str) -> Result<String, ServiceError> {
    let user = find(state, user_id).await?;
    if user.username == ADMIN_USERNAME {
        return Err(ServiceError::InvalidInput(
            "The admin account cannot be deleted.".into(),
        ));
    }

    state
        .collection::<UserEntity>()
        .delete_one(doc! {"_id": user.id})
        .await?;

    info!(user_id = %user.id, username = %user.username, "user deleted");
    Ok(user.username)
}

/// Create the admin account from the configured password when it does not exist.
///
/// Returns whether an account was created.
pub async fn ensure_admin(state: &SharedState) -> Result<bool, ServiceError> {
    let users = state.collection::<UserEntity>();
    let exists = users
        .find_one(doc! {"username": ADMIN_USERNAME})
        .await?
        .is_some();

    let Some(password) = state.config().admin_password.clone() else {
        if !exists {
            warn!("no admin account exists and ADMIN_PASSWORD is unset; user management is unreachable");
        }
        return Ok(false);
    };
    if exists {
        return Ok(false);
    }

    let user = UserEntity {
        id: bson::oid::ObjectId::new(),
        username: ADMIN_USERNAME.into(),
        password_hash: auth_service::hash_password(password).await?,
    };
    users.insert_one(&user).await?;

    info!(user_id = %user.id, "admin account created");
    Ok(true)
}
