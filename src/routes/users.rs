//! User management, restricted to the admin account.

use axum::{
    Form, Router,
    extract::{Path, State},
    response::{Html, Redirect},
    routing::get,
};

use crate::{
    codec::slug::to_path_segment,
    dto::forms::{NewUserForm, ResetPasswordForm},
    error::AppError,
    routes::{bounce, done, page},
    services::user_service,
    session::Session,
    state::SharedState,
    views,
};

/// User management routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/manage_users", get(manage_users))
        .route("/add_user", get(add_user_page).post(add_user))
        .route("/edit_user/{id}", get(edit_user_page).post(edit_user))
        .route("/delete_user/{id}", get(delete_user))
}

/// List every login.
pub async fn manage_users(
    State(state): State<SharedState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let users = user_service::list(&state).await?;
    let ctx = page(&state, &session, "Manage Users").await?;
    Ok(views::admin::users(&ctx, &users)?)
}

/// Add User form.
pub async fn add_user_page(
    State(state): State<SharedState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let ctx = page(&state, &session, "Add User").await?;
    Ok(views::admin::add_user(&ctx)?)
}

/// Create a login; taken usernames bounce back to the form.
pub async fn add_user(
    State(state): State<SharedState>,
    session: Session,
    Form(form): Form<NewUserForm>,
) -> Result<Redirect, AppError> {
    match user_service::add(&state, form).await {
        Ok(username) => Ok(done(
            &session,
            format!("User '{username}' has been added to the database."),
            "/add_user",
        )),
        Err(err) => bounce(&session, err, "/add_user"),
    }
}

/// Reset Password form for one user.
pub async fn edit_user_page(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let user = user_service::find(&state, &id).await?;
    let ctx = page(&state, &session, "Edit User").await?;
    Ok(views::admin::edit_user(&ctx, &user)?)
}

/// Replace a user's password hash.
pub async fn edit_user(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Redirect, AppError> {
    match user_service::set_password(&state, &id, form).await {
        Ok(()) => Ok(done(&session, "Password updated.", "/manage_users")),
        Err(err) => bounce(&session, err, &format!("/edit_user/{}", to_path_segment(&id))),
    }
}

/// Remove a login. The admin account is kept.
pub async fn delete_user(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    match user_service::delete(&state, &id).await {
        Ok(username) => Ok(done(&session, format!("User '{username}' deleted."), "/manage_users")),
        Err(err) => bounce(&session, err, "/manage_users"),
    }
}
