use axum::{
    Form, Router,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use tracing::info;

use crate::{
    dto::forms::{LoginForm, UpdatePasswordForm},
    error::AppError,
    routes::{bounce, done, page},
    services::auth_service,
    session::Session,
    state::SharedState,
    views,
};

/// Login routes open to visitors.
pub fn public_router() -> Router<SharedState> {
    Router::new().route("/login", get(login_page).post(login))
}

/// Session routes for logged-in users.
pub fn members_router() -> Router<SharedState> {
    Router::new()
        .route("/logout", get(logout))
        .route("/update_password", get(update_password_page).post(update_password))
}

/// Login form; logged-in users go straight to the admin panel.
pub async fn login_page(
    State(state): State<SharedState>,
    session: Session,
) -> Result<Response, AppError> {
    if session.user().is_some() {
        return Ok(Redirect::to("/admin").into_response());
    }
    let ctx = page(&state, &session, "Login").await?;
    Ok(views::auth::login(&ctx)?.into_response())
}

/// Check credentials and start the session.
pub async fn login(
    State(state): State<SharedState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, AppError> {
    if session.user().is_some() {
        return Ok(Redirect::to("/admin"));
    }
    match auth_service::login(&state, form).await {
        Ok(username) => {
            let notice = format!("Welcome, {username}");
            session.log_in(username);
            Ok(done(&session, notice, "/admin"))
        }
        Err(err) => bounce(&session, err, "/login"),
    }
}

/// End the session.
pub async fn logout(session: Session) -> Redirect {
    if let Some(user) = session.log_out() {
        info!(username = %user, "user logged out");
    }
    done(&session, "You have been logged out.", "/")
}

/// Password change form.
pub async fn update_password_page(
    State(state): State<SharedState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let ctx = page(&state, &session, "Update Password").await?;
    Ok(views::auth::update_password(&ctx)?)
}

/// Change the logged-in user's password.
pub async fn update_password(
    State(state): State<SharedState>,
    session: Session,
    Form(form): Form<UpdatePasswordForm>,
) -> Result<Redirect, AppError> {
    let username = session
        .user()
        .ok_or_else(|| AppError::Internal("password change without a session".into()))?;
    match auth_service::update_password(&state, &username, form).await {
        Ok(()) => Ok(done(&session, "Password updated.", "/admin")),
        Err(err) => bounce(&session, err, "/update_password"),
    }
}
