use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    response::Redirect,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::{
    error::{AppError, ServiceError},
    services::navigation,
    session::{Session, session_layer},
    state::SharedState,
    views::PageContext,
};

/// Admin panel.
pub mod admin;
/// Login, logout and password change.
pub mod auth;
/// Category management.
pub mod categories;
/// Branded 404 and 500 pages.
pub mod error_page;
/// Game management.
pub mod games;
/// Login and admin guards.
pub mod guard;
/// Health check endpoint.
pub mod health;
/// Player management.
pub mod players;
/// Public leaderboards.
pub mod public;
/// Score management.
pub mod scores;
/// User management (admin only).
pub mod users;

/// Compose all route trees behind their guards and wire in the shared layers.
pub fn router(state: SharedState) -> Router<()> {
    let public_router = health::router()
        .merge(public::router())
        .merge(auth::public_router());

    let members_router = auth::members_router()
        .merge(admin::router())
        .merge(games::router())
        .merge(categories::router())
        .merge(players::router())
        .merge(scores::router())
        .route_layer(from_fn(guard::require_login));

    let admin_router = users::router().route_layer(from_fn(guard::require_admin));

    Router::new()
        .merge(public_router)
        .merge(members_router)
        .merge(admin_router)
        .fallback(error_page::not_found)
        .layer(CatchPanicLayer::custom(error_page::panic_response))
        .layer(from_fn_with_state(state.clone(), error_page::render_error_page))
        .layer(from_fn_with_state(state.clone(), session_layer))
        .with_state(state)
}

/// Shared page data: title, session identity, pending notices and the menu.
pub(crate) async fn page(
    state: &SharedState,
    session: &Session,
    title: impl Into<String>,
) -> Result<PageContext, AppError> {
    let nav = navigation::nav_links(state).await?;
    Ok(PageContext::new(title, session, nav))
}

/// Report a user-facing failure as a notice on the originating form.
///
/// Anything else becomes an error page.
pub(crate) fn bounce(session: &Session, err: ServiceError, back: &str) -> Result<Redirect, AppError> {
    match err {
        ServiceError::Duplicate(notice)
        | ServiceError::InvalidInput(notice)
        | ServiceError::Unauthorized(notice) => {
            session.flash(notice);
            Ok(Redirect::to(back))
        }
        other => Err(other.into()),
    }
}

/// Flash `notice` and redirect to `to`.
pub(crate) fn done(session: &Session, notice: impl Into<String>, to: &str) -> Redirect {
    session.flash(notice);
    Redirect::to(to)
}
