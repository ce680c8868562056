//! Route guards installed with `route_layer`.

use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::session::Session;

/// Notice shown when a visitor opens a members-only page.
pub const LOGIN_REQUIRED: &str = "You must login to access that page.";
/// Notice shown when a non-admin opens an admin-only page.
pub const ADMIN_REQUIRED: &str = "You do not have permission to access that page.";

/// Let the request through when someone is logged in, otherwise send them to the login page.
pub async fn require_login(session: Session, req: Request<Body>, next: Next) -> Response {
    if session.user().is_some() {
        return next.run(req).await;
    }
    debug!(path = %req.uri().path(), "login required");
    session.flash(LOGIN_REQUIRED);
    Redirect::to("/login").into_response()
}

/// Let the request through for the admin account only, otherwise send the visitor home.
pub async fn require_admin(session: Session, req: Request<Body>, next: Next) -> Response {
    if session.is_admin() {
        return next.run(req).await;
    }
    debug!(path = %req.uri().path(), user = ?session.user(), "admin required");
    session.flash(ADMIN_REQUIRED);
    Redirect::to("/").into_response()
}
