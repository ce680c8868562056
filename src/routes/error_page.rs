use std::any::Any;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::{
    error::{AppError, ErrorPage},
    services::navigation::{self, NavLinks},
    session::Session,
    state::SharedState,
    views::{self, PageContext},
};

/// Fallback for unmatched routes.
pub async fn not_found() -> AppError {
    AppError::NotFound("no route matches the request".into())
}

/// Turn a handler panic into the 500 page.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(%message, "handler panicked");
    AppError::Internal("handler panicked".into()).into_response()
}

/// Replace the body of error responses with the branded page, menu included.
pub async fn render_error_page(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let session = req.extensions().get::<Session>().cloned().unwrap_or_default();
    let response = next.run(req).await;

    let Some(page) = response.extensions().get::<ErrorPage>().copied() else {
        return response;
    };

    let nav = navigation::nav_links(&state).await.unwrap_or_else(|err| {
        warn!(error = %err, "menu unavailable on error page");
        NavLinks::new()
    });

    let rendered = match page {
        ErrorPage::NotFound => views::errors::not_found(&PageContext::new("Page Not Found", &session, nav)),
        ErrorPage::Internal => {
            views::errors::internal(&PageContext::new("Internal Server Error", &session, nav))
        }
    };

    match rendered {
        Ok(html) => (page.status(), html).into_response(),
        Err(_) => response,
    }
}
