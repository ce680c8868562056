//! Cookie-backed session: the logged-in username plus pending flash notices.

/// Signing and verification of the session cookie.
pub mod cookie;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{HeaderValue, Request, header::SET_COOKIE, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{error::AppError, state::SharedState};

pub use cookie::SessionKey;

/// Username with access to user management.
pub const ADMIN_USERNAME: &str = "admin";

/// Serialized content of the session cookie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// Logged-in username, absent for visitors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Notices waiting to be shown on the next rendered page.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flashes: Vec<String>,
}

impl SessionData {
    /// True when there is nothing worth storing.
    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.flashes.is_empty()
    }
}

/// Request-scoped handle on the session, shared between middleware and handler.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<Mutex<SessionState>>,
}

#[derive(Debug, Default)]
struct SessionState {
    data: SessionData,
    changed: bool,
}

impl Session {
    /// Wrap data loaded from the request cookie.
    pub fn new(data: SessionData) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionState {
                data,
                changed: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Logged-in username.
    pub fn user(&self) -> Option<String> {
        self.lock().data.user.clone()
    }

    /// Whether the session belongs to the admin account.
    pub fn is_admin(&self) -> bool {
        self.lock().data.user.as_deref() == Some(ADMIN_USERNAME)
    }

    /// Record `username` as the session identity.
    pub fn log_in(&self, username: impl Into<String>) {
        let mut state = self.lock();
        state.data.user = Some(username.into());
        state.changed = true;
    }

    /// Clear the session identity, returning the previous one.
    pub fn log_out(&self) -> Option<String> {
        let mut state = self.lock();
        state.changed = true;
        state.data.user.take()
    }

    /// Queue a notice for the next rendered page.
    pub fn flash(&self, message: impl Into<String>) {
        let mut state = self.lock();
        state.data.flashes.push(message.into());
        state.changed = true;
    }

    /// Drain the queued notices.
    pub fn take_flashes(&self) -> Vec<String> {
        let mut state = self.lock();
        if state.data.flashes.is_empty() {
            return Vec::new();
        }
        state.changed = true;
        std::mem::take(&mut state.data.flashes)
    }

    /// Snapshot of the data when it changed during the request.
    fn changed_data(&self) -> Option<SessionData> {
        let state = self.lock();
        state.changed.then(|| state.data.clone())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer is not installed".into()))
    }
}

/// Load the session from its cookie before the handler runs and write it back
/// when the handler changed it.
pub async fn session_layer(
    State(state): State<SharedState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let key = state.session_key();
    let data = cookie::find_session_cookie(req.headers())
        .and_then(|value| {
            let opened = key.open(value);
            if opened.is_none() {
                debug!("ignoring session cookie with invalid signature");
            }
            opened
        })
        .unwrap_or_default();

    let session = Session::new(data);
    req.extensions_mut().insert(session.clone());

    let mut response = next.run(req).await;

    if let Some(data) = session.changed_data() {
        match key
            .set_cookie(&data)
            .map_err(|err| err.to_string())
            .and_then(|value| HeaderValue::from_str(&value).map_err(|err| err.to_string()))
        {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(error) => warn!(%error, "failed to write session cookie"),
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_session_is_not_rewritten() {
        let session = Session::new(SessionData {
            user: Some("alice".into()),
            flashes: Vec::new(),
        });
        assert_eq!(session.user().as_deref(), Some("alice"));
        assert!(session.take_flashes().is_empty());
        assert_eq!(session.changed_data(), None);
    }

    #[test]
    fn flashes_drain_once() {
        let session = Session::default();
        session.flash("one");
        session.flash("two");
        assert_eq!(session.take_flashes(), vec!["one", "two"]);
        assert!(session.take_flashes().is_empty());
        assert_eq!(session.changed_data(), Some(SessionData::default()));
    }

    #[test]
    fn admin_is_the_literal_username() {
        let session = Session::default();
        assert!(!session.is_admin());
        session.log_in("Admin");
        assert!(!session.is_admin());
        session.log_in(ADMIN_USERNAME);
        assert!(session.is_admin());
        assert_eq!(session.log_out().as_deref(), Some(ADMIN_USERNAME));
        assert!(!session.is_admin());
    }
}
