//! Signing and parsing of the `session` cookie.
//!
//! The cookie value is `base64url(json) "." base64url(hmac_sha256(base64url(json)))`.

use axum::http::{HeaderMap, header::COOKIE};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac, digest::InvalidLength};
use sha2::Sha256;

use super::SessionData;

type HmacSha256 = Hmac<Sha256>;

/// Name of the cookie carrying the session.
pub const SESSION_COOKIE: &str = "session";
const COOKIE_ATTRIBUTES: &str = "Path=/; HttpOnly; SameSite=Lax";

/// Keyed signer for session cookies.
#[derive(Clone)]
pub struct SessionKey {
    mac: HmacSha256,
}

impl SessionKey {
    /// Build a signer from the configured secret.
    pub fn new(secret: &[u8]) -> Result<Self, InvalidLength> {
        Ok(Self {
            mac: HmacSha256::new_from_slice(secret)?,
        })
    }

    /// Serialize and sign `data` into a cookie value.
    pub fn seal(&self, data: &SessionData) -> Result<String, serde_json::Error> {
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(data)?);
        let signature = self.signature(&payload);
        Ok(format!("{payload}.{}", URL_SAFE_NO_PAD.encode(signature)))
    }

    /// Verify and deserialize a cookie value. Tampered or malformed values yield `None`.
    pub fn open(&self, value: &str) -> Option<SessionData> {
        let (payload, signature) = value.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        serde_json::from_slice(&json).ok()
    }

    /// Full `Set-Cookie` header value storing `data`, or expiring the cookie when
    /// there is nothing to keep.
    pub fn set_cookie(&self, data: &SessionData) -> Result<String, serde_json::Error> {
        if data.is_empty() {
            return Ok(format!("{SESSION_COOKIE}=; Max-Age=0; {COOKIE_ATTRIBUTES}"));
        }
        Ok(format!(
            "{SESSION_COOKIE}={}; {COOKIE_ATTRIBUTES}",
            self.seal(data)?
        ))
    }

    fn signature(&self, payload: &str) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

/// Raw value of the session cookie among the request's `Cookie` headers.
pub fn find_session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|header| header.split(';'))
        .find_map(|cookie| {
            cookie
                .trim()
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        })
}
