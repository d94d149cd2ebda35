//! Signed session cookie.
//!
//! The cookie carries only the opaque session token. The signature stops a
//! client from forging or altering a token; the session store decides
//! whether the token is live.

use actix_web::HttpRequest;
use actix_web::cookie::{Cookie, CookieJar, Key, SameSite, time};

use quill_core::domain::SessionToken;

use crate::config::{ConfigError, SessionSettings};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "quill_session";

const MIN_SECRET_LEN: usize = 32;

/// Issues, reads and clears the session cookie.
#[derive(Clone)]
pub struct SessionCookies {
    key: Key,
    secure: bool,
    max_age: time::Duration,
}

impl SessionCookies {
    pub fn new(settings: &SessionSettings) -> Result<Self, ConfigError> {
        if settings.secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakSessionSecret);
        }

        let max_age_secs = i64::try_from(settings.ttl.as_secs()).unwrap_or(i64::MAX);

        Ok(Self {
            key: Key::derive_from(settings.secret.as_bytes()),
            secure: settings.secure_cookie,
            max_age: time::Duration::seconds(max_age_secs),
        })
    }

    /// Signed cookie carrying `token`.
    pub fn issue(&self, token: &SessionToken) -> Cookie<'static> {
        let cookie = self.base(token.as_str().to_owned()).finish();

        let mut jar = CookieJar::new();
        jar.signed_mut(&self.key).add(cookie.clone());
        jar.get(SESSION_COOKIE).cloned().unwrap_or(cookie)
    }

    /// Token from the request's cookie, if present and correctly signed.
    pub fn read(&self, req: &HttpRequest) -> Option<SessionToken> {
        let raw = req.cookie(SESSION_COOKIE)?;

        let mut jar = CookieJar::new();
        jar.add_original(raw);

        match jar.signed(&self.key).get(SESSION_COOKIE) {
            Some(cookie) => Some(SessionToken::from(cookie.value().to_owned())),
            None => {
                tracing::warn!("Session cookie failed signature check");
                None
            }
        }
    }

    /// Cookie that makes the client drop its session cookie.
    pub fn removal(&self) -> Cookie<'static> {
        let mut cookie = self.base(String::new()).finish();
        cookie.make_removal();
        cookie
    }

    fn base(&self, value: String) -> actix_web::cookie::CookieBuilder<'static> {
        Cookie::build(SESSION_COOKIE, value)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(self.max_age)
    }
}
