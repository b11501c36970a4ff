//! Cookie mirror of the session store.
//!
//! Request-time code cannot read the client's persisted store, so every
//! session mutation is projected into two cookies: `auth-storage` carries the
//! JSON state and `auth-token` carries the bearer token. Both values are
//! percent-encoded as `encodeURIComponent` would; a JWT passes through
//! unchanged. Writes are best effort and unacknowledged; the last write for a
//! name wins.

mod jar;
mod mirror;
mod request;

pub use self::jar::{CookieJar, MAX_PENDING_WRITES};
pub use self::mirror::{encode_session_cookie, parse_session_cookie, MirroredState, ParseError};
pub use self::request::RequestCookies;

use crate::session::Session;
use tracing::error;

pub const STATE_COOKIE_NAME: &str = "auth-storage";
pub const TOKEN_COOKIE_NAME: &str = "auth-token";

/// Thirty days.
pub const DEFAULT_MAX_AGE_SECONDS: u64 = 60 * 60 * 24 * 30;

/// Attributes shared by both mirrored cookies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CookiePolicy {
    pub max_age_seconds: u64,
    pub secure: bool,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self {
            max_age_seconds: DEFAULT_MAX_AGE_SECONDS,
            secure: false,
        }
    }
}

impl CookiePolicy {
    #[must_use]
    pub fn with_max_age_seconds(mut self, seconds: u64) -> Self {
        self.max_age_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }
}

/// A single cookie write. `max_age_seconds == 0` clears the cookie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CookieWrite {
    pub name: &'static str,
    pub value: String,
    pub max_age_seconds: u64,
    pub secure: bool,
}

impl CookieWrite {
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.max_age_seconds == 0
    }

    /// Render as a `Set-Cookie` header value.
    #[must_use]
    pub fn to_header_value(&self) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; SameSite=Lax; Max-Age={}",
            self.name, self.value, self.max_age_seconds
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Destination of cookie writes. Fire and forget: no result, no retry.
pub trait CookieSink {
    fn write(&self, cookie: CookieWrite);
}

impl<T: CookieSink + ?Sized> CookieSink for &T {
    fn write(&self, cookie: CookieWrite) {
        (**self).write(cookie);
    }
}

/// Projects session mutations into the two mirrored cookies.
#[derive(Clone, Debug)]
pub struct CookieSync<S> {
    sink: S,
    policy: CookiePolicy,
}

impl<S: CookieSink> CookieSync<S> {
    pub fn new(sink: S, policy: CookiePolicy) -> Self {
        Self { sink, policy }
    }

    /// Mirror the full session, clearing the token cookie when no token is held.
    pub fn mirror(&self, session: &Session) {
        match encode_session_cookie(session) {
            Ok(value) => self.sink.write(self.cookie(STATE_COOKIE_NAME, value)),
            // Keep the previous state cookie rather than writing a broken one.
            Err(err) => error!("Failed to encode session cookie: {err}"),
        }

        let token = match &session.access_token {
            Some(token) => self.cookie(TOKEN_COOKIE_NAME, mirror::encode_value(token)),
            None => self.cleared(TOKEN_COOKIE_NAME),
        };
        self.sink.write(token);
    }

    /// Clear both cookies.
    pub fn clear(&self) {
        self.sink.write(self.cleared(STATE_COOKIE_NAME));
        self.sink.write(self.cleared(TOKEN_COOKIE_NAME));
    }

    fn cookie(&self, name: &'static str, value: String) -> CookieWrite {
        CookieWrite {
            name,
            value,
            max_age_seconds: self.policy.max_age_seconds,
            secure: self.policy.secure,
        }
    }

    fn cleared(&self, name: &'static str) -> CookieWrite {
        CookieWrite {
            name,
            value: String::new(),
            max_age_seconds: 0,
            secure: self.policy.secure,
        }
    }
}
