use super::{mirror, parse_session_cookie, STATE_COOKIE_NAME, TOKEN_COOKIE_NAME};
use crate::session::Session;
use axum::http::{header::COOKIE, HeaderMap};
use tracing::warn;

/// The mirrored cookies as they arrive on a request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestCookies {
    token: Option<String>,
    state: Option<String>,
}

impl RequestCookies {
    /// Collect the mirrored cookies from every `Cookie` header on the request.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut cookies = Self::default();
        for value in headers.get_all(COOKIE) {
            let Ok(value) = value.to_str() else {
                continue;
            };
            cookies.absorb(value);
        }
        cookies
    }

    /// Parse a single `Cookie` header value.
    #[must_use]
    pub fn parse(header: &str) -> Self {
        let mut cookies = Self::default();
        cookies.absorb(header);
        cookies
    }

    fn absorb(&mut self, header: &str) {
        for pair in header.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                TOKEN_COOKIE_NAME if !value.is_empty() => {
                    self.token = mirror::decode_value(value)
                        .ok()
                        .filter(|token| !token.is_empty());
                }
                STATE_COOKIE_NAME if !value.is_empty() => {
                    self.state = Some(value.to_string());
                }
                _ => {}
            }
        }
    }

    /// Session read from `auth-storage`. A malformed cookie is logged and
    /// read as anonymous, the same as a missing one.
    #[must_use]
    pub fn session(&self) -> Session {
        let Some(raw) = self.state.as_deref() else {
            return Session::anonymous();
        };
        match parse_session_cookie(raw) {
            Ok(session) => session,
            Err(err) => {
                warn!("Ignoring unreadable {STATE_COOKIE_NAME} cookie: {err}");
                Session::anonymous()
            }
        }
    }

    /// Session as the gate sees it: the state cookie, with the token cookie
    /// taking precedence over any token carried inside the state.
    #[must_use]
    pub fn resolved_session(&self) -> Session {
        let mut session = self.session();
        if let Some(token) = &self.token {
            session.access_token = Some(token.clone());
        }
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn picks_mirrored_cookies_among_others() {
        let cookies = RequestCookies::parse(
            "theme=dark; auth-token=abc; auth-storage=%7B%22state%22%3A%7B%7D%7D; lang=fr",
        );
        assert_eq!(
            cookies.resolved_session().access_token.as_deref(),
            Some("abc")
        );
        assert_eq!(cookies.session(), Session::anonymous());
    }

    #[test]
    fn token_cookie_is_percent_decoded() {
        let cookies = RequestCookies::parse("auth-token=a%3Bb%20c%25");
        assert_eq!(
            cookies.resolved_session().access_token.as_deref(),
            Some("a;b c%")
        );
    }

    #[test]
    fn empty_values_are_absent() {
        let cookies = RequestCookies::parse("auth-token=; auth-storage=");
        assert_eq!(cookies, RequestCookies::default());
        assert_eq!(cookies.session(), Session::anonymous());
    }

    #[test]
    fn malformed_and_missing_state_collapse_to_anonymous() {
        let malformed = RequestCookies::parse("auth-storage=%7Bnot-json");
        let missing = RequestCookies::parse("other=1");
        assert_eq!(malformed.session(), Session::anonymous());
        assert_eq!(missing.session(), Session::anonymous());
    }

    #[test]
    fn reads_every_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("auth-token=one"));
        headers.append(
            COOKIE,
            HeaderValue::from_static(
                "auth-storage=%7B%22state%22%3A%7B%22pendingVerificationEmail%22%3A%22a%40b.com%22%7D%7D",
            ),
        );
        let cookies = RequestCookies::from_headers(&headers);
        assert_eq!(
            cookies.resolved_session().access_token.as_deref(),
            Some("one")
        );
        assert_eq!(
            cookies.session().pending_verification_email.as_deref(),
            Some("a@b.com")
        );
    }

    #[test]
    fn token_cookie_wins_over_state_token() {
        let state = "%7B%22state%22%3A%7B%22accessToken%22%3A%22from-state%22%7D%7D";
        let both = RequestCookies::parse(&format!("auth-storage={state}; auth-token=from-cookie"));
        assert_eq!(
            both.resolved_session().access_token.as_deref(),
            Some("from-cookie")
        );

        let state_only = RequestCookies::parse(&format!("auth-storage={state}"));
        assert_eq!(
            state_only.resolved_session().access_token.as_deref(),
            Some("from-state")
        );
    }
}
