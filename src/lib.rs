//! # Vestibule (session persistence and route gating)
//!
//! `vestibule` decides who may see which page of a multilingual services site.
//!
//! ## Session
//!
//! A [`session::SessionStore`] holds the access token, the signed-in user and
//! the email waiting for verification. Every mutation is mirrored into two
//! cookies so the request-time gate can read it:
//!
//! - `auth-storage`: the URL-encoded JSON snapshot `{"state":{..}}`.
//! - `auth-token`: the bearer token, URL-encoded the same way.
//!
//! Both use `Path=/`, `SameSite=Lax` and a 30 day max-age. Logging out clears
//! both with a zero max-age.
//!
//! ## Gate and guard
//!
//! The [`gate`] middleware runs before every page request. It strips the locale
//! prefix, classifies the path and answers with a `307` to the login, verify,
//! home or admin page when the session does not fit. The first matching rule
//! wins:
//!
//! 1. Unverified users stay on `/verify-account`; anyone else is sent away from it.
//! 2. Unverified users are sent to `/verify-account` from any non-public page.
//! 3. `/admin` requires a verified `ADMIN` or `EMPLOYE`.
//! 4. Signed-in verified users skip the login and registration pages.
//!
//! The [`guard`] re-checks the same predicates when a page renders.
//!
//! ## Backend
//!
//! [`client::ApiClient`] talks to the backend auth API and keeps the store in
//! step with what it answers. A `401` ends the session unless the visitor is
//! on a public page.

pub mod cli;
pub mod client;
pub mod cookies;
pub mod gate;
pub mod guard;
pub mod session;
pub mod site;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
