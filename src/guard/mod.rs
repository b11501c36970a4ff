//! Render-time route guard.
//!
//! The gate only runs on navigation. Pages re-check the live session with the
//! same precedence so an in-page session change (logout, verification, a 401)
//! is reflected before the next full request.

use crate::gate::{
    home_for,
    paths::{self, LocalizedPath},
};
use crate::session::{Session, SessionPhase};

/// What a page requires of the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    Authenticated,
    Admin,
    /// Only sessions waiting for account verification.
    UnverifiedOnly,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardOutcome {
    Render,
    /// Navigate to this localized location instead.
    Redirect(String),
}

impl GuardOutcome {
    #[must_use]
    pub fn is_render(&self) -> bool {
        matches!(self, Self::Render)
    }
}

#[must_use]
pub fn evaluate(access: RouteAccess, session: &Session, path: &LocalizedPath) -> GuardOutcome {
    if access == RouteAccess::UnverifiedOnly {
        if session.needs_verification() {
            return GuardOutcome::Render;
        }
        let target = if session.user.is_some() {
            paths::HOME
        } else {
            paths::LOGIN
        };
        return GuardOutcome::Redirect(path.localize(target));
    }

    if access != RouteAccess::Public && session.phase() == SessionPhase::Unverified {
        return GuardOutcome::Redirect(path.localize(paths::VERIFY_ACCOUNT));
    }

    match access {
        RouteAccess::Public | RouteAccess::UnverifiedOnly => GuardOutcome::Render,
        RouteAccess::Authenticated => {
            if session.is_authenticated() {
                GuardOutcome::Render
            } else {
                GuardOutcome::Redirect(path.localize_remembering(paths::LOGIN))
            }
        }
        RouteAccess::Admin => {
            if !session.is_authenticated() {
                return GuardOutcome::Redirect(path.localize_remembering(paths::LOGIN));
            }
            match session.phase() {
                SessionPhase::Verified(role) if role.is_staff() => GuardOutcome::Render,
                SessionPhase::Verified(_) => GuardOutcome::Redirect(path.localize(paths::HOME)),
                SessionPhase::Anonymous | SessionPhase::Unverified => {
                    GuardOutcome::Redirect(path.localize(paths::VERIFY_ACCOUNT))
                }
            }
        }
    }
}

/// Guard for login/register pages: a signed-in, verified user is sent to
/// their landing page, unless the URL names where to go after sign-in.
#[must_use]
pub fn guest_only(
    session: &Session,
    path: &LocalizedPath,
    redirect_param: Option<&str>,
) -> GuardOutcome {
    if redirect_param.is_some_and(|target| !target.trim().is_empty()) {
        return GuardOutcome::Render;
    }
    match session.phase() {
        SessionPhase::Verified(role) if session.is_authenticated() => {
            GuardOutcome::Redirect(path.localize(home_for(role)))
        }
        _ => GuardOutcome::Render,
    }
}

/// Inputs the guard outcome depends on.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Observed {
    phase: SessionPhase,
    authenticated: bool,
    needs_verification: bool,
    path: String,
}

/// Re-evaluates a page's guard only when the session predicates or the path
/// change, the way a render effect re-runs on its dependencies.
#[derive(Clone, Debug)]
pub struct RouteGuard {
    access: RouteAccess,
    last: Option<Observed>,
}

impl RouteGuard {
    #[must_use]
    pub fn new(access: RouteAccess) -> Self {
        Self { access, last: None }
    }

    #[must_use]
    pub fn access(&self) -> RouteAccess {
        self.access
    }

    /// `Some(outcome)` when an input changed since the last call.
    pub fn observe(&mut self, session: &Session, path: &LocalizedPath) -> Option<GuardOutcome> {
        let observed = Observed {
            phase: session.phase(),
            authenticated: session.is_authenticated(),
            needs_verification: session.needs_verification(),
            path: path.original().to_string(),
        };
        if self.last.as_ref() == Some(&observed) {
            return None;
        }
        self.last = Some(observed);
        Some(evaluate(self.access, session, path))
    }
}
