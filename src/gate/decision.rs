//! The request-time access table. Rules are checked top to bottom and the
//! first match decides.

use super::paths::{self, LocalizedPath, PathClass};
use crate::session::{Role, Session, User};

/// Everything the gate looks at for one request.
#[derive(Clone, Debug)]
pub struct GateRequest<'a> {
    pub path: &'a LocalizedPath,
    pub token: Option<&'a str>,
    pub session: &'a Session,
}

/// Canonical destination of a redirect, before localization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Redirect {
    pub target: &'static str,
    /// Append `?redirect=<requested path>` so login can send the user back.
    pub remember: bool,
}

impl Redirect {
    const fn to(target: &'static str) -> Self {
        Self {
            target,
            remember: false,
        }
    }

    const fn remembering(target: &'static str) -> Self {
        Self {
            target,
            remember: true,
        }
    }

    /// Final `Location` value for the request that produced this redirect.
    #[must_use]
    pub fn location(&self, path: &LocalizedPath) -> String {
        if self.remember {
            path.localize_remembering(self.target)
        } else {
            path.localize(self.target)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(Redirect),
}

/// Landing page of a verified user.
#[must_use]
pub const fn home_for(role: Role) -> &'static str {
    match role {
        Role::Admin | Role::Employe => paths::ADMIN,
        Role::Client => paths::HOME,
    }
}

#[must_use]
pub fn evaluate(request: &GateRequest<'_>) -> GateDecision {
    let class = request.path.class();
    let session = request.session;
    let user = session.user.as_ref();

    if class == PathClass::VerifyAccount {
        return verify_account(session);
    }

    if !class.is_public() && user.is_some_and(|user| !user.is_account_verified) {
        return GateDecision::Redirect(Redirect::to(paths::VERIFY_ACCOUNT));
    }

    match class {
        PathClass::Admin => admin(request.token, user),
        PathClass::GuestOnly => match (request.token, user) {
            (Some(_), Some(user)) if user.is_account_verified => {
                GateDecision::Redirect(Redirect::to(home_for(user.role)))
            }
            _ => GateDecision::Allow,
        },
        PathClass::Public
        | PathClass::Client
        | PathClass::Other
        | PathClass::VerifyAccount => GateDecision::Allow,
    }
}

fn verify_account(session: &Session) -> GateDecision {
    if session.pending_verification_email.is_some() {
        return GateDecision::Allow;
    }
    match &session.user {
        Some(user) if !user.is_account_verified => GateDecision::Allow,
        Some(_) => GateDecision::Redirect(Redirect::to(paths::HOME)),
        None => GateDecision::Redirect(Redirect::to(paths::LOGIN)),
    }
}

fn admin(token: Option<&str>, user: Option<&User>) -> GateDecision {
    let (Some(_), Some(user)) = (token, user) else {
        return GateDecision::Redirect(Redirect::remembering(paths::LOGIN));
    };
    if !user.is_account_verified {
        return GateDecision::Redirect(Redirect::to(paths::VERIFY_ACCOUNT));
    }
    match user.role {
        Role::Admin | Role::Employe => GateDecision::Allow,
        Role::Client => GateDecision::Redirect(Redirect::to(paths::HOME)),
    }
}
