//! Session and user records as the backend returns them and as they are
//! mirrored into the `auth-storage` cookie. Field names are camelCase on the
//! wire so the cookie stays readable by any other consumer of the same state.

use serde::{Deserialize, Serialize};

/// Account role. Anything outside these three is rejected on deserialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Client,
    Admin,
    Employe,
}

impl Role {
    /// Staff roles may enter the admin section.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        match self {
            Self::Admin | Self::Employe => true,
            Self::Client => false,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "CLIENT",
            Self::Admin => "ADMIN",
            Self::Employe => "EMPLOYE",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub is_account_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Where a session stands in `Anonymous -> Unverified -> Verified`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    Anonymous,
    Unverified,
    Verified(Role),
}

/// Authentication snapshot held by the store and mirrored into cookies.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub pending_verification_email: Option<String>,
}

impl Session {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Token and user are both present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.user.is_some()
    }

    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.user.as_ref().is_some_and(|user| user.is_account_verified)
    }

    /// A pending email is enough; a signed-in unverified user also counts.
    #[must_use]
    pub fn needs_verification(&self) -> bool {
        self.pending_verification_email.is_some()
            || self
                .user
                .as_ref()
                .is_some_and(|user| !user.is_account_verified)
    }

    /// Membership test against the user's role; false without a user.
    #[must_use]
    pub fn has_role(&self, roles: &[Role]) -> bool {
        self.user
            .as_ref()
            .is_some_and(|user| roles.contains(&user.role))
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match &self.user {
            None => SessionPhase::Anonymous,
            Some(user) if user.is_account_verified => SessionPhase::Verified(user.role),
            Some(_) => SessionPhase::Unverified,
        }
    }

    /// A verified user never keeps a pending verification email.
    pub(crate) fn normalize(&mut self) {
        if self.is_verified() {
            self.pending_verification_email = None;
        }
    }
}
