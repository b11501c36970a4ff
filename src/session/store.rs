use super::types::{Role, Session, User};
use crate::cookies::{CookiePolicy, CookieSink, CookieSync};
use tracing::debug;

/// Single authority for the signed-in session.
///
/// The store is an explicit value handed to whoever needs it; every mutation
/// is applied in memory first and then mirrored through its [`CookieSync`].
#[derive(Debug)]
pub struct SessionStore<S> {
    session: Session,
    sync: CookieSync<S>,
}

impl<S: CookieSink> SessionStore<S> {
    /// Empty store; nothing is mirrored until the first mutation.
    pub fn new(sink: S) -> Self {
        Self::with_policy(sink, CookiePolicy::default())
    }

    pub fn with_policy(sink: S, policy: CookiePolicy) -> Self {
        Self {
            session: Session::anonymous(),
            sync: CookieSync::new(sink, policy),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn snapshot(&self) -> Session {
        self.session.clone()
    }

    /// Replace the whole session, e.g. when restoring from a mirrored cookie.
    pub fn hydrate(&mut self, session: Session) {
        self.session = session;
        self.commit();
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.session.access_token = token;
        self.commit();
    }

    pub fn set_user(&mut self, user: Option<User>) {
        self.session.user = user;
        self.commit();
    }

    /// Sign in. An unverified user leaves their email pending verification.
    pub fn set_auth(&mut self, token: String, user: User) {
        self.session.pending_verification_email =
            (!user.is_account_verified).then(|| user.email.clone());
        self.session.access_token = Some(token);
        self.session.user = Some(user);
        self.commit();
    }

    pub fn set_pending_verification_email(&mut self, email: String) {
        self.session.pending_verification_email = Some(email);
        self.commit();
    }

    pub fn clear_pending_verification(&mut self) {
        self.session.pending_verification_email = None;
        self.commit();
    }

    /// Patch the current user's verification flag; no-op without a user.
    pub fn update_user_verification_status(&mut self, verified: bool) {
        let Some(user) = self.session.user.as_mut() else {
            debug!("Verification status update ignored: no user in session");
            return;
        };
        user.is_account_verified = verified;
        self.session.pending_verification_email = (!verified).then(|| user.email.clone());
        self.commit();
    }

    /// Forget everything and clear both mirrored cookies.
    pub fn logout(&mut self) {
        self.session = Session::anonymous();
        self.sync.clear();
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn is_verified(&self) -> bool {
        self.session.is_verified()
    }

    pub fn needs_verification(&self) -> bool {
        self.session.needs_verification()
    }

    pub fn has_role(&self, roles: &[Role]) -> bool {
        self.session.has_role(roles)
    }

    pub fn has_any_role(&self, role: Role) -> bool {
        self.session.has_role(&[role])
    }

    fn commit(&mut self) {
        self.session.normalize();
        self.sync.mirror(&self.session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::{
        parse_session_cookie, CookieJar, DEFAULT_MAX_AGE_SECONDS, STATE_COOKIE_NAME,
        TOKEN_COOKIE_NAME,
    };

    fn user(role: Role, verified: bool) -> User {
        User {
            id: "7".to_string(),
            name: "Yanis".to_string(),
            email: "yanis@example.com".to_string(),
            role,
            is_account_verified: verified,
            created_at: Some("2024-01-01T00:00:00Z".to_string()),
            updated_at: None,
        }
    }

    fn store() -> (SessionStore<CookieJar>, CookieJar) {
        let jar = CookieJar::new();
        (SessionStore::new(jar.clone()), jar)
    }

    fn mirrored(jar: &CookieJar) -> Option<Session> {
        jar.get(STATE_COOKIE_NAME)
            .and_then(|raw| parse_session_cookie(&raw).ok())
    }

    #[test]
    fn starts_empty_and_unmirrored() {
        let (store, jar) = store();
        assert_eq!(store.session(), &Session::anonymous());
        assert!(jar.writes().is_empty());
    }

    #[test]
    fn set_auth_with_verified_user() {
        let (mut store, jar) = store();
        store.set_auth("tok".to_string(), user(Role::Client, true));

        assert!(store.is_authenticated());
        assert!(store.is_verified());
        assert!(!store.needs_verification());
        assert_eq!(store.session().pending_verification_email, None);
        assert_eq!(jar.get(TOKEN_COOKIE_NAME).as_deref(), Some("tok"));
        assert_eq!(mirrored(&jar), Some(store.snapshot()));
    }

    #[test]
    fn set_auth_with_unverified_user_sets_pending_email() {
        let (mut store, _jar) = store();
        store.set_auth("tok".to_string(), user(Role::Client, false));

        assert!(store.needs_verification());
        assert_eq!(
            store.session().pending_verification_email.as_deref(),
            Some("yanis@example.com")
        );
    }

    #[test]
    fn set_auth_mirrors_once_per_cookie() {
        let (mut store, jar) = store();
        store.set_auth("tok".to_string(), user(Role::Admin, true));
        assert_eq!(jar.writes().len(), 2);
    }

    #[test]
    fn verification_true_clears_pending_email() {
        let (mut store, jar) = store();
        store.set_auth("tok".to_string(), user(Role::Client, false));
        store.update_user_verification_status(true);

        assert!(store.is_verified());
        assert_eq!(store.session().pending_verification_email, None);
        assert_eq!(
            mirrored(&jar).and_then(|s| s.user).map(|u| u.is_account_verified),
            Some(true)
        );
    }

    #[test]
    fn verification_false_sets_pending_email() {
        let (mut store, _jar) = store();
        store.set_auth("tok".to_string(), user(Role::Client, true));
        store.update_user_verification_status(false);

        assert_eq!(
            store.session().pending_verification_email.as_deref(),
            Some("yanis@example.com")
        );
    }

    #[test]
    fn verification_update_without_user_is_a_noop() {
        let (mut store, jar) = store();
        store.set_pending_verification_email("a@b.com".to_string());
        let writes = jar.writes().len();

        store.update_user_verification_status(true);

        assert_eq!(
            store.session().pending_verification_email.as_deref(),
            Some("a@b.com")
        );
        assert_eq!(jar.writes().len(), writes);
    }

    #[test]
    fn verified_user_drops_pending_email() {
        let (mut store, _jar) = store();
        store.set_pending_verification_email("old@example.com".to_string());
        store.set_user(Some(user(Role::Client, true)));
        assert_eq!(store.session().pending_verification_email, None);
    }

    #[test]
    fn pending_email_cannot_coexist_with_verified_user() {
        let (mut store, _jar) = store();
        store.set_user(Some(user(Role::Client, true)));
        store.set_pending_verification_email("other@example.com".to_string());
        assert_eq!(store.session().pending_verification_email, None);
    }

    #[test]
    fn clear_pending_verification() {
        let (mut store, jar) = store();
        store.set_pending_verification_email("a@b.com".to_string());
        store.clear_pending_verification();
        assert!(!store.needs_verification());
        assert_eq!(
            mirrored(&jar).map(|s| s.pending_verification_email),
            Some(None)
        );
    }

    #[test]
    fn token_without_user_is_not_authenticated() {
        let (mut store, jar) = store();
        store.set_token(Some("tok".to_string()));
        assert!(!store.is_authenticated());
        assert_eq!(jar.get(TOKEN_COOKIE_NAME).as_deref(), Some("tok"));

        store.set_token(None);
        assert_eq!(
            jar.last_write(TOKEN_COOKIE_NAME).map(|w| w.max_age_seconds),
            Some(0)
        );
    }

    #[test]
    fn logout_clears_everything() {
        let (mut store, jar) = store();
        store.set_auth("tok".to_string(), user(Role::Employe, false));
        store.logout();

        assert!(!store.is_authenticated());
        assert!(!store.needs_verification());
        assert_eq!(store.session(), &Session::anonymous());
        assert_eq!(
            jar.last_write(TOKEN_COOKIE_NAME).map(|w| w.max_age_seconds),
            Some(0)
        );
        assert_eq!(
            jar.last_write(STATE_COOKIE_NAME).map(|w| w.max_age_seconds),
            Some(0)
        );
        assert_eq!(jar.cookie_header(), None);
    }

    #[test]
    fn has_role_checks_membership() {
        let (mut store, _jar) = store();
        assert!(!store.has_any_role(Role::Client));

        store.set_auth("tok".to_string(), user(Role::Employe, true));
        assert!(store.has_role(&[Role::Admin, Role::Employe]));
        assert!(!store.has_role(&[Role::Client]));
        assert!(store.has_any_role(Role::Employe));
    }

    #[test]
    fn hydrate_restores_and_mirrors() {
        let (mut store, jar) = store();
        let session = Session {
            access_token: Some("tok".to_string()),
            user: Some(user(Role::Admin, true)),
            pending_verification_email: None,
        };
        store.hydrate(session.clone());
        assert_eq!(store.snapshot(), session);
        assert_eq!(mirrored(&jar), Some(session));
        assert_eq!(
            jar.last_write(STATE_COOKIE_NAME).map(|w| w.max_age_seconds),
            Some(DEFAULT_MAX_AGE_SECONDS)
        );
    }

    #[test]
    fn borrowed_sink_is_accepted() {
        let jar = CookieJar::new();
        let mut store = SessionStore::new(&jar);
        store.set_token(Some("tok".to_string()));
        assert_eq!(jar.get(TOKEN_COOKIE_NAME).as_deref(), Some("tok"));
    }
}
