//! Route surface: canonical paths, locale prefixes and path classes.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::{fmt, str::FromStr};

pub const HOME: &str = "/";
pub const LOGIN: &str = "/login";
pub const REGISTER: &str = "/register";
pub const FORGOT_PASSWORD: &str = "/forgot-password";
pub const RESET_PASSWORD: &str = "/reset-password";
pub const VERIFY_ACCOUNT: &str = "/verify-account";
pub const ADMIN: &str = "/admin";
pub const APPOINTMENTS: &str = "/appointments";
pub const MESSAGES: &str = "/messages";

/// Query parameter carrying the page a visitor was sent away from.
pub const REDIRECT_PARAM: &str = "redirect";

/// Marketing pages open to everyone; matched exactly.
const PUBLIC_PAGES: [&str; 5] = [HOME, "/about", "/services", "/contact", "/blog"];
/// Public sections whose sub-pages are public too.
const PUBLIC_SECTIONS: [&str; 2] = ["/blog", "/services"];
const GUEST_ONLY: [&str; 3] = [LOGIN, REGISTER, FORGOT_PASSWORD];
const CLIENT_SECTIONS: [&str; 2] = [APPOINTMENTS, MESSAGES];
/// Request prefixes never seen by the gate.
const UNGATED_PREFIXES: [&str; 4] = ["/api", "/_next", "/static", "/health"];

/// Keeps `/` readable in `?redirect=` while escaping query delimiters.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?');

/// Supported locales; the first one is the default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Locales(Vec<String>);

impl Default for Locales {
    fn default() -> Self {
        Self(vec!["fr".to_string(), "en".to_string()])
    }
}

impl Locales {
    /// Build from a list, dropping blanks and duplicates. Falls back to the
    /// defaults when nothing usable is left.
    #[must_use]
    pub fn new<I, T>(locales: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut list: Vec<String> = Vec::new();
        for locale in locales {
            let locale = locale.as_ref().trim().to_ascii_lowercase();
            if !locale.is_empty() && !list.contains(&locale) {
                list.push(locale);
            }
        }
        if list.is_empty() {
            Self::default()
        } else {
            Self(list)
        }
    }

    #[must_use]
    pub fn default_locale(&self) -> &str {
        self.0.first().map_or("fr", String::as_str)
    }

    #[must_use]
    pub fn contains(&self, candidate: &str) -> bool {
        self.0.iter().any(|locale| locale == candidate)
    }
}

impl FromStr for Locales {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        if let Some(bad) = parts.iter().find(|part| {
            !part.is_empty() && !part.chars().all(|c| c.is_ascii_alphabetic() || c == '-')
        }) {
            return Err(format!("invalid locale: {bad}"));
        }
        Ok(Self::new(parts))
    }
}

impl fmt::Display for Locales {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}

/// A request path split into its optional locale prefix and the canonical
/// path the access rules are written against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalizedPath {
    original: String,
    locale: Option<String>,
    canonical: String,
}

impl LocalizedPath {
    #[must_use]
    pub fn parse(path: &str, locales: &Locales) -> Self {
        let original = if path.is_empty() { HOME } else { path };
        let trimmed = original.trim_start_matches('/');
        let (first, rest) = trimmed.split_once('/').unwrap_or((trimmed, ""));

        let (locale, canonical) = if locales.contains(first) {
            (Some(first.to_string()), format!("/{rest}"))
        } else {
            (None, format!("/{trimmed}"))
        };

        // "/fr/about/" and "/fr/about" are the same page.
        let canonical = if canonical.len() > 1 {
            canonical.trim_end_matches('/').to_string()
        } else {
            canonical
        };

        Self {
            original: original.to_string(),
            locale,
            canonical,
        }
    }

    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    #[must_use]
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    #[must_use]
    pub fn class(&self) -> PathClass {
        PathClass::of(&self.canonical)
    }

    /// Prefix a canonical target with this request's locale, if it had one.
    #[must_use]
    pub fn localize(&self, target: &str) -> String {
        localize(self.locale(), target)
    }

    /// Localized `target?redirect=<original path>`.
    #[must_use]
    pub fn localize_remembering(&self, target: &str) -> String {
        format!(
            "{}?{REDIRECT_PARAM}={}",
            self.localize(target),
            utf8_percent_encode(&self.original, QUERY_VALUE)
        )
    }
}

#[must_use]
pub fn localize(locale: Option<&str>, target: &str) -> String {
    match locale {
        Some(locale) if target == HOME => format!("/{locale}"),
        Some(locale) => format!("/{locale}{target}"),
        None => target.to_string(),
    }
}

/// Access-relevant classification of a canonical path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathClass {
    VerifyAccount,
    Admin,
    /// Login, register, forgot-password.
    GuestOnly,
    Public,
    /// Appointments and messages of a signed-in client.
    Client,
    Other,
}

impl PathClass {
    #[must_use]
    pub fn of(canonical: &str) -> Self {
        if in_section(canonical, VERIFY_ACCOUNT) {
            Self::VerifyAccount
        } else if in_section(canonical, ADMIN) {
            Self::Admin
        } else if GUEST_ONLY.contains(&canonical) {
            Self::GuestOnly
        } else if CLIENT_SECTIONS
            .iter()
            .any(|section| in_section(canonical, section))
        {
            Self::Client
        } else if canonical == RESET_PASSWORD
            || PUBLIC_PAGES.contains(&canonical)
            || PUBLIC_SECTIONS
                .iter()
                .any(|section| in_section(canonical, section))
        {
            Self::Public
        } else {
            Self::Other
        }
    }

    /// Pages an unverified user may still open.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::VerifyAccount | Self::GuestOnly | Self::Public)
    }
}

/// `path` is `section` itself or below it.
fn in_section(path: &str, section: &str) -> bool {
    path == section
        || path
            .strip_prefix(section)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Whether a request path goes through the gate at all. API calls, build
/// assets, health checks and anything that looks like a file do not.
#[must_use]
pub fn should_gate(path: &str) -> bool {
    if UNGATED_PREFIXES
        .iter()
        .any(|prefix| in_section(path, prefix))
    {
        return false;
    }
    let last = path.rsplit('/').next().unwrap_or_default();
    !last.contains('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_known_locale() {
        let locales = Locales::default();
        let path = LocalizedPath::parse("/fr/admin/users", &locales);
        assert_eq!(path.locale(), Some("fr"));
        assert_eq!(path.canonical(), "/admin/users");
        assert_eq!(path.original(), "/fr/admin/users");
    }

    #[test]
    fn locale_root_is_home() {
        let locales = Locales::default();
        for raw in ["/en", "/en/"] {
            let path = LocalizedPath::parse(raw, &locales);
            assert_eq!(path.locale(), Some("en"));
            assert_eq!(path.canonical(), HOME);
        }
    }

    #[test]
    fn unknown_first_segment_is_not_a_locale() {
        let path = LocalizedPath::parse("/de/admin", &Locales::default());
        assert_eq!(path.locale(), None);
        assert_eq!(path.canonical(), "/de/admin");
        assert_eq!(path.class(), PathClass::Other);
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let path = LocalizedPath::parse("/login/", &Locales::default());
        assert_eq!(path.canonical(), LOGIN);
        assert_eq!(path.class(), PathClass::GuestOnly);
    }

    #[test]
    fn classification() {
        assert_eq!(PathClass::of("/verify-account"), PathClass::VerifyAccount);
        assert_eq!(PathClass::of("/admin"), PathClass::Admin);
        assert_eq!(PathClass::of("/admin/blogs/3"), PathClass::Admin);
        assert_eq!(PathClass::of("/administrator"), PathClass::Other);
        assert_eq!(PathClass::of("/login"), PathClass::GuestOnly);
        assert_eq!(PathClass::of("/forgot-password"), PathClass::GuestOnly);
        assert_eq!(PathClass::of("/reset-password"), PathClass::Public);
        assert_eq!(PathClass::of("/blog/first-post"), PathClass::Public);
        assert_eq!(PathClass::of("/"), PathClass::Public);
        assert_eq!(PathClass::of("/appointments"), PathClass::Client);
        assert_eq!(PathClass::of("/messages/12"), PathClass::Client);
        assert_eq!(PathClass::of("/settings"), PathClass::Other);
    }

    #[test]
    fn public_classes() {
        assert!(PathClass::Public.is_public());
        assert!(PathClass::GuestOnly.is_public());
        assert!(PathClass::VerifyAccount.is_public());
        assert!(!PathClass::Admin.is_public());
        assert!(!PathClass::Client.is_public());
        assert!(!PathClass::Other.is_public());
    }

    #[test]
    fn localize_targets() {
        assert_eq!(localize(Some("fr"), HOME), "/fr");
        assert_eq!(localize(Some("fr"), LOGIN), "/fr/login");
        assert_eq!(localize(None, HOME), "/");
    }

    #[test]
    fn remembering_keeps_original_path() {
        let locales = Locales::default();
        assert_eq!(
            LocalizedPath::parse("/admin", &locales).localize_remembering(LOGIN),
            "/login?redirect=/admin"
        );
        assert_eq!(
            LocalizedPath::parse("/en/admin/users", &locales).localize_remembering(LOGIN),
            "/en/login?redirect=/en/admin/users"
        );
    }

    #[test]
    fn gating_matcher() {
        assert!(should_gate("/"));
        assert!(should_gate("/fr/admin"));
        assert!(!should_gate("/api/blogs"));
        assert!(!should_gate("/_next/static/chunk"));
        assert!(!should_gate("/health"));
        assert!(!should_gate("/favicon.ico"));
        assert!(should_gate("/healthy-living"));
    }

    #[test]
    fn locales_parsing() -> Result<(), String> {
        let locales: Locales = " EN, fr ,en,".parse()?;
        assert_eq!(locales.to_string(), "en,fr");
        assert_eq!(locales.default_locale(), "en");
        assert!("fr,../x".parse::<Locales>().is_err());
        assert_eq!("".parse::<Locales>()?, Locales::default());
        Ok(())
    }
}
