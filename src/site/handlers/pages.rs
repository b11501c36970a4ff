//! Locale-prefixed page surface. Each page declares what it needs from the
//! session and is re-checked by the route guard before rendering; the gate
//! has already run by the time a page handler is reached.

use crate::{
    cookies::RequestCookies,
    gate::{
        paths::{self, LocalizedPath, REDIRECT_PARAM},
        GateConfig,
    },
    guard::{self, GuardOutcome, RouteAccess},
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageAccess {
    Route(RouteAccess),
    /// Login and registration pages.
    GuestOnly,
}

#[derive(Clone, Copy, Debug)]
pub struct Page {
    pub path: &'static str,
    pub title: &'static str,
    pub access: PageAccess,
    /// Sub-paths render through this page too.
    pub section: bool,
}

const fn page(path: &'static str, title: &'static str, access: RouteAccess) -> Page {
    Page {
        path,
        title,
        access: PageAccess::Route(access),
        section: false,
    }
}

const fn section(path: &'static str, title: &'static str, access: RouteAccess) -> Page {
    Page {
        path,
        title,
        access: PageAccess::Route(access),
        section: true,
    }
}

const fn guest(path: &'static str, title: &'static str) -> Page {
    Page {
        path,
        title,
        access: PageAccess::GuestOnly,
        section: false,
    }
}

pub const PAGES: &[Page] = &[
    page(paths::HOME, "Home", RouteAccess::Public),
    page("/about", "About us", RouteAccess::Public),
    section("/services", "Services", RouteAccess::Public),
    page("/contact", "Contact", RouteAccess::Public),
    section("/blog", "Blog", RouteAccess::Public),
    guest(paths::LOGIN, "Sign in"),
    guest(paths::REGISTER, "Create an account"),
    guest(paths::FORGOT_PASSWORD, "Forgot password"),
    page(paths::RESET_PASSWORD, "Reset password", RouteAccess::Public),
    page(paths::VERIFY_ACCOUNT, "Verify your account", RouteAccess::UnverifiedOnly),
    section(paths::APPOINTMENTS, "My appointments", RouteAccess::Authenticated),
    section(paths::MESSAGES, "My messages", RouteAccess::Authenticated),
    section(paths::ADMIN, "Administration", RouteAccess::Admin),
];

/// Exact match first, then the closest section.
#[must_use]
pub fn find(canonical: &str) -> Option<&'static Page> {
    PAGES
        .iter()
        .find(|page| page.path == canonical)
        .or_else(|| {
            PAGES.iter().find(|page| {
                page.section
                    && canonical
                        .strip_prefix(page.path)
                        .is_some_and(|rest| rest.starts_with('/'))
            })
        })
}

fn redirect_param(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == REDIRECT_PARAM)
        .map(|(_, value)| value.into_owned())
}

fn document(lang: &str, title: &str, page_path: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"{lang}\"><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body><main data-page=\"{page_path}\"><h1>{title}</h1></main></body></html>\n"
    )
}

// axum fallback handler for pages
pub async fn page_handler(
    State(config): State<Arc<GateConfig>>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let path = LocalizedPath::parse(uri.path(), &config.locales);
    let lang = path
        .locale()
        .unwrap_or_else(|| config.locales.default_locale())
        .to_string();

    let Some(page) = find(path.canonical()) else {
        return (
            StatusCode::NOT_FOUND,
            Html(document(&lang, "Page not found", path.canonical())),
        )
            .into_response();
    };

    let session = RequestCookies::from_headers(&headers).resolved_session();
    let outcome = match page.access {
        PageAccess::Route(access) => guard::evaluate(access, &session, &path),
        PageAccess::GuestOnly => {
            guard::guest_only(&session, &path, redirect_param(uri.query()).as_deref())
        }
    };

    match outcome {
        GuardOutcome::Render => Html(document(&lang, page.title, page.path)).into_response(),
        GuardOutcome::Redirect(location) => {
            debug!(page = page.path, location = location.as_str(), "route guard redirect");
            Redirect::temporary(&location).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_exact_pages_and_sections() {
        assert_eq!(find("/").map(|p| p.title), Some("Home"));
        assert_eq!(find("/blog/hello").map(|p| p.path), Some("/blog"));
        assert_eq!(find("/admin/users/3").map(|p| p.path), Some(paths::ADMIN));
        assert!(find("/contact/extra").is_none());
        assert!(find("/nowhere").is_none());
    }

    #[test]
    fn page_access_matches_path_class() {
        use crate::gate::PathClass;
        for page in PAGES {
            let class = PathClass::of(page.path);
            match page.access {
                PageAccess::GuestOnly => assert_eq!(class, PathClass::GuestOnly),
                PageAccess::Route(RouteAccess::Admin) => assert_eq!(class, PathClass::Admin),
                PageAccess::Route(RouteAccess::UnverifiedOnly) => {
                    assert_eq!(class, PathClass::VerifyAccount);
                }
                PageAccess::Route(RouteAccess::Authenticated) => {
                    assert_eq!(class, PathClass::Client);
                }
                PageAccess::Route(RouteAccess::Public) => assert_eq!(class, PathClass::Public),
            }
        }
    }

    #[test]
    fn reads_redirect_param() {
        assert_eq!(
            redirect_param(Some("a=1&redirect=%2Forders")).as_deref(),
            Some("/orders")
        );
        assert_eq!(redirect_param(Some("a=1")), None);
        assert_eq!(redirect_param(None), None);
    }
}
