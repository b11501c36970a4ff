//! Backend API client.
//!
//! Wraps the external REST API with one shared `reqwest` client: bearer token
//! from the session store on every call and a single policy for `401` (sign
//! out and send the user to login, except on public pages). Requests have no
//! timeout of their own unless the client is built with
//! [`ApiClient::with_timeout`].
//! The auth flows update the injected [`SessionStore`] on success.
//!
//! Flow Overview: login/register call `set_auth`, so an unverified account
//! lands with its email pending verification. `verify_account` flips the
//! verification flag and clears the pending email. `logout` notifies the
//! backend when a token is held, then clears the store and its cookies.

mod errors;
mod types;

pub use self::errors::ApiError;
pub use self::types::AuthResponse;

use self::types::{
    EmailRequest, ErrorBody, LoginRequest, RegisterRequest, ResetPasswordRequest, UserEnvelope,
    VerifyAccountRequest,
};
use crate::{
    cookies::CookieSink,
    gate::paths::{self, LocalizedPath, Locales},
    session::{SessionStore, User},
    APP_USER_AGENT,
};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Maximum number of error body characters surfaced to the UI.
const MAX_ERROR_CHARS: usize = 200;

static EMAIL_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

#[must_use]
pub fn valid_email(email: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(email))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UserPayload {
    Envelope(UserEnvelope),
    Bare(User),
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    locales: Locales,
    current_path: String,
}

impl ApiClient {
    /// # Errors
    /// Returns [`ApiError::Config`] for an unusable base URL or HTTP client.
    pub fn new(base_url: &str, locales: Locales) -> Result<Self, ApiError> {
        Self::build(base_url, locales, None)
    }

    /// Same as [`ApiClient::new`], with every request bounded by `timeout`.
    ///
    /// # Errors
    /// Returns [`ApiError::Config`] for an unusable base URL or HTTP client.
    pub fn with_timeout(
        base_url: &str,
        locales: Locales,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        Self::build(base_url, locales, Some(timeout))
    }

    fn build(
        base_url: &str,
        locales: Locales,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|err| ApiError::Config(format!("Invalid API base URL {base_url}: {err}")))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "API base URL must be http(s): {base_url}"
            )));
        }

        let mut builder = Client::builder().user_agent(APP_USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| ApiError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url,
            locales,
            current_path: paths::HOME.to_string(),
        })
    }

    /// Record the page the user is on; it decides how a `401` is handled.
    pub fn navigate(&mut self, path: impl Into<String>) {
        self.current_path = path.into();
    }

    #[must_use]
    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    fn url(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{}/{}", base, path.trim().trim_start_matches('/'))
    }

    fn request<S: CookieSink>(
        &self,
        store: &SessionStore<S>,
        method: Method,
        path: &str,
    ) -> RequestBuilder {
        let request = self.http.request(method, self.url(path));
        match store.session().access_token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute<S: CookieSink>(
        &self,
        store: &mut SessionStore<S>,
        request: RequestBuilder,
    ) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            let message = Some(read_message(response).await).filter(|m| !m.is_empty());
            return Err(self.unauthorized(store, message));
        }
        if !status.is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response)
    }

    fn unauthorized<S: CookieSink>(
        &self,
        store: &mut SessionStore<S>,
        message: Option<String>,
    ) -> ApiError {
        let page = LocalizedPath::parse(&self.current_path, &self.locales);
        if page.class().is_public() {
            debug!(page = page.original(), "401 on a public page, session kept");
            return ApiError::Unauthorized {
                redirect: None,
                message,
            };
        }
        warn!(page = page.original(), "API rejected the session, signing out");
        store.logout();
        ApiError::Unauthorized {
            redirect: Some(page.localize(paths::LOGIN)),
            message,
        }
    }

    /// `GET` a JSON resource with the session's bearer token.
    ///
    /// # Errors
    /// Any [`ApiError`]; a `401` also signs the store out (see module docs).
    pub async fn get_json<S: CookieSink, T: DeserializeOwned>(
        &self,
        store: &mut SessionStore<S>,
        path: &str,
    ) -> Result<T, ApiError> {
        let request = self.request(store, Method::GET, path);
        let response = self.execute(store, request).await?;
        parse_json(response).await
    }

    /// `POST` a JSON body and parse a JSON answer.
    ///
    /// # Errors
    /// Any [`ApiError`]; a `401` also signs the store out (see module docs).
    pub async fn post_json<S: CookieSink, B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        store: &mut SessionStore<S>,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.request(store, Method::POST, path).json(body);
        let response = self.execute(store, request).await?;
        parse_json(response).await
    }

    /// `POST` a JSON body, ignoring whatever the backend answers on success.
    async fn post_ack<S: CookieSink, B: Serialize + ?Sized>(
        &self,
        store: &mut SessionStore<S>,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let request = self.request(store, Method::POST, path).json(body);
        self.execute(store, request).await.map(|_| ())
    }

    /// # Errors
    /// [`ApiError::Validation`] for a malformed email, otherwise any request error.
    #[instrument(skip_all)]
    pub async fn login<S: CookieSink>(
        &self,
        store: &mut SessionStore<S>,
        email: &str,
        password: &SecretString,
    ) -> Result<(), ApiError> {
        let email = checked_email(email)?;
        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };
        let auth: AuthResponse = self.post_json(store, "/auth/login", &body).await?;
        info!(user_id = auth.user.id.as_str(), role = auth.user.role.as_str(), "signed in");
        store.set_auth(auth.access_token, auth.user);
        Ok(())
    }

    /// # Errors
    /// [`ApiError::Validation`] for a blank name or malformed email, otherwise
    /// any request error.
    #[instrument(skip_all)]
    pub async fn register<S: CookieSink>(
        &self,
        store: &mut SessionStore<S>,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<(), ApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation("name is required".to_string()));
        }
        let email = checked_email(email)?;
        let body = RegisterRequest {
            name,
            email,
            password: password.expose_secret(),
        };
        let auth: AuthResponse = self.post_json(store, "/auth/register", &body).await?;
        info!(user_id = auth.user.id.as_str(), "registered");
        store.set_auth(auth.access_token, auth.user);
        Ok(())
    }

    /// Ask the backend to (re)send the account verification code.
    ///
    /// # Errors
    /// [`ApiError::Validation`] when the session has no email to verify.
    #[instrument(skip_all)]
    pub async fn send_verification_otp<S: CookieSink>(
        &self,
        store: &mut SessionStore<S>,
    ) -> Result<(), ApiError> {
        let email = verification_email(store)?;
        self.post_ack(store, "/auth/send-verify-otp", &EmailRequest { email: &email })
            .await
    }

    /// # Errors
    /// [`ApiError::Validation`] for a blank code or a session with nothing to
    /// verify, otherwise any request error.
    #[instrument(skip_all)]
    pub async fn verify_account<S: CookieSink>(
        &self,
        store: &mut SessionStore<S>,
        otp: &str,
    ) -> Result<(), ApiError> {
        let otp = otp.trim();
        if otp.is_empty() {
            return Err(ApiError::Validation("verification code is required".to_string()));
        }
        let email = verification_email(store)?;
        let body = VerifyAccountRequest { email: &email, otp };
        self.post_ack(store, "/auth/verify-account", &body).await?;

        if store.session().user.is_some() {
            store.update_user_verification_status(true);
        } else {
            store.clear_pending_verification();
        }
        info!("account verified");
        Ok(())
    }

    /// # Errors
    /// [`ApiError::Validation`] for a malformed email, otherwise any request error.
    #[instrument(skip_all)]
    pub async fn send_reset_otp<S: CookieSink>(
        &self,
        store: &mut SessionStore<S>,
        email: &str,
    ) -> Result<(), ApiError> {
        let email = checked_email(email)?;
        self.post_ack(store, "/auth/send-reset-otp", &EmailRequest { email })
            .await
    }

    /// # Errors
    /// [`ApiError::Validation`] for malformed input, otherwise any request error.
    #[instrument(skip_all)]
    pub async fn reset_password<S: CookieSink>(
        &self,
        store: &mut SessionStore<S>,
        email: &str,
        otp: &str,
        new_password: &SecretString,
    ) -> Result<(), ApiError> {
        let email = checked_email(email)?;
        let otp = otp.trim();
        if otp.is_empty() {
            return Err(ApiError::Validation("reset code is required".to_string()));
        }
        let body = ResetPasswordRequest {
            email,
            otp,
            new_password: new_password.expose_secret(),
        };
        self.post_ack(store, "/auth/reset-password", &body).await
    }

    /// Reload the current user from the backend and replace it in the store.
    ///
    /// # Errors
    /// Any request error.
    #[instrument(skip_all)]
    pub async fn refresh_profile<S: CookieSink>(
        &self,
        store: &mut SessionStore<S>,
    ) -> Result<(), ApiError> {
        let payload: UserPayload = self.get_json(store, "/auth/me").await?;
        let user = match payload {
            UserPayload::Envelope(envelope) => envelope.user,
            UserPayload::Bare(user) => user,
        };
        store.set_user(Some(user));
        Ok(())
    }

    /// Tell the backend (best effort) and clear the local session.
    #[instrument(skip_all)]
    pub async fn logout<S: CookieSink>(&self, store: &mut SessionStore<S>) {
        if store.session().access_token.is_some() {
            let request = self.request(store, Method::POST, "/auth/logout");
            if let Err(err) = self.execute(store, request).await {
                warn!("Logout request failed: {err}");
            }
        }
        store.logout();
    }
}

fn checked_email(email: &str) -> Result<&str, ApiError> {
    let email = email.trim();
    if valid_email(email) {
        Ok(email)
    } else {
        Err(ApiError::Validation("invalid email address".to_string()))
    }
}

fn verification_email<S: CookieSink>(store: &SessionStore<S>) -> Result<String, ApiError> {
    let session = store.session();
    session
        .pending_verification_email
        .clone()
        .or_else(|| session.user.as_ref().map(|user| user.email.clone()))
        .ok_or_else(|| ApiError::Validation("no account is waiting for verification".to_string()))
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}")))
}

/// Backend error text: the JSON `message` when present, else the raw body.
async fn read_message(response: Response) -> String {
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.message)
        .unwrap_or(text);
    message.trim().chars().take(MAX_ERROR_CHARS).collect()
}

async fn error_from_response(response: Response) -> ApiError {
    let status = response.status().as_u16();
    ApiError::Http {
        status,
        message: read_message(response).await,
    }
}
