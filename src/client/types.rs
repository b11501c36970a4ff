//! Request and response payloads of the backend auth endpoints. Passwords,
//! OTP codes and tokens travel through these types; never log them.

use crate::session::User;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct EmailRequest<'a> {
    pub email: &'a str,
}

#[derive(Serialize)]
pub(crate) struct VerifyAccountRequest<'a> {
    pub email: &'a str,
    pub otp: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResetPasswordRequest<'a> {
    pub email: &'a str,
    pub otp: &'a str,
    pub new_password: &'a str,
}

/// Login and register both answer with a token and the user record.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(alias = "token")]
    pub access_token: String,
    pub user: User,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct UserEnvelope {
    pub user: User,
}

/// Error body shape used by the backend.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
