use crate::session::Session;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Same unreserved set as `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("session cookie is empty")]
    Empty,
    #[error("session cookie is not valid UTF-8 once decoded")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("session cookie is not valid session JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Envelope written to `auth-storage`: `{"state":{...}}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirroredState {
    pub state: Session,
}

pub(crate) fn encode_value(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

pub(crate) fn decode_value(raw: &str) -> Result<String, std::str::Utf8Error> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
}

/// Serialize a session into the percent-encoded `auth-storage` value.
///
/// # Errors
/// Returns an error if the session cannot be serialized to JSON.
pub fn encode_session_cookie(session: &Session) -> Result<String, serde_json::Error> {
    let envelope = MirroredState {
        state: session.clone(),
    };
    let json = serde_json::to_string(&envelope)?;
    Ok(encode_value(&json))
}

/// Parse a raw `auth-storage` value. Both encoded and plain JSON are accepted.
///
/// # Errors
/// Returns a [`ParseError`] for empty, undecodable or malformed values. Callers
/// decide how to degrade; the gate treats every error as an anonymous session.
pub fn parse_session_cookie(raw: &str) -> Result<Session, ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ParseError::Empty);
    }
    let decoded = decode_value(raw)?;
    let envelope: MirroredState = serde_json::from_str(&decoded)?;
    Ok(envelope.state)
}
