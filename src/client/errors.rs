use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    /// The backend answered `401`. The session has been cleared unless the
    /// call was made from a public page; `redirect` is where to navigate and
    /// `message` is the backend's explanation (e.g. bad credentials), if any.
    #[error("Unauthorized")]
    Unauthorized {
        redirect: Option<String>,
        message: Option<String>,
    },
    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("Response error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Translation key of the toast shown for this error.
    #[must_use]
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::Config(_) => "errors.config",
            Self::Validation(_) => "errors.validation",
            Self::Network(_) => "errors.network",
            Self::Timeout(_) => "errors.timeout",
            Self::Unauthorized { .. } => "errors.unauthorized",
            Self::Http { status: 404, .. } => "errors.notFound",
            Self::Http { status: 409, .. } => "errors.conflict",
            Self::Http { status, .. } if *status >= 500 => "errors.server",
            Self::Http { .. } => "errors.request",
            Self::Parse(_) => "errors.response",
        }
    }

    /// Redirect the caller should follow, if any.
    #[must_use]
    pub fn redirect(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { redirect, .. } => redirect.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout("Request timed out. Please try again.".to_string())
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(format!("Unable to reach the server: {err}"))
        }
    }
}
