use std::fmt::{Display, Formatter};

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, BackendHttpError>;

/// Error type for requests sent to the program backend.
#[derive(Debug)]
pub enum BackendHttpError {
    InvalidBaseUrl {
        value: String,
    },
    UrlParse(url::ParseError),
    ClientBuild(reqwest::Error),
    Request {
        context: &'static str,
        source: reqwest::Error,
    },
    Status {
        status: u16,
        message: String,
    },
    Decode {
        context: &'static str,
        source: serde_json::Error,
    },
}

impl BackendHttpError {
    /// Returns the HTTP status when the backend answered with a failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl Display for BackendHttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBaseUrl { value } => {
                write!(f, "base url cannot be joined with request paths: {value}")
            }
            Self::UrlParse(err) => write!(f, "invalid base url: {err}"),
            Self::ClientBuild(err) => write!(f, "http client setup failed: {err}"),
            Self::Request { context, source } => write!(f, "{context}: {source}"),
            Self::Status { message, .. } => write!(f, "{message}"),
            Self::Decode { context, source } => {
                write!(f, "unexpected response ({context}): {source}")
            }
        }
    }
}

impl std::error::Error for BackendHttpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UrlParse(err) => Some(err),
            Self::ClientBuild(err) => Some(err),
            Self::Request { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<url::ParseError> for BackendHttpError {
    fn from(value: url::ParseError) -> Self {
        Self::UrlParse(value)
    }
}
