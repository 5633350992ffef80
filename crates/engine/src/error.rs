use std::fmt::{Display, Formatter};

/// Result type used by the engine crate.
pub type Result<T> = std::result::Result<T, EditorError>;

/// Errors produced by editor commands and program submission.
#[derive(Debug)]
pub enum EditorError {
    EmptyQueue,
    EmptyTargets,
    SubmissionInFlight,
    SessionClosed,
    Load { source: BackendError },
    Apply { source: BackendError },
}

impl EditorError {
    /// Returns true for locally detected validation failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyQueue | Self::EmptyTargets)
    }
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyQueue => write!(f, "add at least one video to the queue"),
            Self::EmptyTargets => write!(f, "add at least one output target"),
            Self::SubmissionInFlight => write!(f, "a program submission is already in progress"),
            Self::SessionClosed => write!(f, "editing session is closed"),
            Self::Load { source } => write!(f, "failed to load program: {source}"),
            Self::Apply { source } => write!(f, "failed to apply program: {source}"),
        }
    }
}

impl std::error::Error for EditorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load { source } | Self::Apply { source } => Some(source),
            _ => None,
        }
    }
}

/// Failure reported by a program backend.
#[derive(Debug)]
pub enum BackendError {
    Http(backend_http::BackendHttpError),
    Rejected { reason: String },
}

impl BackendError {
    /// Creates a rejection carrying a backend-provided reason.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(err) => write!(f, "{err}"),
            Self::Rejected { reason } => write!(f, "{reason}"),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Rejected { .. } => None,
        }
    }
}

impl From<backend_http::BackendHttpError> for BackendError {
    fn from(value: backend_http::BackendHttpError) -> Self {
        Self::Http(value)
    }
}
