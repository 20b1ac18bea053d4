#![forbid(unsafe_code)]

//! Failures reported by an event source's initial state fetch.

use std::fmt;

/// Why an initial state fetch did not produce a value.
#[derive(Debug)]
pub enum SourceError {
    /// The source refused the request.
    Rejected(String),
    /// The source went away before answering.
    Unavailable,
    /// Any other failure, boxed.
    Other(Box<dyn std::error::Error + 'static>),
}

impl SourceError {
    /// Convenience constructor for [`SourceError::Rejected`].
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }

    /// Wrap an arbitrary error.
    #[must_use]
    pub fn other(err: impl std::error::Error + 'static) -> Self {
        Self::Other(Box::new(err))
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(reason) => write!(f, "initial state rejected: {reason}"),
            Self::Unavailable => write!(f, "event source unavailable"),
            Self::Other(err) => write!(f, "initial state failed: {err}"),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
