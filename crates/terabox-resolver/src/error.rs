//! Error types for share-link resolution

use std::fmt;

#[derive(Debug)]
pub enum ResolveError {
    Http(Box<reqwest::Error>),
    InvalidLink(String),
    MissingTokens,
    Upstream(String),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Http(err) => write!(f, "failed to reach origin: {}", err),
            ResolveError::InvalidLink(msg) => write!(f, "invalid link: {}", msg),
            ResolveError::MissingTokens => {
                write!(f, "failed to extract required tokens from share page")
            }
            ResolveError::Upstream(msg) => write!(f, "failed to retrieve file list: {}", msg),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Http(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ResolveError {
    fn from(err: reqwest::Error) -> Self {
        ResolveError::Http(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
