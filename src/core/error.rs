// error taxonomy for a monitor run
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Coarse classification used by the caller to decide how to report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Decode,
    Delivery,
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("fixture file {} 'native' property has no 'slug' property (or it is empty)", path.display())]
    MissingSlug { path: PathBuf },

    #[error("duplicate slug {slug} in fixtures {} and {}", first.display(), second.display())]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("no enabled fixtures read, please define at least one")]
    NoFixtures,

    #[error("cannot read fixture {}: {source}", path.display())]
    FixtureRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode fixture {}: {source}", path.display())]
    FixtureDecode {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("fixture loader panicked on {}", path.display())]
    LoaderPanic { path: PathBuf },

    #[error("error finding fixtures under {}: {source}", path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("{method} {url}: request error: {source}")]
    Request {
        method: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {url}: status {status}\n{body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    #[error("{method} {url}: JSON decode error: {source}")]
    ResponseDecode {
        method: &'static str,
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot render report: {0}")]
    Render(String),

    #[error("error sending report to {recipient}: {reason}")]
    Delivery { recipient: String, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ReconcileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReconcileError::MissingSlug { .. }
            | ReconcileError::DuplicateSlug { .. }
            | ReconcileError::NoFixtures
            | ReconcileError::Discovery { .. }
            | ReconcileError::Config(_) => ErrorKind::Configuration,
            ReconcileError::FixtureRead { .. }
            | ReconcileError::FixtureDecode { .. }
            | ReconcileError::LoaderPanic { .. }
            | ReconcileError::ResponseDecode { .. }
            | ReconcileError::Render(_) => ErrorKind::Decode,
            ReconcileError::Request { .. } | ReconcileError::Status { .. } => ErrorKind::Transport,
            ReconcileError::Delivery { .. } => ErrorKind::Delivery,
        }
    }
}
