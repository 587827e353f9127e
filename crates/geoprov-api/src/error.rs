use std::path::PathBuf;

use strum::{Display, IntoStaticStr};
use thiserror::Error;

/// Top-level error type for the `geoprov-api` crate.
///
/// Every variant belongs to exactly one [`ErrorKind`], so callers can decide
/// whether to retry, fix their configuration, or give up without matching
/// on individual variants.
#[derive(Debug, Error)]
pub enum Error {
    // ── Configuration ───────────────────────────────────────────────
    /// A required connection value (URL, username, password) is empty.
    #[error("Missing required value: {field}")]
    MissingValue { field: &'static str },

    /// An identifier argument (workspace, store, layer) is empty.
    #[error("Identifier '{field}' must not be empty")]
    EmptyIdentifier { field: &'static str },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The base URL cannot carry path segments (e.g. `mailto:`).
    #[error("URL cannot be used as a server base: {url}")]
    CannotBeABase { url: String },

    /// TLS setup or HTTP client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The caller's cancellation token fired while a request was in flight.
    #[error("Request cancelled")]
    Cancelled,

    // ── Remote ──────────────────────────────────────────────────────
    /// GeoServer answered with a non-success status.
    #[error("GeoServer rejected request (HTTP {status}) for {url}: {message}")]
    Rejected {
        status: u16,
        url: String,
        message: String,
    },

    // ── Local I/O ───────────────────────────────────────────────────
    /// File-system access failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A downloaded archive could not be read or extracted.
    #[error("Archive error at {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

/// The four failure families a caller can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or invalid credentials, URLs, or identifiers.
    Configuration,
    /// Network failure, timeout, or cancellation.
    Transport,
    /// The server answered with a non-success status.
    Rejected,
    /// Local directory, file, or archive failure.
    LocalIo,
}

impl Error {
    /// Which family this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingValue { .. }
            | Self::EmptyIdentifier { .. }
            | Self::InvalidUrl(_)
            | Self::CannotBeABase { .. }
            | Self::Tls(_) => ErrorKind::Configuration,
            Self::Transport(_) | Self::Timeout { .. } | Self::Cancelled => ErrorKind::Transport,
            Self::Rejected { .. } => ErrorKind::Rejected,
            Self::Io { .. } | Self::Archive { .. } => ErrorKind::LocalIo,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the server reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` if the server refused the credentials.
    pub fn is_auth_rejected(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }

    pub(crate) fn archive(path: impl Into<PathBuf>) -> impl FnOnce(zip::result::ZipError) -> Self {
        let path = path.into();
        move |source| Self::Archive { path, source }
    }
}
