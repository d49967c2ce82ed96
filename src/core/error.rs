use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the launcher core.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── Format ──────────────────────────────────────────
    #[error("Unexpected response format: {0}")]
    Format(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Auth ────────────────────────────────────────────
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Credential store error: {0}")]
    Crypto(String),

    // ── Lookup ──────────────────────────────────────────
    #[error("Not found: {0}")]
    NotFound(String),

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    Integrity {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── Generic ─────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

/// Coarse failure category callers can render without knowing transport details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Format,
    InvalidCredentials,
    NotFound,
    Integrity,
    Io,
    Other,
}

impl LauncherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LauncherError::Io { .. } => ErrorKind::Io,
            LauncherError::Network(e) if e.is_decode() => ErrorKind::Format,
            LauncherError::Network(_) | LauncherError::DownloadFailed { .. } => ErrorKind::Network,
            LauncherError::Format(_) | LauncherError::Json(_) => ErrorKind::Format,
            LauncherError::InvalidCredentials(_) => ErrorKind::InvalidCredentials,
            LauncherError::NotFound(_) => ErrorKind::NotFound,
            LauncherError::Integrity { .. } => ErrorKind::Integrity,
            LauncherError::Crypto(_)
            | LauncherError::InvalidArgument(_)
            | LauncherError::Other(_) => ErrorKind::Other,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LauncherError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}
