use serde::Serialize;
use std::path::PathBuf;
use strum_macros::Display;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ErrorKind {
    Transport,
    Lookup,
    CacheCorruption,
    CacheIo,
}

#[derive(Debug, thiserror::Error)]
pub enum PricecheckError {
    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("Lookup of '{name}' failed: {reason}")]
    Lookup { name: String, reason: String },
    #[error("Identifier cache at {path:?} is unreadable: {reason}")]
    CacheCorruption { path: PathBuf, reason: String },
    #[error("Identifier cache at {path:?} could not be written")]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PricecheckError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PricecheckError::Transport { .. } => ErrorKind::Transport,
            PricecheckError::Lookup { .. } => ErrorKind::Lookup,
            PricecheckError::CacheCorruption { .. } => ErrorKind::CacheCorruption,
            PricecheckError::CacheIo { .. } => ErrorKind::CacheIo,
        }
    }

    /// Errors that must abort a batch instead of being recorded against a single item.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::CacheIo)
    }

    pub(crate) fn lookup(name: &str, reason: impl Into<String>) -> Self {
        PricecheckError::Lookup {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn transport(url: impl ToString, reason: impl ToString) -> Self {
        PricecheckError::Transport {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = PricecheckError> = std::result::Result<T, E>;
