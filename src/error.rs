use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = TypoError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TypoError {
    /// A dictionary, rule set or config file could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON rule set was malformed. Nothing is merged when this is returned.
    #[error("invalid rule set {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no document to correct")]
    NoActiveTarget,
}

impl TypoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TypoError::Io {
            path: path.into(),
            source,
        }
    }
}
