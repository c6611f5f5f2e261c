use std::path::PathBuf;

/// Errors raised while building, loading or querying an index.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A corpus, index or config artifact does not exist.
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },
    /// A persisted artifact exists but has the wrong shape.
    #[error("malformed {}: {message}", path.display())]
    Format { path: PathBuf, message: String },
    /// The caller violated a precondition (e.g. empty corpus).
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn format(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::Format { path: path.into(), message: message.to_string() }
    }

    /// Map an open/read failure, turning a missing file into `NotFound`.
    pub(crate) fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound { path: path.into() }
        } else {
            Error::Io(err)
        }
    }
}
