use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The result type used by every artifact store operation.
pub type Result<T> = std::result::Result<T, StoreErr>;

/// Failures surfaced by an artifact store backend or by the typed client.
#[derive(Debug)]
pub enum StoreErr {
    /// The key is absent from the store.
    NotFound { key: String },
    /// The backend could not be reached or refused the request.
    BackendUnavailable {
        backend: &'static str,
        reason: String,
    },
    /// The backend cannot map this key onto its storage.
    InvalidKey { key: String, reason: &'static str },
    /// The stored bytes could not be encoded or decoded as the requested artifact.
    Corrupt { key: String, reason: String },
}

impl StoreErr {
    /// Shorthand for a `BackendUnavailable` error.
    pub fn unavailable(backend: &'static str, reason: impl ToString) -> Self {
        Self::BackendUnavailable {
            backend,
            reason: reason.to_string(),
        }
    }

    /// Returns the machine readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            StoreErr::NotFound { .. } => "NotFound",
            StoreErr::BackendUnavailable { .. } => "BackendUnavailable",
            StoreErr::InvalidKey { .. } => "InvalidKey",
            StoreErr::Corrupt { .. } => "Corrupt",
        }
    }

    /// Whether this error only means the key is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreErr::NotFound { .. })
    }
}

impl Display for StoreErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreErr::NotFound { key } => write!(f, "artifact not found: {key}"),
            StoreErr::BackendUnavailable { backend, reason } => {
                write!(f, "{backend} backend unavailable: {reason}")
            }
            StoreErr::InvalidKey { key, reason } => write!(f, "invalid key {key:?}: {reason}"),
            StoreErr::Corrupt { key, reason } => write!(f, "corrupt artifact {key}: {reason}"),
        }
    }
}

impl Error for StoreErr {}

/// Boundary conversion for binaries.
impl From<StoreErr> for io::Error {
    fn from(value: StoreErr) -> Self {
        let kind = match value {
            StoreErr::NotFound { .. } => io::ErrorKind::NotFound,
            StoreErr::BackendUnavailable { .. } => io::ErrorKind::ConnectionRefused,
            StoreErr::InvalidKey { .. } => io::ErrorKind::InvalidInput,
            StoreErr::Corrupt { .. } => io::ErrorKind::InvalidData,
        };

        io::Error::new(kind, value)
    }
}
