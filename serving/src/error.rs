use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The serving module's result type.
pub type Result<T> = std::result::Result<T, ServeErr>;

/// Serving failures.
///
/// `ModelLoad` is fatal at startup, every other variant only affects the
/// request that raised it.
#[derive(Debug)]
pub enum ServeErr {
    /// The model artifact is absent, unreachable or corrupt.
    ModelLoad { key: String, reason: String },
    /// The request's features don't match the model's feature columns.
    InvalidInput {
        missing: Vec<String>,
        unexpected: Vec<String>,
        invalid: Vec<String>,
    },
    /// The request body isn't a feature object, or its values can't be predicted.
    BadRequest(String),
}

impl ServeErr {
    /// Returns the machine readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ServeErr::ModelLoad { .. } => "ModelLoadError",
            ServeErr::InvalidInput { .. } | ServeErr::BadRequest(_) => "InvalidInput",
        }
    }
}

impl Display for ServeErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServeErr::ModelLoad { key, reason } => write!(f, "failed to load model {key}: {reason}"),
            ServeErr::InvalidInput {
                missing,
                unexpected,
                invalid,
            } => {
                write!(f, "invalid features")?;
                for (label, keys) in [("missing", missing), ("unexpected", unexpected), ("not numeric", invalid)] {
                    if !keys.is_empty() {
                        write!(f, "; {label}: {}", keys.join(", "))?;
                    }
                }
                Ok(())
            }
            ServeErr::BadRequest(msg) => write!(f, "bad request: {msg}"),
        }
    }
}

impl Error for ServeErr {}

/// Boundary conversion for binaries.
impl From<ServeErr> for io::Error {
    fn from(value: ServeErr) -> Self {
        io::Error::other(value)
    }
}
