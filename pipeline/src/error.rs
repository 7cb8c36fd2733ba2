use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use artifacts::StoreErr;
use model::ModelErr;

/// The pipeline module's result type.
pub type Result<T> = std::result::Result<T, PipelineErr>;

/// Failures of the fetch, preprocess and train stages.
///
/// Every variant is raised before the stage's single upload, so a failed
/// stage never leaves a new artifact behind.
#[derive(Debug)]
pub enum PipelineErr {
    /// The external data source could not be read.
    SourceUnavailable { origin: String, reason: String },
    /// The artifact store failed.
    Store(StoreErr),
    /// An input artifact of the stage is absent.
    ArtifactMissing { key: String },
    /// Dataset bytes are not a rectangular CSV table.
    MalformedData { context: String, reason: String },
    /// A required column is absent or holds unusable values.
    SchemaMismatch(String),
    /// Too few rows to fit or score a model.
    InsufficientData(String),
    /// The fit diverged or produced non-finite parameters.
    NumericalInstability(String),
    InvalidConfig(String),
}

impl PipelineErr {
    /// Returns the machine readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineErr::SourceUnavailable { .. } => "SourceUnavailable",
            PipelineErr::Store(e) => e.code(),
            PipelineErr::ArtifactMissing { .. } => "ArtifactMissing",
            PipelineErr::MalformedData { .. } => "MalformedData",
            PipelineErr::SchemaMismatch(_) => "SchemaMismatch",
            PipelineErr::InsufficientData(_) => "InsufficientData",
            PipelineErr::NumericalInstability(_) => "NumericalInstability",
            PipelineErr::InvalidConfig(_) => "InvalidConfig",
        }
    }

    pub(crate) fn malformed(context: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedData {
            context: context.into(),
            reason: reason.to_string(),
        }
    }
}

impl Display for PipelineErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineErr::SourceUnavailable { origin, reason } => {
                write!(f, "source {origin} unavailable: {reason}")
            }
            PipelineErr::Store(e) => write!(f, "{e}"),
            PipelineErr::ArtifactMissing { key } => write!(f, "artifact {key} is missing"),
            PipelineErr::MalformedData { context, reason } => {
                write!(f, "malformed data in {context}: {reason}")
            }
            PipelineErr::SchemaMismatch(msg) => write!(f, "schema mismatch: {msg}"),
            PipelineErr::InsufficientData(msg) => write!(f, "insufficient data: {msg}"),
            PipelineErr::NumericalInstability(msg) => write!(f, "numerical instability: {msg}"),
            PipelineErr::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl Error for PipelineErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineErr::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreErr> for PipelineErr {
    fn from(value: StoreErr) -> Self {
        match value {
            StoreErr::NotFound { key } => Self::ArtifactMissing { key },
            StoreErr::Corrupt { key, reason } => Self::MalformedData {
                context: key,
                reason,
            },
            other => Self::Store(other),
        }
    }
}

impl From<ModelErr> for PipelineErr {
    fn from(value: ModelErr) -> Self {
        match value {
            ModelErr::InsufficientData { .. } => Self::InsufficientData(value.to_string()),
            ModelErr::NumericalInstability(msg) => Self::NumericalInstability(msg),
            ModelErr::ShapeMismatch { .. } => Self::SchemaMismatch(value.to_string()),
            ModelErr::Corrupt(msg) => Self::malformed("model", msg),
        }
    }
}

/// Boundary conversion for binaries.
impl From<PipelineErr> for io::Error {
    fn from(value: PipelineErr) -> Self {
        match value {
            PipelineErr::Store(e) => e.into(),
            other => io::Error::other(other),
        }
    }
}
