use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire model module.
pub type Result<T> = std::result::Result<T, ModelErr>;

/// The model module's error type.
#[derive(Debug)]
pub enum ModelErr {
    ShapeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    InsufficientData {
        what: &'static str,
        got: usize,
        required: usize,
    },
    NumericalInstability(String),
    Corrupt(String),
}

impl ModelErr {
    /// Returns the machine readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ModelErr::ShapeMismatch { .. } => "ShapeMismatch",
            ModelErr::InsufficientData { .. } => "InsufficientData",
            ModelErr::NumericalInstability(_) => "NumericalInstability",
            ModelErr::Corrupt(_) => "Corrupt",
        }
    }
}

impl Display for ModelErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelErr::ShapeMismatch {
                what,
                got,
                expected,
            } => write!(f, "{what} size mismatch: got {got}, expected {expected}"),
            ModelErr::InsufficientData {
                what,
                got,
                required,
            } => write!(f, "not enough {what}: got {got}, need at least {required}"),
            ModelErr::NumericalInstability(msg) => write!(f, "numerical instability: {msg}"),
            ModelErr::Corrupt(msg) => write!(f, "invalid model artifact: {msg}"),
        }
    }
}

impl Error for ModelErr {}
