pub mod artifact;
pub mod error;
pub mod linear;
pub mod metrics;

pub use artifact::{ModelArtifact, ModelMetadata};
pub use error::{ModelErr, Result};
pub use linear::LinearRegression;
