pub mod builder;
pub mod error;
pub mod http;
pub mod request;
pub mod server;

pub use builder::ServerBuilder;
pub use error::{Result, ServeErr};
pub use http::router;
pub use request::{ModelSummary, PredictionRequest, PredictionResponse};
pub use server::{LoadedModel, ModelServer};
