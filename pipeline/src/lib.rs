pub mod config;
pub mod error;
pub mod source;
pub mod split;
pub mod stages;
pub mod table;

pub use config::{PreprocessConfig, TrainConfig};
pub use error::{PipelineErr, Result};
pub use source::{DataSource, FileSource, HttpSource, StaticSource};
pub use stages::{FetchStage, PreprocessStage, TrainStage};
pub use table::Table;
