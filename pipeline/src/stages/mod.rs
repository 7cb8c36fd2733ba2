mod fetch;
mod preprocess;
mod train;

pub use fetch::{FetchReport, FetchStage};
pub use preprocess::{PreprocessReport, PreprocessStage, transform};
pub use train::{TrainReport, TrainStage};
