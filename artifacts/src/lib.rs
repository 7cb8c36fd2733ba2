mod client;
pub mod config;
pub mod error;
mod fs;
mod key;
mod memory;
mod s3;
mod store;

pub use client::{Artifact, ArtifactClient};
pub use config::{StoreArgs, StoreConfig};
pub use error::{Result, StoreErr};
pub use fs::FsStore;
pub use key::{ArtifactKey, ArtifactKind};
pub use memory::MemoryStore;
pub use s3::S3Store;
pub use store::ArtifactStore;
