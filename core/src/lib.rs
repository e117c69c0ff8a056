pub mod distributor;
pub mod error;
pub mod gate;
pub mod index;
pub mod manifest;
pub mod mapper;
pub mod partition;
pub mod persist;
pub mod pipeline;
pub mod reducer;
pub mod tokenizer;

use std::path::PathBuf;

pub use error::{PipelineError, Result};
pub use partition::PartitionKey;
pub use pipeline::{run, run_with, PipelineConfig, PipelineReport};

pub type DocId = u32;

/// An input file paired with its 1-based position in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: DocId,
    pub path: PathBuf,
}
