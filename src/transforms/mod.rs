//! Task Graph Transforms
//!
//! The update-verify chunking transform and its building blocks.
//!
//! # Architecture
//!
//! - [`matcher`]: Binds jobs to config tasks by name
//! - [`command`]: Builds the per-chunk verification command
//! - [`chunking`]: Prepares jobs and fans them out into chunks

pub mod chunking;
pub mod command;
pub mod matcher;

pub use chunking::{
    expand_all, expand_chunks, ChunkExpander, ExpandChunks, PreparedJob, TransformContext,
};
pub use matcher::{task_name, ConfigMatcher};
