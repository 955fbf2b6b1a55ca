//! uvchunk - Release Update-Verify Chunk Expansion
//!
//! Turns release update-verify job templates into concrete, independently
//! schedulable chunk tasks. Each job is bound to the config task that
//! publishes its channel and `update-verify.cfg`, then fanned out into
//! `extra.chunks` copies that each verify one slice of the update matrix.
//!
//! # Architecture
//!
//! The library is organized into two main modules:
//!
//! - [`taskgraph`]: Task description types, YAML loading and validation
//! - [`transforms`]: Config task matching and chunk expansion
//!
//! # Example
//!
//! ```rust,no_run
//! use uvchunk::taskgraph::{load_jobs, load_kind_dependencies};
//! use uvchunk::transforms::{expand_all, TransformContext};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let jobs = load_jobs("update-verify.yml")?;
//!     let deps = load_kind_dependencies("update-verify-config.yml")?;
//!
//!     let ctx = TransformContext::new(deps);
//!     for chunk in expand_all(&ctx, jobs)? {
//!         println!("{}: {}", chunk.label, chunk.run.command);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod taskgraph;
pub mod transforms;

// Re-export commonly used types
pub use error::{Result, TransformError};
pub use taskgraph::model::{ChunkTask, JobTemplate, Task};
pub use transforms::{expand_all, expand_chunks, TransformContext};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "uvchunk";
