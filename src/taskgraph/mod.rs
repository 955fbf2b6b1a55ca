//! Task Graph Definitions
//!
//! Data structures and file handling for the task descriptions this crate
//! consumes and produces.
//!
//! # Structure
//!
//! - [`model`]: Job templates, dependency tasks, chunk tasks
//! - [`parser`]: YAML loading and chunk output
//! - [`validator`]: Job template checks
//! - [`treeherder`]: Symbol suffixing and inheritance
//! - [`config`]: Expansion constants and overrides

pub mod config;
pub mod model;
pub mod parser;
pub mod treeherder;
pub mod validator;

pub use config::ExpandConfig;
pub use model::{
    ChunkTask, FetchEntry, Fetches, JobTemplate, KindDependencies, RunSpec, Task, Treeherder,
    WorkerSpec,
};
pub use parser::{load_config, load_jobs, load_kind_dependencies, save_chunks, OutputFormat};
pub use treeherder::{add_suffix, inherit_treeherder_from_dep, TreeherderSymbol};
pub use validator::validate_jobs;
