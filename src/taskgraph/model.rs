//! Task Data Model
//!
//! Typed views over the loosely structured task descriptions exchanged with
//! the task graph. Fields the transform does not touch are carried through
//! verbatim in flattened maps.
//!
//! # Example YAML Format
//!
//! ```yaml
//! - name: firefox-linux64
//!   extra:
//!     chunks: 12
//!   worker:
//!     docker-image: update-verify
//!     max-run-time: 7200
//!   fetches:
//!     toolchain:
//!       - linux64-libdmg
//!   treeherder:
//!     symbol: UV(UV)
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, TransformError};

/// Fetch specification: upstream label -> artifacts staged before the run.
pub type Fetches = IndexMap<String, Vec<FetchEntry>>;

/// Resolved kind-dependency tasks, keyed by label.
pub type KindDependencies = IndexMap<String, Task>;

/// One artifact in a fetch list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum FetchEntry {
    /// Plain artifact name
    Artifact(String),
    /// Artifact with extra fetch options (`extract`, `dest`, ...)
    Detailed {
        artifact: String,
        #[serde(flatten)]
        options: Map<String, Value>,
    },
}

impl FetchEntry {
    /// Returns the artifact name if this entry is a plain name.
    pub fn as_artifact_name(&self) -> Option<&str> {
        match self {
            Self::Artifact(name) => Some(name),
            Self::Detailed { .. } => None,
        }
    }
}

impl From<&str> for FetchEntry {
    fn from(name: &str) -> Self {
        Self::Artifact(name.to_string())
    }
}

/// Worker section of a task description.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct WorkerSpec {
    /// Environment variables for the task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Map<String, Value>>,

    /// Everything else (docker-image, max-run-time, ...)
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl WorkerSpec {
    /// Returns the environment mapping, creating it if absent.
    pub fn env_mut(&mut self) -> &mut Map<String, Value> {
        self.env.get_or_insert_with(Map::new)
    }

    /// Looks up a string environment variable.
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env.as_ref()?.get(key)?.as_str()
    }
}

/// Treeherder display block of a task description.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Treeherder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// An unexpanded update-verify job as produced by earlier transforms.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JobTemplate {
    /// Job name; matched against config task names
    pub name: String,

    /// Label of the unexpanded job (replaced per chunk)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Free-form extra data; `chunks` holds the total chunk count
    #[serde(default)]
    pub extra: Map<String, Value>,

    #[serde(default)]
    pub worker: WorkerSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetches: Option<Fetches>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treeherder: Option<Treeherder>,

    /// Remaining task description fields, carried into every chunk
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl JobTemplate {
    /// Creates a job template with the given name and chunk count.
    ///
    /// # Example
    ///
    /// ```
    /// use uvchunk::taskgraph::JobTemplate;
    ///
    /// let job = JobTemplate::new("firefox-linux64", 4)
    ///     .with_symbol("UV(UV)")
    ///     .with_fetch("toolchain", &["linux64-libdmg"]);
    /// assert_eq!(job.chunk_count().unwrap(), 4);
    /// ```
    pub fn new(name: impl Into<String>, chunks: u32) -> Self {
        let mut extra = Map::new();
        extra.insert("chunks".to_string(), Value::from(chunks));
        Self {
            name: name.into(),
            label: None,
            extra,
            worker: WorkerSpec::default(),
            fetches: None,
            treeherder: None,
            attributes: Map::new(),
        }
    }

    /// Sets the treeherder symbol.
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.treeherder.get_or_insert_with(Treeherder::default).symbol = Some(symbol.into());
        self
    }

    /// Adds a fetch entry for an upstream label.
    pub fn with_fetch(mut self, label: impl Into<String>, artifacts: &[&str]) -> Self {
        self.fetches
            .get_or_insert_with(Fetches::new)
            .insert(label.into(), artifacts.iter().map(|a| FetchEntry::from(*a)).collect());
        self
    }

    /// Sets a worker environment variable.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.worker.env_mut().insert(key.into(), Value::String(value.into()));
        self
    }

    /// Reads the total chunk count from `extra.chunks`.
    ///
    /// Zero is a valid count. Negative, fractional and non-numeric values
    /// are rejected with an error naming the job.
    pub fn chunk_count(&self) -> Result<u32> {
        let value = self
            .extra
            .get("chunks")
            .ok_or_else(|| TransformError::MissingChunkCount {
                job: self.name.clone(),
            })?;

        value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| TransformError::InvalidChunkCount {
                job: self.name.clone(),
                value: value.to_string(),
            })
    }

    /// Returns the treeherder symbol, if any.
    pub fn symbol(&self) -> Option<&str> {
        self.treeherder.as_ref()?.symbol.as_deref()
    }
}

/// A resolved task from a kind this transform depends on.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    pub kind: String,
    pub label: String,

    #[serde(default)]
    pub attributes: Map<String, Value>,

    /// Full task definition; `extra` carries channel and treeherder data
    #[serde(default)]
    pub task: Value,
}

impl Task {
    /// Creates a task with an empty definition.
    pub fn new(kind: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            label: label.into(),
            attributes: Map::new(),
            task: Value::Object(Map::new()),
        }
    }

    /// Sets a task attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Sets a key under the task definition's `extra` section.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        if !self.task.is_object() {
            self.task = Value::Object(Map::new());
        }
        if let Value::Object(definition) = &mut self.task {
            let extra = definition
                .entry("extra")
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(extra) = extra {
                extra.insert(key.into(), value);
            }
        }
        self
    }

    /// Release channel published under `extra.channel`.
    pub fn channel(&self) -> Result<&str> {
        self.task
            .pointer("/extra/channel")
            .and_then(Value::as_str)
            .ok_or_else(|| TransformError::MissingField {
                label: self.label.clone(),
                field: "extra.channel".to_string(),
            })
    }

    /// Treeherder machine platform, empty if unset.
    pub fn treeherder_platform(&self) -> &str {
        self.task
            .pointer("/extra/treeherder/machine/platform")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// First treeherder collection name (e.g. `opt`).
    pub fn treeherder_collection(&self) -> Option<&str> {
        self.task
            .pointer("/extra/treeherder/collection")
            .and_then(Value::as_object)
            .and_then(|collection| collection.keys().next())
            .map(String::as_str)
    }

    pub fn treeherder_tier(&self) -> Option<u32> {
        self.task
            .pointer("/extra/treeherder/tier")
            .and_then(Value::as_u64)
            .and_then(|tier| u32::try_from(tier).ok())
    }
}

/// The `run` section of a chunk.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct RunSpec {
    pub using: String,
    pub cwd: String,
    pub command: String,
    pub sparse_profile: String,
}

/// One concrete, independently schedulable chunk of an update-verify job.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChunkTask {
    pub label: String,
    pub name: String,

    #[serde(default)]
    pub extra: Map<String, Value>,

    #[serde(default)]
    pub worker: WorkerSpec,

    #[serde(default)]
    pub fetches: Fetches,

    #[serde(default)]
    pub treeherder: Treeherder,

    pub run: RunSpec,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,

    /// 1-based ordinal of this chunk (not serialized)
    #[serde(skip)]
    pub this_chunk: u32,

    /// Total chunks of the job (not serialized)
    #[serde(skip)]
    pub total_chunks: u32,

    /// Command tokens before joining into `run.command` (not serialized)
    #[serde(skip)]
    pub command: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_template_creation() {
        let job = JobTemplate::new("foo", 2)
            .with_symbol("UV(UV)")
            .with_env("FOO", "bar");

        assert_eq!(job.name, "foo");
        assert_eq!(job.chunk_count().unwrap(), 2);
        assert_eq!(job.symbol(), Some("UV(UV)"));
        assert_eq!(job.worker.env_var("FOO"), Some("bar"));
    }

    #[test]
    fn test_job_template_name_is_kept_verbatim() {
        let built = JobTemplate::new(" foo ", 1);
        let loaded: JobTemplate = serde_yaml::from_str("name: ' foo '\nextra: {chunks: 1}\n").unwrap();
        assert_eq!(built.name, " foo ");
        assert_eq!(built.name, loaded.name);
    }

    #[test]
    fn test_chunk_count_zero_is_valid() {
        let job = JobTemplate::new("foo", 0);
        assert_eq!(job.chunk_count().unwrap(), 0);
    }

    #[test]
    fn test_chunk_count_missing() {
        let mut job = JobTemplate::new("foo", 1);
        job.extra.clear();
        assert_eq!(
            job.chunk_count(),
            Err(TransformError::MissingChunkCount {
                job: "foo".to_string()
            })
        );
    }

    #[test]
    fn test_chunk_count_rejects_negative_and_fractional() {
        for bad in [json!(-1), json!(2.5), json!("3"), json!(null)] {
            let mut job = JobTemplate::new("foo", 1);
            job.extra.insert("chunks".to_string(), bad);
            let err = job.chunk_count().unwrap_err();
            assert!(matches!(err, TransformError::InvalidChunkCount { .. }));
        }
    }

    #[test]
    fn test_job_template_parses_loose_yaml() {
        let yaml = r#"
name: firefox-linux64
label: release-update-verify-firefox-linux64
description: verify updates
extra:
  chunks: 3
worker:
  docker-image: update-verify
fetches:
  toolchain:
    - linux64-libdmg
    - artifact: linux64-hfsplus
      extract: false
treeherder:
  symbol: UV(UV)
  kind: test
"#;
        let job: JobTemplate = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(job.chunk_count().unwrap(), 3);
        assert!(job.worker.env.is_none());
        assert_eq!(job.worker.settings["docker-image"], json!("update-verify"));
        assert_eq!(job.attributes["description"], json!("verify updates"));

        let toolchain = &job.fetches.as_ref().unwrap()["toolchain"];
        assert_eq!(toolchain[0].as_artifact_name(), Some("linux64-libdmg"));
        assert_eq!(toolchain[1].as_artifact_name(), None);
        assert_eq!(job.treeherder.unwrap().kind.as_deref(), Some("test"));
    }

    #[test]
    fn test_worker_env_mut_creates_mapping() {
        let mut worker = WorkerSpec::default();
        assert!(worker.env.is_none());
        worker.env_mut();
        assert_eq!(worker.env, Some(Map::new()));
    }

    #[test]
    fn test_task_accessors() {
        let task = Task::new("release-update-verify-config", "release-update-verify-config-foo")
            .with_extra("channel", json!("beta"))
            .with_extra(
                "treeherder",
                json!({
                    "machine": {"platform": "linux64"},
                    "collection": {"opt": true},
                    "tier": 2
                }),
            );

        assert_eq!(task.channel().unwrap(), "beta");
        assert_eq!(task.treeherder_platform(), "linux64");
        assert_eq!(task.treeherder_collection(), Some("opt"));
        assert_eq!(task.treeherder_tier(), Some(2));
    }

    #[test]
    fn test_task_missing_channel() {
        let task = Task::new("release-update-verify-config", "cfg");
        let err = task.channel().unwrap_err();
        assert!(err.to_string().contains("extra.channel"));
        assert!(err.to_string().contains("cfg"));
    }

    #[test]
    fn test_task_defaults_without_treeherder() {
        let task = Task::new("release-update-verify-config", "cfg");
        assert_eq!(task.treeherder_platform(), "");
        assert!(task.treeherder_collection().is_none());
        assert!(task.treeherder_tier().is_none());
    }
}
