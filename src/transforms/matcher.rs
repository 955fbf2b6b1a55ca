//! Config Task Matching
//!
//! Binds each update-verify job to the config task that publishes its
//! channel and `update-verify.cfg`. Binding is by name: a config task's
//! name is its label without the `<kind>-` prefix.

use std::collections::HashMap;

use log::debug;

use crate::error::{Result, TransformError};
use crate::taskgraph::{ExpandConfig, Task};

/// Derives a task's name from its label.
///
/// The name is the label without the `<kind>-` prefix. Tasks whose label
/// does not carry that prefix may publish their name as a `name` attribute.
///
/// # Example
/// ```
/// use uvchunk::taskgraph::Task;
/// use uvchunk::transforms::matcher::task_name;
///
/// let task = Task::new("release-update-verify-config", "release-update-verify-config-firefox-linux64");
/// assert_eq!(task_name(&task).unwrap(), "firefox-linux64");
/// ```
pub fn task_name(task: &Task) -> Result<&str> {
    task.label
        .strip_prefix(task.kind.as_str())
        .and_then(|rest| rest.strip_prefix('-'))
        .or_else(|| task.attributes.get("name").and_then(|name| name.as_str()))
        .ok_or_else(|| TransformError::UnnamedTask {
            label: task.label.clone(),
            kind: task.kind.clone(),
        })
}

/// Name -> config task lookup built once per transform run.
#[derive(Debug, Clone)]
pub struct ConfigMatcher<'a> {
    by_name: HashMap<&'a str, &'a Task>,
}

impl<'a> ConfigMatcher<'a> {
    /// Builds the lookup from every dependency whose kind is a config kind.
    ///
    /// Two config tasks deriving the same name is an error rather than a
    /// silent overwrite.
    pub fn new<I>(dependencies: I, config: &ExpandConfig) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let mut by_name: HashMap<&'a str, &'a Task> = HashMap::new();

        for dep in dependencies {
            if !config.is_config_kind(&dep.kind) {
                continue;
            }

            let name = task_name(dep)?;
            if let Some(existing) = by_name.insert(name, dep) {
                return Err(TransformError::DuplicateConfigTask {
                    name: name.to_string(),
                    first: existing.label.clone(),
                    second: dep.label.clone(),
                });
            }
            debug!("Config task '{}' provides job '{}'", dep.label, name);
        }

        Ok(Self { by_name })
    }

    /// Returns the config task bound to a job name.
    pub fn lookup(&self, job_name: &str) -> Result<&'a Task> {
        self.by_name
            .get(job_name)
            .copied()
            .ok_or_else(|| TransformError::NoConfigTask {
                job: job_name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
