//! Task Graph File Loading
//!
//! Loads job templates, kind-dependency tasks and expansion configuration
//! from YAML files, and writes expanded chunks back out as YAML or JSON.

use std::error::Error;
use std::fs;
use std::str::FromStr;

use log::{debug, info};

use super::config::ExpandConfig;
use super::model::{ChunkTask, JobTemplate, KindDependencies, Task};
use super::validator::validate_jobs;

/// Serialization format for expanded chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(format!("Unknown output format: '{}' (expected yaml or json)", other)),
        }
    }
}

/// Reads a file with a descriptive error.
fn read_file(path: &str, what: &str) -> Result<String, String> {
    let content = fs::read_to_string(path).map_err(|e| {
        format!(
            "Failed to read {} file '{}': {}. Check that the file exists and is readable.",
            what, path, e
        )
    })?;
    debug!("{} content loaded ({} bytes)", what, content.len());
    Ok(content)
}

/// Loads and validates job templates from a YAML sequence.
///
/// # Example
///
/// ```rust,no_run
/// use uvchunk::taskgraph::load_jobs;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let jobs = load_jobs("update-verify-jobs.yml")?;
///     println!("Loaded {} jobs", jobs.len());
///     Ok(())
/// }
/// ```
pub fn load_jobs(path: &str) -> Result<Vec<JobTemplate>, Box<dyn Error>> {
    info!("Loading job templates from: {}", path);

    let yaml_content = read_file(path, "jobs")?;
    let jobs: Vec<JobTemplate> = serde_yaml::from_str(&yaml_content).map_err(|e| {
        format!("Failed to parse jobs YAML: {}. Check the file format.", e)
    })?;

    validate_jobs(&jobs)?;

    info!("Parsed {} job templates", jobs.len());
    Ok(jobs)
}

/// Loads resolved kind-dependency tasks from a YAML sequence.
pub fn load_kind_dependencies(path: &str) -> Result<KindDependencies, Box<dyn Error>> {
    info!("Loading kind dependencies from: {}", path);

    let yaml_content = read_file(path, "dependencies")?;
    let tasks: Vec<Task> = serde_yaml::from_str(&yaml_content).map_err(|e| {
        format!("Failed to parse dependencies YAML: {}. Check the file format.", e)
    })?;

    let dependencies = index_by_label(tasks)?;
    info!("Parsed {} dependency tasks", dependencies.len());
    Ok(dependencies)
}

/// Indexes tasks by label, rejecting duplicate labels.
pub fn index_by_label(tasks: Vec<Task>) -> Result<KindDependencies, String> {
    let mut dependencies = KindDependencies::new();

    for task in tasks {
        if dependencies.contains_key(&task.label) {
            return Err(format!("Duplicate dependency task label: '{}'", task.label));
        }
        dependencies.insert(task.label.clone(), task);
    }

    Ok(dependencies)
}

/// Loads an expansion configuration override file.
pub fn load_config(path: &str) -> Result<ExpandConfig, Box<dyn Error>> {
    info!("Loading expansion config from: {}", path);

    let yaml_content = read_file(path, "config")?;
    let config: ExpandConfig = serde_yaml::from_str(&yaml_content)
        .map_err(|e| format!("Failed to parse config YAML: {}", e))?;

    Ok(config)
}

/// Renders chunks in the requested format.
pub fn render_chunks(chunks: &[ChunkTask], format: OutputFormat) -> Result<String, Box<dyn Error>> {
    let rendered = match format {
        OutputFormat::Yaml => serde_yaml::to_string(chunks)?,
        OutputFormat::Json => serde_json::to_string_pretty(chunks)?,
    };
    Ok(rendered)
}

/// Saves chunks to a file.
///
/// # Arguments
///
/// * `chunks` - The expanded chunks
/// * `path` - Output file path
/// * `format` - YAML or JSON
pub fn save_chunks(
    chunks: &[ChunkTask],
    path: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn Error>> {
    let content = render_chunks(chunks, format)?;
    fs::write(path, content)?;
    info!("Saved {} chunks to: {}", chunks.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("yaml".parse::<OutputFormat>(), Ok(OutputFormat::Yaml));
        assert_eq!("YML".parse::<OutputFormat>(), Ok(OutputFormat::Yaml));
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("toml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_load_jobs_file_not_found() {
        let result = load_jobs("/nonexistent/path/jobs.yml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_jobs_valid_yaml() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("jobs.yml");
        let yaml_content = r#"
- name: firefox-linux64
  extra:
    chunks: 2
  treeherder:
    symbol: UV(UV)
"#;
        fs::write(&path, yaml_content).unwrap();

        let jobs = load_jobs(path.to_str().unwrap()).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name, "firefox-linux64");
    }

    #[test]
    fn test_load_jobs_rejects_invalid_jobs() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("jobs.yml");
        fs::write(&path, "- name: foo\n  extra:\n    chunks: -1\n").unwrap();

        let err = load_jobs(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("foo"));
    }

    #[test]
    fn test_load_jobs_invalid_yaml() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("bad.yml");
        fs::write(&path, "this is not valid yaml: [[[").unwrap();

        assert!(load_jobs(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_load_kind_dependencies() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("deps.yml");
        let yaml_content = r#"
- kind: release-update-verify-config
  label: release-update-verify-config-firefox-linux64
  task:
    extra:
      channel: beta
"#;
        fs::write(&path, yaml_content).unwrap();

        let deps = load_kind_dependencies(path.to_str().unwrap()).unwrap();
        let task = &deps["release-update-verify-config-firefox-linux64"];
        assert_eq!(task.channel().unwrap(), "beta");
    }

    #[test]
    fn test_index_by_label_duplicate() {
        let tasks = vec![
            Task::new("release-update-verify-config", "same"),
            Task::new("release-update-verify-config", "same"),
        ];
        assert!(index_by_label(tasks).is_err());
    }

    #[test]
    fn test_load_config_override() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.yml");
        fs::write(&path, "label-prefix: staging-update-verify\n").unwrap();

        let config = load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config.label_prefix, "staging-update-verify");
        assert_eq!(config.config_artifact, "update-verify.cfg");
    }

    #[test]
    fn test_render_empty_json() {
        let rendered = render_chunks(&[], OutputFormat::Json).unwrap();
        assert_eq!(rendered, "[]");
    }
}
