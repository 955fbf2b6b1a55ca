//! Job Template Validation
//!
//! Checks job templates before expansion:
//! - Job names are present and unique
//! - Chunk counts are well-formed
//! - Treeherder symbols are present and parseable

use std::collections::HashSet;

use log::{debug, info, warn};

use super::model::JobTemplate;
use super::treeherder::TreeherderSymbol;

/// Validation error types for user-friendly error messages.
#[derive(Debug, Clone)]
pub enum ValidationError {
    EmptyJobName,
    DuplicateJobName(String),
    ChunkCount(String),
    MissingSymbol(String),
    MalformedSymbol { job: String, symbol: String },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyJobName => write!(f, "Job has empty or whitespace-only name"),
            Self::DuplicateJobName(name) => write!(f, "Duplicate job name: '{}'", name),
            Self::ChunkCount(message) => write!(f, "{}", message),
            Self::MissingSymbol(job) => write!(f, "Job '{}' has no treeherder symbol", job),
            Self::MalformedSymbol { job, symbol } => {
                write!(f, "Job '{}': malformed treeherder symbol '{}'", job, symbol)
            }
        }
    }
}

/// Validates a single job template's fields.
fn validate_job(job: &JobTemplate) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if job.name.trim().is_empty() {
        errors.push(ValidationError::EmptyJobName);
        return errors;
    }

    match job.chunk_count() {
        Ok(0) => {
            // No chunk ever carries the symbol.
            warn!("Job '{}' has zero chunks and will produce no tasks", job.name);
            return errors;
        }
        Ok(count) => debug!("Job '{}' declares {} chunks", job.name, count),
        Err(e) => errors.push(ValidationError::ChunkCount(e.to_string())),
    }

    match job.symbol() {
        None => errors.push(ValidationError::MissingSymbol(job.name.clone())),
        Some(symbol) if TreeherderSymbol::parse(symbol).is_none() => {
            errors.push(ValidationError::MalformedSymbol {
                job: job.name.clone(),
                symbol: symbol.to_string(),
            });
        }
        Some(_) => {}
    }

    errors
}

/// Validates a list of job templates.
///
/// All problems are collected and reported together, one per line.
/// An empty list is valid and simply expands to nothing.
pub fn validate_jobs(jobs: &[JobTemplate]) -> Result<(), String> {
    info!("Validating {} job templates", jobs.len());

    if jobs.is_empty() {
        warn!("No job templates to expand");
        return Ok(());
    }

    let mut seen_names: HashSet<&str> = HashSet::new();
    let mut all_errors = Vec::new();

    for job in jobs {
        if !job.name.trim().is_empty() && !seen_names.insert(job.name.as_str()) {
            all_errors.push(ValidationError::DuplicateJobName(job.name.clone()));
        }
        all_errors.extend(validate_job(job));
    }

    if !all_errors.is_empty() {
        let error_messages: Vec<String> = all_errors.iter().map(|e| e.to_string()).collect();
        return Err(error_messages.join("\n"));
    }

    info!("Job templates validated: {} jobs", jobs.len());
    Ok(())
}
