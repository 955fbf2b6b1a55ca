//! Update-Verify Chunk Expansion
//!
//! Fans each update-verify job out into `extra.chunks` concrete tasks:
//! 1. Bind the job to its config task by name
//! 2. Apply the shared changes once (`CHANNEL`, config fetch, treeherder)
//! 3. Clone the prepared job per chunk and set label, symbol and command
//!
//! Expansion is lazy; chunks are built as the caller pulls them.

use std::iter::FusedIterator;
use std::ops::RangeInclusive;

use log::{debug, info, warn};
use serde_json::Value;

use super::command::{chunk_command, needs_dmg_path_override, run_spec};
use super::matcher::ConfigMatcher;
use crate::error::{Result, TransformError};
use crate::taskgraph::{
    inherit_treeherder_from_dep, ChunkTask, ExpandConfig, FetchEntry, Fetches, JobTemplate,
    KindDependencies, TreeherderSymbol,
};

/// Environment variable carrying the release channel.
pub const CHANNEL_ENV: &str = "CHANNEL";

/// Inputs the host task graph hands to the transform.
#[derive(Debug, Clone, Default)]
pub struct TransformContext {
    /// Resolved tasks of the kinds this transform depends on
    pub kind_dependencies: KindDependencies,
    pub config: ExpandConfig,
}

impl TransformContext {
    /// Creates a context with the default expansion config.
    pub fn new(kind_dependencies: KindDependencies) -> Self {
        Self {
            kind_dependencies,
            config: ExpandConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ExpandConfig) -> Self {
        self.config = config;
        self
    }
}

/// A job with all job-level changes applied, ready to be cloned per chunk.
#[derive(Debug, Clone)]
pub struct PreparedJob<'a> {
    template: JobTemplate,
    /// Base symbol; `None` only for jobs with zero chunks
    symbol: Option<TreeherderSymbol>,
    total_chunks: u32,
    dmg_path_override: bool,
    config: &'a ExpandConfig,
}

impl<'a> PreparedJob<'a> {
    pub fn name(&self) -> &str {
        &self.template.name
    }

    pub fn total_chunks(&self) -> u32 {
        self.total_chunks
    }

    /// Whether chunk commands get the dmg `PATH` prefix.
    pub fn needs_dmg_path_override(&self) -> bool {
        self.dmg_path_override
    }

    /// The shared template every chunk is cloned from.
    pub fn template(&self) -> &JobTemplate {
        &self.template
    }

    /// Builds chunk `this_chunk` (1-based) as an independent copy.
    pub fn chunk(&self, this_chunk: u32) -> ChunkTask {
        let JobTemplate {
            name,
            extra,
            mut worker,
            fetches,
            treeherder,
            attributes,
            ..
        } = self.template.clone();

        let mut treeherder = treeherder.unwrap_or_default();
        if let Some(symbol) = &self.symbol {
            treeherder.symbol = Some(symbol.with_suffix(this_chunk).to_string());
        }

        let label = format!(
            "{}-{}-{}/{}",
            self.config.label_prefix, name, this_chunk, self.total_chunks
        );

        worker.env_mut();

        let command = chunk_command(
            self.config,
            self.total_chunks,
            this_chunk,
            self.dmg_path_override,
        );
        let run = run_spec(self.config, &command);

        debug!("Built chunk '{}': {}", label, run.command);

        ChunkTask {
            label,
            name,
            extra,
            worker,
            fetches: fetches.unwrap_or_default(),
            treeherder,
            run,
            attributes,
            this_chunk,
            total_chunks: self.total_chunks,
            command,
        }
    }

    /// Iterates over every chunk in ordinal order.
    pub fn chunks(&self) -> impl Iterator<Item = ChunkTask> + '_ {
        (1..=self.total_chunks).map(move |this_chunk| self.chunk(this_chunk))
    }
}

/// Binds jobs to config tasks and prepares them for chunking.
#[derive(Debug, Clone)]
pub struct ChunkExpander<'a> {
    matcher: ConfigMatcher<'a>,
    config: &'a ExpandConfig,
}

impl<'a> ChunkExpander<'a> {
    /// Builds the config task lookup from the context's dependencies.
    pub fn new(ctx: &'a TransformContext) -> Result<Self> {
        let matcher = ConfigMatcher::new(ctx.kind_dependencies.values(), &ctx.config)?;
        info!("Found {} update-verify config tasks", matcher.len());

        Ok(Self {
            matcher,
            config: &ctx.config,
        })
    }

    /// Applies the job-level changes shared by all chunks of `job`.
    ///
    /// Fails before any chunk exists if the job has no config task or a bad
    /// chunk count. The treeherder symbol is only required when the job has
    /// at least one chunk.
    pub fn prepare(&self, mut job: JobTemplate) -> Result<PreparedJob<'a>> {
        let config_task = self.matcher.lookup(&job.name)?;
        let total_chunks = job.chunk_count()?;
        let channel = config_task.channel()?;

        job.worker
            .env_mut()
            .insert(CHANNEL_ENV.to_string(), Value::String(channel.to_string()));

        job.fetches.get_or_insert_with(Fetches::new).insert(
            config_task.label.clone(),
            vec![FetchEntry::from(self.config.config_artifact.as_str())],
        );

        let treeherder = inherit_treeherder_from_dep(&job, config_task)?;
        let symbol = if total_chunks == 0 {
            None
        } else {
            let raw_symbol =
                treeherder
                    .symbol
                    .as_deref()
                    .ok_or_else(|| TransformError::MissingSymbol {
                        job: job.name.clone(),
                    })?;
            let parsed = TreeherderSymbol::parse(raw_symbol).ok_or_else(|| {
                TransformError::MalformedSymbol {
                    job: job.name.clone(),
                    symbol: raw_symbol.to_string(),
                }
            })?;
            Some(parsed)
        };
        job.treeherder = Some(treeherder);

        let dmg_path_override = job
            .fetches
            .as_ref()
            .map(|fetches| needs_dmg_path_override(fetches, self.config))
            .unwrap_or(false);

        // The per-chunk label replaces this one.
        job.label = None;

        if total_chunks == 0 {
            warn!("Job '{}' has zero chunks; no tasks generated", job.name);
        } else {
            info!(
                "Expanding job '{}' into {} chunks (config '{}', channel '{}')",
                job.name, total_chunks, config_task.label, channel
            );
        }

        Ok(PreparedJob {
            template: job,
            symbol,
            total_chunks,
            dmg_path_override,
            config: self.config,
        })
    }

    /// Lazily expands a sequence of jobs into chunks.
    pub fn expand<I>(self, jobs: I) -> ExpandChunks<'a, I::IntoIter>
    where
        I: IntoIterator<Item = JobTemplate>,
    {
        ExpandChunks {
            expander: self,
            jobs: jobs.into_iter(),
            current: None,
            failed: false,
        }
    }
}

/// Lazy chunk stream over many jobs.
///
/// Yields chunks job by job in ordinal order. The first error is yielded
/// once and ends the stream.
pub struct ExpandChunks<'a, I> {
    expander: ChunkExpander<'a>,
    jobs: I,
    current: Option<(PreparedJob<'a>, RangeInclusive<u32>)>,
    failed: bool,
}

impl<'a, I> Iterator for ExpandChunks<'a, I>
where
    I: Iterator<Item = JobTemplate>,
{
    type Item = Result<ChunkTask>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            if let Some((job, ordinals)) = &mut self.current {
                if let Some(this_chunk) = ordinals.next() {
                    return Some(Ok(job.chunk(this_chunk)));
                }
                self.current = None;
            }

            let template = self.jobs.next()?;
            match self.expander.prepare(template) {
                Ok(job) => {
                    let ordinals = 1..=job.total_chunks();
                    self.current = Some((job, ordinals));
                }
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<'a, I> FusedIterator for ExpandChunks<'a, I> where I: Iterator<Item = JobTemplate> {}

/// Lazily expands `jobs` against the context's config tasks.
///
/// Fails up front if the config task pool itself is malformed.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use uvchunk::taskgraph::{JobTemplate, KindDependencies, Task};
/// use uvchunk::transforms::{expand_chunks, TransformContext};
///
/// let config_task = Task::new("release-update-verify-config", "release-update-verify-config-foo")
///     .with_extra("channel", json!("beta"))
///     .with_extra("treeherder", json!({"machine": {"platform": "linux64"}, "collection": {"opt": true}}));
/// let mut deps = KindDependencies::new();
/// deps.insert(config_task.label.clone(), config_task);
///
/// let ctx = TransformContext::new(deps);
/// let jobs = vec![JobTemplate::new("foo", 3).with_symbol("UV(UV)")];
///
/// let labels: Vec<String> = expand_chunks(&ctx, jobs)
///     .unwrap()
///     .map(|chunk| chunk.unwrap().label)
///     .collect();
/// assert_eq!(labels, vec![
///     "release-update-verify-foo-1/3",
///     "release-update-verify-foo-2/3",
///     "release-update-verify-foo-3/3",
/// ]);
/// ```
pub fn expand_chunks<I>(ctx: &TransformContext, jobs: I) -> Result<ExpandChunks<'_, I::IntoIter>>
where
    I: IntoIterator<Item = JobTemplate>,
{
    Ok(ChunkExpander::new(ctx)?.expand(jobs))
}

/// Expands every job, returning all chunks or the first error.
pub fn expand_all<I>(ctx: &TransformContext, jobs: I) -> Result<Vec<ChunkTask>>
where
    I: IntoIterator<Item = JobTemplate>,
{
    let chunks = expand_chunks(ctx, jobs)?.collect::<Result<Vec<_>>>()?;
    info!("Generated {} update-verify chunks", chunks.len());
    Ok(chunks)
}
