//! Chunk Command Assembly
//!
//! Builds the `chunked-verify.sh` invocation for one chunk. The two chunk
//! flags travel as a single token because the script receives the command
//! as one joined string.

use crate::taskgraph::{ExpandConfig, Fetches, RunSpec};

/// Returns true if the toolchain fetches include the dmg tool.
///
/// Exact name membership only; detailed fetch entries never match.
pub fn needs_dmg_path_override(fetches: &Fetches, config: &ExpandConfig) -> bool {
    fetches
        .get(&config.toolchain_fetch_key)
        .map(|entries| {
            entries
                .iter()
                .any(|entry| entry.as_artifact_name() == Some(config.dmg_toolchain.as_str()))
        })
        .unwrap_or(false)
}

/// Command tokens for chunk `this_chunk` of `total_chunks`.
///
/// # Example
/// ```
/// use uvchunk::taskgraph::ExpandConfig;
/// use uvchunk::transforms::command::chunk_command;
///
/// let command = chunk_command(&ExpandConfig::default(), 4, 2, false);
/// assert_eq!(command, vec![
///     "tools/update-verify/scripts/chunked-verify.sh",
///     "--total-chunks=4 --this-chunk=2",
/// ]);
/// ```
pub fn chunk_command(
    config: &ExpandConfig,
    total_chunks: u32,
    this_chunk: u32,
    dmg_path_override: bool,
) -> Vec<String> {
    let mut command = Vec::with_capacity(3);

    // Put the fetched dmg tool on PATH
    if dmg_path_override {
        command.push(config.dmg_path_override.clone());
    }
    command.push(config.chunk_script.clone());
    command.push(format!(
        "--total-chunks={} --this-chunk={}",
        total_chunks, this_chunk
    ));

    command
}

/// Wraps command tokens into a run-task descriptor.
pub fn run_spec(config: &ExpandConfig, command: &[String]) -> RunSpec {
    RunSpec {
        using: config.run_using.clone(),
        cwd: config.run_cwd.clone(),
        command: command.join(" "),
        sparse_profile: config.sparse_profile.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taskgraph::FetchEntry;
    use serde_json::Map;

    fn toolchain(entries: Vec<FetchEntry>) -> Fetches {
        let mut fetches = Fetches::new();
        fetches.insert("toolchain".to_string(), entries);
        fetches
    }

    #[test]
    fn test_command_without_override() {
        let command = chunk_command(&ExpandConfig::default(), 2, 1, false);
        assert_eq!(
            command,
            vec![
                "tools/update-verify/scripts/chunked-verify.sh",
                "--total-chunks=2 --this-chunk=1"
            ]
        );
    }

    #[test]
    fn test_command_with_override_differs_by_leading_token() {
        let config = ExpandConfig::default();
        let plain = chunk_command(&config, 12, 7, false);
        let with_dmg = chunk_command(&config, 12, 7, true);

        assert_eq!(with_dmg[0], "export PATH=$PATH:$MOZ_FETCHES_DIR/dmg &&");
        assert_eq!(&with_dmg[1..], plain.as_slice());
    }

    #[test]
    fn test_no_zero_padding() {
        let command = chunk_command(&ExpandConfig::default(), 100, 9, false);
        assert_eq!(command[1], "--total-chunks=100 --this-chunk=9");
    }

    #[test]
    fn test_run_spec_joins_tokens() {
        let config = ExpandConfig::default();
        let run = run_spec(&config, &chunk_command(&config, 3, 3, true));

        assert_eq!(run.using, "run-task");
        assert_eq!(run.cwd, "{checkout}");
        assert_eq!(run.sparse_profile, "update-verify");
        assert_eq!(
            run.command,
            "export PATH=$PATH:$MOZ_FETCHES_DIR/dmg && \
             tools/update-verify/scripts/chunked-verify.sh --total-chunks=3 --this-chunk=3"
        );
    }

    #[test]
    fn test_dmg_detection() {
        let config = ExpandConfig::default();

        assert!(needs_dmg_path_override(
            &toolchain(vec!["linux64-libdmg".into()]),
            &config
        ));
        assert!(needs_dmg_path_override(
            &toolchain(vec!["linux64-hfsplus".into(), "linux64-libdmg".into()]),
            &config
        ));
        assert!(!needs_dmg_path_override(
            &toolchain(vec!["linux64-libdmg-extra".into()]),
            &config
        ));
        assert!(!needs_dmg_path_override(&Fetches::new(), &config));
    }

    #[test]
    fn test_dmg_detection_ignores_other_fetch_keys() {
        let mut fetches = Fetches::new();
        fetches.insert("build".to_string(), vec!["linux64-libdmg".into()]);
        assert!(!needs_dmg_path_override(&fetches, &ExpandConfig::default()));
    }

    #[test]
    fn test_dmg_detection_ignores_detailed_entries() {
        let entry = FetchEntry::Detailed {
            artifact: "linux64-libdmg".to_string(),
            options: Map::new(),
        };
        assert!(!needs_dmg_path_override(
            &toolchain(vec![entry]),
            &ExpandConfig::default()
        ));
    }
}
