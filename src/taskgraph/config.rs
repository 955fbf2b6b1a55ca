//! Expansion Configuration
//!
//! The fixed strings the chunking transform writes into every chunk.
//! Defaults reproduce the command line expected by
//! `chunked-verify.sh`; a YAML file may override individual values.
//!
//! # Example YAML Format
//!
//! ```yaml
//! sparse-profile: update-verify
//! config-kinds:
//!   - update-verify-config
//!   - update-verify-next-config
//! ```

use serde::{Deserialize, Serialize};

/// Prefix of every generated chunk label.
pub const LABEL_PREFIX: &str = "release-update-verify";

/// Script that runs one chunk of update verification.
pub const CHUNKED_VERIFY_SCRIPT: &str = "tools/update-verify/scripts/chunked-verify.sh";

/// Artifact published by the update-verify config task.
pub const CONFIG_ARTIFACT: &str = "update-verify.cfg";

pub const RUN_USING: &str = "run-task";
pub const RUN_CWD: &str = "{checkout}";
pub const SPARSE_PROFILE: &str = "update-verify";

/// Fetch category inspected for the dmg tool.
pub const TOOLCHAIN_FETCH_KEY: &str = "toolchain";

/// Toolchain artifact that provides the `dmg` binary.
pub const DMG_TOOLCHAIN: &str = "linux64-libdmg";

/// Prepended to the command when the dmg toolchain is fetched.
pub const DMG_PATH_OVERRIDE: &str = "export PATH=$PATH:$MOZ_FETCHES_DIR/dmg &&";

/// Kind substrings whose tasks are update-verify config producers.
pub const CONFIG_KINDS: &[&str] = &["update-verify-config", "update-verify-next-config"];

/// Values written into chunk labels, commands and run descriptors.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ExpandConfig {
    pub label_prefix: String,
    pub chunk_script: String,
    pub config_artifact: String,
    pub run_using: String,
    pub run_cwd: String,
    pub sparse_profile: String,
    pub toolchain_fetch_key: String,
    pub dmg_toolchain: String,
    pub dmg_path_override: String,
    pub config_kinds: Vec<String>,
}

impl Default for ExpandConfig {
    fn default() -> Self {
        Self {
            label_prefix: LABEL_PREFIX.to_string(),
            chunk_script: CHUNKED_VERIFY_SCRIPT.to_string(),
            config_artifact: CONFIG_ARTIFACT.to_string(),
            run_using: RUN_USING.to_string(),
            run_cwd: RUN_CWD.to_string(),
            sparse_profile: SPARSE_PROFILE.to_string(),
            toolchain_fetch_key: TOOLCHAIN_FETCH_KEY.to_string(),
            dmg_toolchain: DMG_TOOLCHAIN.to_string(),
            dmg_path_override: DMG_PATH_OVERRIDE.to_string(),
            config_kinds: CONFIG_KINDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl ExpandConfig {
    /// Returns true if tasks of this kind produce update-verify configs.
    pub fn is_config_kind(&self, kind: &str) -> bool {
        self.config_kinds.iter().any(|k| kind.contains(k.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_kind_matching() {
        let config = ExpandConfig::default();
        assert!(config.is_config_kind("release-update-verify-config"));
        assert!(config.is_config_kind("release-update-verify-next-config"));
        assert!(!config.is_config_kind("release-update-verify"));
        assert!(!config.is_config_kind("build"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: ExpandConfig = serde_yaml::from_str("sparse-profile: custom\n").unwrap();
        assert_eq!(config.sparse_profile, "custom");
        assert_eq!(config.chunk_script, CHUNKED_VERIFY_SCRIPT);
        assert_eq!(config.config_kinds.len(), 2);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: Result<ExpandConfig, _> = serde_yaml::from_str("chunk-scrpit: typo.sh\n");
        assert!(result.is_err());
    }
}
