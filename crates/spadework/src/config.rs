//! Host Configuration
//!
//! Defines the structure of the host config file on disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HostError, Result};

/// When a reload's compiled unit becomes the cached last-good one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitPolicy {
    /// Commit only after compile and execute both succeed.
    #[default]
    AfterExecute,
    /// Legacy compatibility: commit any successfully compiled unit, even if
    /// execution subsequently faults.
    OnCompile,
}

/// Host configuration (spadework.toml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Directory scanned and watched for scripts, non-recursive.
    #[serde(default = "default_scripts_dir")]
    pub scripts_dir: PathBuf,

    /// Script file extension, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default)]
    pub commit: CommitPolicy,

    /// Fire the simulated connection sequence after every successful reload.
    #[serde(default = "default_true")]
    pub simulate_connect: bool,

    /// Delay before a denied simulated connection is kicked.
    #[serde(default = "default_kick_delay_ms")]
    pub kick_delay_ms: u64,
}

fn default_scripts_dir() -> PathBuf {
    PathBuf::from("./scripts")
}

fn default_extension() -> String {
    "js".to_string()
}

fn default_true() -> bool {
    true
}

fn default_kick_delay_ms() -> u64 {
    250
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            scripts_dir: default_scripts_dir(),
            extension: default_extension(),
            commit: CommitPolicy::default(),
            simulate_connect: true,
            kick_delay_ms: default_kick_delay_ms(),
        }
    }
}

impl HostConfig {
    /// Load the config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| HostError::Config(format!("invalid config: {e}")))
    }

    /// Config rooted at `dir` with everything else defaulted.
    pub fn for_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            scripts_dir: dir.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = HostConfig::default();
        assert_eq!(config.extension, "js");
        assert_eq!(config.commit, CommitPolicy::AfterExecute);
        assert!(config.simulate_connect);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            scripts_dir = "/srv/game/scripts"
            commit = "on-compile"
            "#
        )
        .unwrap();

        let config = HostConfig::load(file.path()).unwrap();
        assert_eq!(config.scripts_dir, PathBuf::from("/srv/game/scripts"));
        assert_eq!(config.commit, CommitPolicy::OnCompile);
        // Unspecified fields keep their defaults
        assert_eq!(config.extension, "js");
        assert_eq!(config.kick_delay_ms, 250);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not toml at all [[[").unwrap();
        assert!(matches!(
            HostConfig::load(file.path()),
            Err(HostError::Config(_))
        ));
    }
}
