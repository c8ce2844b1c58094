//! Build settings and environment access.
//!
//! [`BuildConfig`] holds the filesystem layout and runtime a build uses. Every
//! field has a default, so an empty JSON object is a valid configuration.
//!
//! [`EnvSource`] abstracts environment lookups for the runtime side:
//! [`ProcessEnv`] reads the real process environment, and a plain
//! `HashMap<String, String>` stands in for it in tests.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Environment entry set on every compute unit, holding the application name.
pub const APP_NAME_KEY: &str = "APP_NAME";

/// Filesystem layout and runtime settings for a build.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Shared code copied into the shared layer.
    pub shared_dir: PathBuf,
    /// Where prepared layer directories are written.
    pub layers_dir: PathBuf,
    /// Third-party requirements copied into the dependencies layer when present.
    pub requirements_file: PathBuf,
    /// Root of per-handler code directories (`{functions_dir}/api/{function}`, ...).
    pub functions_dir: PathBuf,
    /// Runtime identifier passed to every compute unit.
    pub runtime: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            shared_dir: PathBuf::from("shared"),
            layers_dir: PathBuf::from(".layers"),
            requirements_file: PathBuf::from("requirements.txt"),
            functions_dir: PathBuf::from("functions"),
            runtime: "provided.al2023".to_string(),
        }
    }
}

impl BuildConfig {
    /// Parses a JSON configuration; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Read-only view of environment variables.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = BuildConfig::from_json("{}").unwrap();
        assert_eq!(config, BuildConfig::default());
    }

    #[test]
    fn fields_override_defaults() {
        let config = BuildConfig::from_json(r#"{"layers_dir": "out/layers", "runtime": "python3.12"}"#)
            .unwrap();
        assert_eq!(config.layers_dir, PathBuf::from("out/layers"));
        assert_eq!(config.runtime, "python3.12");
        assert_eq!(config.shared_dir, PathBuf::from("shared"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(BuildConfig::from_json(r#"{"layer_dir": "typo"}"#).is_err());
    }

    #[test]
    fn map_env_source() {
        let env = HashMap::from([("JOBS_URL".to_string(), "memory://queue/jobs".to_string())]);
        assert_eq!(env.var("JOBS_URL").as_deref(), Some("memory://queue/jobs"));
        assert_eq!(env.var("MISSING"), None);
    }
}
