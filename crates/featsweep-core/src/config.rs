//! Configuration file support.
//!
//! Settings are merged from, lowest to highest precedence:
//! 1. Defaults
//! 2. Global config (`~/.featsweep/config.toml`)
//! 3. Local config (`./.featsweeprc`)
//! 4. An explicit `--config` file
//! 5. Environment variables (`FEATSWEEP_*`)
//!
//! Command-line flags are applied on top by the CLI. The log level is not part
//! of the file: logging is set up before any file is read.

use crate::error::{SweepError, SweepResult};
use crate::layout::{DEFAULT_ARTIFACT_EXTENSION, DEFAULT_ARTIFACT_PREFIX, DEFAULT_OUTPUT_DIR, OutputLayout};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_OUTPUT_DIR: &str = "FEATSWEEP_OUTPUT_DIR";
pub const ENV_JOB_PROGRAM: &str = "FEATSWEEP_JOB_PROGRAM";

/// External job command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    #[serde(default = "default_job_program")]
    pub program: String,

    /// Arguments; `{id}` and `{output_dir}` are substituted per job.
    #[serde(default = "default_job_args")]
    pub args: Vec<String>,
}

fn default_job_program() -> String {
    "python".to_string()
}

fn default_job_args() -> Vec<String> {
    [
        "-m",
        "modal",
        "run",
        "modal_interpreter.py::analyze_feature_json",
        "--feature-idx",
        "{id}",
        "--output-dir",
        "{output_dir}",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

impl Default for JobConfig {
    fn default() -> Self {
        Self { program: default_job_program(), args: default_job_args() }
    }
}

/// Artifact file naming: `<prefix><id><extension>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactConfig {
    #[serde(default = "default_artifact_prefix")]
    pub prefix: String,

    #[serde(default = "default_artifact_extension")]
    pub extension: String,
}

fn default_artifact_prefix() -> String {
    DEFAULT_ARTIFACT_PREFIX.to_string()
}

fn default_artifact_extension() -> String {
    DEFAULT_ARTIFACT_EXTENSION.to_string()
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self { prefix: default_artifact_prefix(), extension: default_artifact_extension() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Default output directory
    #[serde(default)]
    pub output_dir: Option<String>,

    #[serde(default)]
    pub job: Option<JobConfig>,

    #[serde(default)]
    pub artifact: Option<ArtifactConfig>,
}

impl SweepConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> SweepResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SweepError::Config(format!("{}: {}", path.display(), e)))?;

        toml::from_str(&content).map_err(|e| SweepError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Get default global configuration file path.
    pub fn default_global_path() -> PathBuf {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".featsweep")
            .join("config.toml")
    }

    /// Get default local configuration file path.
    pub fn default_local_path() -> PathBuf {
        PathBuf::from(".featsweeprc")
    }

    /// Load global then local config. Missing files are skipped, broken ones
    /// are logged and skipped.
    pub fn discover_and_load() -> Self {
        let mut config = Self::default();

        for path in [Self::default_global_path(), Self::default_local_path()] {
            if !path.is_file() {
                continue;
            }
            match Self::load_from_file(&path) {
                Ok(found) => config.merge(&found),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "ignoring config file"),
            }
        }

        config
    }

    /// Full resolution: discovered files, then `explicit`, then environment.
    ///
    /// Unlike discovered files, an explicit file that can't be loaded is an error.
    pub fn load(explicit: Option<&Path>) -> SweepResult<Self> {
        let mut config = Self::discover_and_load();
        if let Some(path) = explicit {
            config.merge(&Self::load_from_file(path)?);
        }
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Merge another configuration into this one.
    ///
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &Self) {
        if let Some(ref output_dir) = other.output_dir {
            self.output_dir = Some(output_dir.clone());
        }
        if let Some(ref job) = other.job {
            self.job = Some(job.clone());
        }
        if let Some(ref artifact) = other.artifact {
            self.artifact = Some(artifact.clone());
        }
    }

    /// Apply `FEATSWEEP_*` variables. `lookup` is `std::env::var` outside tests.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(output_dir) = lookup(ENV_OUTPUT_DIR).filter(|v| !v.is_empty()) {
            self.output_dir = Some(output_dir);
        }
        if let Some(program) = lookup(ENV_JOB_PROGRAM).filter(|v| !v.is_empty()) {
            let mut job = self.job_config();
            job.program = program;
            self.job = Some(job);
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(self.output_dir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR))
    }

    #[must_use]
    pub fn job_config(&self) -> JobConfig {
        self.job.clone().unwrap_or_default()
    }

    #[must_use]
    pub fn artifact_config(&self) -> ArtifactConfig {
        self.artifact.clone().unwrap_or_default()
    }

    /// Output layout rooted at `root`, using the configured artifact naming.
    #[must_use]
    pub fn layout_for(&self, root: PathBuf) -> OutputLayout {
        let artifact = self.artifact_config();
        OutputLayout::with_naming(root, &artifact.prefix, &artifact.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::FeatureId;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = SweepConfig::default();
        assert_eq!(config.output_dir(), PathBuf::from("output"));
        assert_eq!(config.job_config().program, "python");
        assert!(config.job_config().args.contains(&"{id}".to_string()));
        assert_eq!(
            config.layout_for(PathBuf::from("out")).artifact_path(FeatureId(5)),
            PathBuf::from("out").join("feature_5.json")
        );
    }

    #[test]
    fn test_load_partial_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "output_dir = \"results\"\n\n[job]\nprogram = \"sh\"\n").unwrap();

        let config = SweepConfig::load_from_file(&path).unwrap();
        assert_eq!(config.output_dir(), PathBuf::from("results"));
        let job = config.job_config();
        assert_eq!(job.program, "sh");
        assert_eq!(job.args, default_job_args());
        assert!(config.artifact.is_none());
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = SweepConfig::load_from_file(Path::new("/nonexistent/featsweep.toml")).unwrap_err();
        assert!(matches!(err, SweepError::Config(_)));
    }

    #[test]
    fn test_load_invalid_toml_is_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.toml");
        std::fs::write(&path, "output_dir = [").unwrap();
        assert!(matches!(SweepConfig::load_from_file(&path), Err(SweepError::Config(_))));
    }

    #[test]
    fn test_merge_overrides_only_present_values() {
        let mut base = SweepConfig {
            output_dir: Some("a".to_string()),
            job: Some(JobConfig { program: "sh".to_string(), args: Vec::new() }),
            ..Default::default()
        };
        let other = SweepConfig {
            output_dir: Some("b".to_string()),
            artifact: Some(ArtifactConfig { prefix: "f".to_string(), extension: ".txt".to_string() }),
            ..Default::default()
        };
        base.merge(&other);

        assert_eq!(base.output_dir.as_deref(), Some("b"));
        assert_eq!(base.job_config().program, "sh");
        assert_eq!(base.artifact_config().extension, ".txt");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([(ENV_OUTPUT_DIR, "env-out"), (ENV_JOB_PROGRAM, "python3")]);
        let mut config = SweepConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.output_dir(), PathBuf::from("env-out"));
        assert_eq!(config.job_config().program, "python3");
        assert_eq!(config.job_config().args, default_job_args());
    }
}
