use crate::config::JobConfig;
use crate::identifier::FeatureId;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

pub const ID_PLACEHOLDER: &str = "{id}";
pub const OUTPUT_DIR_PLACEHOLDER: &str = "{output_dir}";

/// A job that did not report success.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("feature {id} job failed: {message}")]
pub struct JobFailure {
    pub id: FeatureId,
    /// Exit code when the job ran and returned one.
    pub exit_code: Option<i32>,
    pub message: String,
}

/// Capability to analyze a single feature.
///
/// One call per identifier; the call returns only once the job has finished.
/// On success the job is expected to have written the artifact for `id` into
/// `output_dir`, but callers do not verify this.
#[async_trait]
pub trait JobRunner: Send + Sync {
    fn id(&self) -> &'static str;

    async fn run_job(&self, id: FeatureId, output_dir: &Path) -> Result<(), JobFailure>;
}

/// Runs each job as a child process with inherited stdio.
///
/// `{id}` and `{output_dir}` are substituted in every argument.
#[derive(Debug, Clone)]
pub struct SubprocessJobRunner {
    program: String,
    args: Vec<String>,
}

impl SubprocessJobRunner {
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    #[must_use]
    pub fn from_config(config: &JobConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn render_args(&self, id: FeatureId, output_dir: &Path) -> Vec<String> {
        let id = id.to_string();
        let output_dir = output_dir.display().to_string();
        self.args
            .iter()
            .map(|arg| arg.replace(ID_PLACEHOLDER, &id).replace(OUTPUT_DIR_PLACEHOLDER, &output_dir))
            .collect()
    }
}

#[async_trait]
impl JobRunner for SubprocessJobRunner {
    fn id(&self) -> &'static str {
        "subprocess"
    }

    async fn run_job(&self, id: FeatureId, output_dir: &Path) -> Result<(), JobFailure> {
        let args = self.render_args(id, output_dir);
        tracing::debug!(program = %self.program, ?args, "spawning job");

        let status = tokio::process::Command::new(&self.program)
            .args(&args)
            .status()
            .await
            .map_err(|e| JobFailure {
                id,
                exit_code: None,
                message: format!("failed to start `{}`: {e}", self.program),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(JobFailure { id, exit_code: status.code(), message: format!("`{}` exited with {status}", self.program) })
        }
    }
}
