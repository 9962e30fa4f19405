//! Sequential batch execution.
//!
//! [`BatchRunner::run`] walks an [`IdentifierSequence`] one feature at a time:
//! existing artifacts are skipped (unless forced), every other feature is
//! handed to the [`JobRunner`] and awaited to completion before the next one
//! starts. Job failures are counted, never propagated.

use crate::error::SweepResult;
use crate::identifier::{FeatureId, IdentifierSequence};
use crate::job::JobRunner;
use crate::layout::OutputLayout;
use crate::progress::{ProgressEvent, ProgressSink};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    Success,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    succeeded: usize,
    skipped: usize,
    failed: usize,
}

impl Tally {
    fn record(self, outcome: JobOutcome) -> Self {
        match outcome {
            JobOutcome::Success => Self { succeeded: self.succeeded + 1, ..self },
            JobOutcome::Skipped => Self { skipped: self.skipped + 1, ..self },
            JobOutcome::Failed => Self { failed: self.failed + 1, ..self },
        }
    }
}

/// Aggregate result of one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub output_dir: PathBuf,
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchSummary {
    /// Number of features with a recorded outcome; equals `total` after a run.
    #[must_use]
    pub fn accounted(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }

    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }

    pub fn to_json_pretty(&self) -> SweepResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanAction {
    Run,
    Skip,
}

/// What a run would do for one feature, computed without side effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedJob {
    pub position: usize,
    pub id: FeatureId,
    pub artifact: PathBuf,
    pub action: PlanAction,
}

/// Render a dry-run plan as a pretty JSON array.
pub fn plan_to_json_pretty(plan: &[PlannedJob]) -> SweepResult<String> {
    Ok(serde_json::to_string_pretty(plan)?)
}

#[derive(Debug, Clone)]
pub struct BatchRunner {
    layout: OutputLayout,
    force: bool,
}

impl BatchRunner {
    #[must_use]
    pub fn new(layout: OutputLayout, force: bool) -> Self {
        Self { layout, force }
    }

    #[must_use]
    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    fn decide(&self, id: FeatureId) -> PlanAction {
        if !self.force && self.layout.artifact_exists(id) {
            PlanAction::Skip
        } else {
            PlanAction::Run
        }
    }

    #[must_use]
    pub fn plan(&self, ids: &IdentifierSequence) -> Vec<PlannedJob> {
        ids.iter()
            .enumerate()
            .map(|(i, &id)| PlannedJob {
                position: i + 1,
                id,
                artifact: self.layout.artifact_path(id),
                action: self.decide(id),
            })
            .collect()
    }

    async fn run_one(
        &self,
        position: usize,
        total: usize,
        id: FeatureId,
        job: &dyn JobRunner,
        progress: &dyn ProgressSink,
    ) -> JobOutcome {
        if self.decide(id) == PlanAction::Skip {
            progress.on_event(ProgressEvent::Skipping { position, total, id });
            return JobOutcome::Skipped;
        }

        progress.on_event(ProgressEvent::Analyzing { position, total, id });
        match job.run_job(id, self.layout.root()).await {
            Ok(()) => JobOutcome::Success,
            Err(failure) => {
                tracing::debug!(%id, exit_code = ?failure.exit_code, job = job.id(), "job failed");
                progress.on_event(ProgressEvent::JobFailed { id, message: failure.message });
                JobOutcome::Failed
            }
        }
    }

    /// Run every feature in order and return the aggregate counts.
    ///
    /// Only output directory creation can fail the batch.
    pub async fn run(
        &self,
        ids: &IdentifierSequence,
        job: &dyn JobRunner,
        progress: &dyn ProgressSink,
    ) -> SweepResult<BatchSummary> {
        let total = ids.len();
        let started_at = Utc::now();

        self.layout.ensure_root()?;
        tracing::info!(total, output_dir = %self.layout.root().display(), force = self.force, "starting batch");
        progress.on_event(ProgressEvent::Started { total });

        let mut tally = Tally::default();
        for (i, &id) in ids.iter().enumerate() {
            let outcome = self.run_one(i + 1, total, id, job, progress).await;
            tally = tally.record(outcome);
        }

        let summary = BatchSummary {
            output_dir: self.layout.root().to_path_buf(),
            total,
            succeeded: tally.succeeded,
            skipped: tally.skipped,
            failed: tally.failed,
            started_at,
            finished_at: Utc::now(),
        };
        tracing::info!(succeeded = summary.succeeded, skipped = summary.skipped, failed = summary.failed, "batch finished");
        progress.on_event(ProgressEvent::Finished { summary: summary.clone() });
        Ok(summary)
    }
}
