use crate::identifier::FeatureId;
use crate::runner::BatchSummary;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Started { total: usize },
    Skipping { position: usize, total: usize, id: FeatureId },
    Analyzing { position: usize, total: usize, id: FeatureId },
    JobFailed { id: FeatureId, message: String },
    Finished { summary: BatchSummary },
}

pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: ProgressEvent);
}

/// Human-readable progress on stdout.
#[derive(Debug, Default)]
pub struct StdoutProgressSink;

impl ProgressSink for StdoutProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { total } => println!("Analyzing {total} feature(s)..."),
            ProgressEvent::Skipping { position, total, id } => {
                println!("[{position}/{total}] Skipping feature {id} (output exists)");
            }
            ProgressEvent::Analyzing { position, total, id } => {
                println!("[{position}/{total}] Analyzing feature {id}...");
            }
            ProgressEvent::JobFailed { id, message } => {
                println!("  Warning: Feature {id} analysis may have failed ({message})");
            }
            ProgressEvent::Finished { summary } => {
                println!();
                println!("{}", "=".repeat(50));
                println!("Done! Results in {}/", summary.output_dir.display());
                println!("  Analyzed: {}", summary.succeeded);
                println!("  Skipped:  {}", summary.skipped);
                if summary.failed > 0 {
                    println!("  Failed:   {}", summary.failed);
                }
            }
        }
    }
}

/// Routes progress through `tracing`, keeping stdout free for machine output.
#[derive(Debug, Default)]
pub struct TracingProgressSink;

impl ProgressSink for TracingProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { total } => tracing::info!(total, "batch started"),
            ProgressEvent::Skipping { position, total, id } => {
                tracing::info!(position, total, %id, "skipping feature (output exists)");
            }
            ProgressEvent::Analyzing { position, total, id } => {
                tracing::info!(position, total, %id, "analyzing feature");
            }
            ProgressEvent::JobFailed { id, message } => {
                tracing::warn!(%id, %message, "feature analysis may have failed");
            }
            ProgressEvent::Finished { summary } => tracing::info!(
                succeeded = summary.succeeded,
                skipped = summary.skipped,
                failed = summary.failed,
                "batch finished"
            ),
        }
    }
}
