//! Featsweep Core
//!
//! Orchestration primitives for sweeping an analysis job over many features:
//! - Resolving raw tokens (indices, ranges, list files) into identifiers
//! - Deciding run vs. skip from the artifacts already on disk
//! - Dispatching one external job per identifier (`JobRunner`)
//! - Reporting progress and the final batch summary

pub mod config;
pub mod error;
pub mod identifier;
pub mod job;
pub mod layout;
pub mod progress;
pub mod resolver;
pub mod runner;

pub use config::{ArtifactConfig, JobConfig, SweepConfig};
pub use error::{SweepError, SweepResult};
pub use identifier::{FeatureId, IdentifierSequence};
pub use job::{JobFailure, JobRunner, SubprocessJobRunner};
pub use layout::OutputLayout;
pub use progress::{ProgressEvent, ProgressSink, StdoutProgressSink, TracingProgressSink};
pub use resolver::{
    MAX_RANGE_SPAN, Resolution, TokenKind, TokenWarning, WarningReason, classify_token, resolve_tokens,
};
pub use runner::{BatchRunner, BatchSummary, JobOutcome, PlanAction, PlannedJob, plan_to_json_pretty};
