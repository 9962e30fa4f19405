//! Analyze command implementation.
//!
//! Resolves the feature tokens and runs the configured analysis job for each
//! feature, one at a time.

use crate::config::load_config;
use anyhow::Context;
use colored::Colorize;
use featsweep_core::{
    BatchRunner, IdentifierSequence, PlanAction, ProgressSink, StdoutProgressSink, SubprocessJobRunner,
    TracingProgressSink, plan_to_json_pretty, resolve_tokens,
};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub features: Vec<String>,
    pub output_dir: Option<PathBuf>,
    pub force: bool,
    pub dry_run: bool,
    pub json: bool,
    pub config: Option<PathBuf>,
}

pub async fn execute(options: AnalyzeOptions) -> anyhow::Result<()> {
    let config = load_config(options.config.as_deref())?;

    let resolution = resolve_tokens(&options.features);
    for warning in &resolution.warnings {
        // Keep stdout parseable in JSON mode.
        if options.json {
            eprintln!("{} {}", "Warning:".yellow(), warning);
        } else {
            println!("{} {}", "Warning:".yellow(), warning);
        }
    }
    let ids = resolution.into_sequence()?;

    let output_dir = options.output_dir.unwrap_or_else(|| config.output_dir());
    let runner = BatchRunner::new(config.layout_for(output_dir), options.force);

    if options.dry_run {
        return print_plan(&runner, &ids, options.json);
    }

    let job = SubprocessJobRunner::from_config(&config.job_config());
    tracing::debug!(program = job.program(), "using subprocess job runner");

    let sink: &dyn ProgressSink = if options.json { &TracingProgressSink } else { &StdoutProgressSink };
    let summary = runner
        .run(&ids, &job, sink)
        .await
        .with_context(|| format!("Failed to prepare output directory: {}", runner.layout().root().display()))?;

    if options.json {
        println!("{}", summary.to_json_pretty()?);
    }
    Ok(())
}

fn print_plan(runner: &BatchRunner, ids: &IdentifierSequence, json_output: bool) -> anyhow::Result<()> {
    let plan = runner.plan(ids);

    if json_output {
        println!("{}", plan_to_json_pretty(&plan)?);
        return Ok(());
    }

    println!("{}", format!("Plan for {} feature(s) in {}/", plan.len(), runner.layout().root().display()).bold());
    for job in &plan {
        match job.action {
            PlanAction::Run => {
                println!("  [{}/{}] {} feature {}", job.position, plan.len(), "run ".green(), job.id);
            }
            PlanAction::Skip => println!(
                "  [{}/{}] {} feature {} {}",
                job.position,
                plan.len(),
                "skip".dimmed(),
                job.id,
                "(output exists)".dimmed()
            ),
        }
    }

    let to_run = plan.iter().filter(|j| j.action == PlanAction::Run).count();
    println!();
    println!("  {} to run, {} to skip", to_run, plan.len() - to_run);
    Ok(())
}
