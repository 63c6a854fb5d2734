// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod job;
pub mod logging;
pub mod orchestrator;
pub mod types;

use anyhow::{Result, anyhow, bail};
use tracing::{debug, error, info};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::config::loader::load_and_validate;
use crate::dag::ExecutionPlan;
use crate::engine::RunStatus;

pub use crate::errors::{BootdagError, JobError};
pub use crate::job::{Job, JobKey, ROOT_JOB_KEY, Work};
pub use crate::orchestrator::{Orchestrator, OrchestratorOptions};
pub use crate::types::ExecutionContext;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - job registration
/// - the orchestrator run (or a dry-run plan dump)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;

    let mut options = cfg.options();
    if args.diagnostics {
        options.diagnostics = true;
    }
    let matrix_chunk_max = options.matrix_chunk_max;

    let mut orchestrator = Orchestrator::new(options);
    for job in cfg.jobs() {
        orchestrator.register(job);
    }

    if args.dry_run {
        let plan = orchestrator.plan()?;
        print_dry_run(&cfg, &plan, matrix_chunk_max);
        return Ok(());
    }

    orchestrator
        .on_success(|name| info!(name = %name, "all jobs completed"))
        .on_failure(|name, job, cause| {
            error!(name = %name, job = %job, error = %cause, "run failed")
        });

    orchestrator.start().await?;

    let status = tokio::select! {
        status = orchestrator.wait() => status?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            bail!("interrupted before the run finished");
        }
    };

    match status {
        RunStatus::Finished => Ok(()),
        RunStatus::Failed(failure) => Err(anyhow!(
            "job '{}' failed: {}",
            failure.job,
            failure.cause
        )),
        other => Err(anyhow!("run ended in unexpected state {other:?}")),
    }
}

/// Dry-run output: jobs, their dependencies, then the execution plan.
fn print_dry_run(cfg: &ConfigFile, plan: &ExecutionPlan, matrix_chunk_max: usize) {
    println!("bootdag dry-run");
    println!("  config.name = {}", cfg.config.name);
    println!("  default.context = {}", cfg.default.context);
    println!();

    println!("jobs ({}):", cfg.job.len());
    for (key, job) in cfg.job.iter() {
        println!("  - {key}");
        println!("      cmd: {}", job.cmd);
        if !job.after.is_empty() {
            println!("      after: {:?}", job.after);
        }
        if let Some(context) = job.context {
            println!("      context: {context}");
        }
    }
    println!();

    for (i, level) in plan.levels().iter().enumerate() {
        println!("level {}: {}", i + 1, level.join(", "));
    }
    println!();
    print!("{}", plan.render(matrix_chunk_max));

    debug!("dry-run complete (no execution)");
}
