use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::cli::{OutputFormat, Output};
use crate::config::EngineConfig;
use crate::filter::ToolFilter;
use crate::hooks::{HookDefinition, ProjectFiles};
use crate::orchestrator::{ExecutionOptions, ExecutionOrchestrator, ExecutionSummary, HookOutcome};
use crate::profiler::PerformanceProfiler;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Only run the hook with this name
    #[arg(short, long)]
    pub tool: Option<String>,

    /// Skip files whose results are already cached
    #[arg(long)]
    pub changed_only: bool,

    /// Only check files matching this glob (repeatable)
    #[arg(long = "include", value_name = "GLOB")]
    pub include: Vec<String>,

    /// Never check files matching this glob (repeatable)
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Ignore cached results and re-run every file
    #[arg(short, long)]
    pub force: bool,

    /// Write the Markdown execution report to FILE
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Show which hooks would run without executing them
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    pub fn options(&self) -> ExecutionOptions {
        ExecutionOptions {
            tool_filter: self.tool.clone(),
            changed_only: self.changed_only,
            file_patterns: self.include.clone(),
            exclude_patterns: self.exclude.clone(),
            force_rerun: self.force,
        }
    }
}

pub async fn execute(
    args: RunArgs,
    config: &EngineConfig,
    format: OutputFormat,
    output: &Output,
) -> Result<()> {
    config.validate().context("Invalid configuration")?;
    let options = args.options();

    if config.hooks.is_empty() {
        output.warning("No hooks configured");
        output.info("Declare [[hooks]] in crackerjack.toml to get started");
        return Ok(());
    }

    if args.dry_run {
        return dry_run(config, &options, format, output);
    }

    let root = std::env::current_dir().context("Failed to get current directory")?;
    let profiler = PerformanceProfiler::with_phases(config.profiler.clone());
    let mut orchestrator =
        ExecutionOrchestrator::new(config.cache.open(), Box::new(ProjectFiles::new(root)))
            .with_profiler(profiler);

    let summary = orchestrator.execute_hooks(&config.hooks, &options).await;

    match format {
        OutputFormat::Json => output.raw(&serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => print_summary(&summary, output),
    }

    if let Some(path) = &args.report {
        std::fs::write(path, orchestrator.generate_report(&summary))
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        output.info(&format!("Report written to {}", path.display()));
    }

    if !summary.all_succeeded() {
        std::process::exit(1);
    }
    Ok(())
}

fn dry_run(
    config: &EngineConfig,
    options: &ExecutionOptions,
    format: OutputFormat,
    output: &Output,
) -> Result<()> {
    let names: Vec<String> = config.hooks.iter().map(|hook| hook.name().to_string()).collect();
    let filter = ToolFilter::new(options.filter_configuration());
    let selection = filter.filter_tools(&names);

    match format {
        OutputFormat::Json => output.raw(&serde_json::to_string_pretty(&selection)?),
        OutputFormat::Text => output.raw(&filter.generate_filter_summary(Some(&selection), None)),
    }
    Ok(())
}

fn print_summary(summary: &ExecutionSummary, output: &Output) {
    output.header("Hook Results");
    for outcome in &summary.outcomes {
        output.hook_result(&outcome.hook_name, outcome.success, &describe(outcome));
        if let Some(error) = &outcome.error {
            output.verbose(error);
        }
    }

    output.blank_line();
    output.key_value("Hooks run", &format!("{}/{}", summary.hooks_run, summary.total_hooks));
    output.key_value("Passed", &summary.hooks_succeeded.to_string());
    output.key_value("Failed", &summary.hooks_failed.to_string());
    output.key_value(
        "Total time",
        &format!("{:.2}s", summary.total_execution_time.as_secs_f64()),
    );
    output.key_value(
        "Cache effectiveness",
        &format!("{:.1}%", summary.cache_effectiveness_percent),
    );

    if summary.all_succeeded() {
        output.success("All hooks passed");
    } else {
        output.error(&format!("{} hook(s) failed", summary.hooks_failed));
    }
}

fn describe(outcome: &HookOutcome) -> String {
    let seconds = outcome.execution_time.as_secs_f64();
    if outcome.files_processed == 0 {
        format!("{seconds:.2}s")
    } else {
        format!(
            "{seconds:.2}s, {} files, {:.0}% cached",
            outcome.files_processed, outcome.cache_hit_rate
        )
    }
}
