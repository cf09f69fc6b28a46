//! Hook execution orchestration
//!
//! Ties the filter, cache and profiler together: picks the hooks to run,
//! runs per-file hooks incrementally through the cache, runs everything else
//! as a single subprocess, and summarizes the result.
//!
//! Hooks run strictly one after another. Profiling needs a clean measurement
//! window per hook and the cache has a single writer.

mod report;

use crate::cache::{ExecutionOutcome, PersistentCache};
use crate::filter::{FilterConfiguration, ToolFilter};
use crate::hooks::{FileResolver, HookDefinition, run_command};
use crate::profiler::PerformanceProfiler;
use serde::Serialize;
use serde_json::json;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Caller-supplied selection and caching options for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionOptions {
    pub tool_filter: Option<String>,
    /// Only execute files without a stored result. Unchanged files still
    /// report their cached outcome, so recorded failures stay failures.
    pub changed_only: bool,
    pub file_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub force_rerun: bool,
}

impl ExecutionOptions {
    pub fn filter_configuration(&self) -> FilterConfiguration {
        FilterConfiguration {
            tool_name_filter: self.tool_filter.clone(),
            changed_only: self.changed_only,
            include_patterns: self.file_patterns.clone(),
            exclude_patterns: self.exclude_patterns.clone(),
        }
    }

    /// Include/exclude stages only; unchanged files are answered by the cache
    /// itself, which keeps their recorded failures visible
    fn file_filter_configuration(&self) -> FilterConfiguration {
        FilterConfiguration {
            tool_name_filter: None,
            changed_only: false,
            include_patterns: self.file_patterns.clone(),
            exclude_patterns: self.exclude_patterns.clone(),
        }
    }
}

/// Result of running a single hook
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HookOutcome {
    pub hook_name: String,
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
    pub execution_time: Duration,
    pub files_processed: usize,
    pub files_cached: usize,
    pub cache_hit_rate: f64,
}

impl HookOutcome {
    fn from_incremental(hook_name: &str, outcome: &ExecutionOutcome) -> Self {
        let failures: Vec<String> = outcome
            .failures()
            .map(|file| {
                format!(
                    "{}: {}",
                    file.path.display(),
                    file.error_message.as_deref().unwrap_or("failed")
                )
            })
            .collect();

        Self {
            hook_name: hook_name.to_string(),
            success: failures.is_empty(),
            output: format!(
                "{} files checked ({} cached, {} executed)",
                outcome.files_processed, outcome.files_cached, outcome.files_changed
            ),
            error: (!failures.is_empty()).then(|| failures.join("\n")),
            execution_time: outcome.execution_time,
            files_processed: outcome.files_processed,
            files_cached: outcome.files_cached,
            cache_hit_rate: outcome.cache_hit_rate,
        }
    }

    fn without_files(
        hook_name: &str,
        success: bool,
        output: String,
        error: Option<String>,
        execution_time: Duration,
    ) -> Self {
        Self {
            hook_name: hook_name.to_string(),
            success,
            output,
            error,
            execution_time,
            files_processed: 0,
            files_cached: 0,
            cache_hit_rate: 0.0,
        }
    }
}

/// Aggregate result of [`ExecutionOrchestrator::execute_hooks`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionSummary {
    pub total_hooks: usize,
    pub hooks_run: usize,
    pub hooks_skipped: usize,
    pub hooks_succeeded: usize,
    pub hooks_failed: usize,
    pub total_execution_time: Duration,
    pub filter_effectiveness_percent: f64,
    pub cache_effectiveness_percent: f64,
    pub outcomes: Vec<HookOutcome>,
}

impl ExecutionSummary {
    pub fn all_succeeded(&self) -> bool {
        self.hooks_failed == 0
    }
}

/// Runs hooks through the filter, the cache and the profiler
pub struct ExecutionOrchestrator {
    cache: PersistentCache,
    profiler: PerformanceProfiler,
    resolver: Box<dyn FileResolver>,
}

impl ExecutionOrchestrator {
    pub fn new(cache: PersistentCache, resolver: Box<dyn FileResolver>) -> Self {
        Self {
            cache,
            profiler: PerformanceProfiler::new(),
            resolver,
        }
    }

    pub fn with_profiler(mut self, profiler: PerformanceProfiler) -> Self {
        self.profiler = profiler;
        self
    }

    pub fn cache(&self) -> &PersistentCache {
        &self.cache
    }

    pub fn profiler(&self) -> &PerformanceProfiler {
        &self.profiler
    }

    /// Run the selected hooks sequentially and summarize the outcome
    ///
    /// Hook failures, timeouts and spawn errors are reported in the summary;
    /// this never fails as a whole.
    pub async fn execute_hooks<H: HookDefinition>(
        &mut self,
        hooks: &[H],
        options: &ExecutionOptions,
    ) -> ExecutionSummary {
        let start = Instant::now();
        let hook_names: Vec<String> = hooks.iter().map(|h| h.name().to_string()).collect();
        let tool_selection =
            ToolFilter::new(options.filter_configuration()).filter_tools(&hook_names);

        tracing::info!(
            "Running {} of {} hooks",
            tool_selection.selected_tools.len(),
            hooks.len()
        );

        let mut outcomes = Vec::new();
        for hook in hooks
            .iter()
            .filter(|hook| tool_selection.selected_tools.iter().any(|name| name == hook.name()))
        {
            let (outcome, executed) = self.run_hook(hook, options).await;
            if executed {
                self.profiler.record_execution(hook.name(), outcome.execution_time);
            }
            if outcome.success {
                tracing::debug!("{} passed in {:.2?}", hook.name(), outcome.execution_time);
            } else {
                tracing::warn!(
                    "{} failed: {}",
                    hook.name(),
                    outcome.error.as_deref().unwrap_or("unknown error")
                );
            }
            outcomes.push(outcome);
        }

        let hooks_succeeded = outcomes.iter().filter(|o| o.success).count();
        let cache_rates: Vec<f64> = outcomes
            .iter()
            .map(|o| o.cache_hit_rate)
            .filter(|rate| *rate > 0.0)
            .collect();
        let cache_effectiveness_percent = if cache_rates.is_empty() {
            0.0
        } else {
            cache_rates.iter().sum::<f64>() / cache_rates.len() as f64
        };

        ExecutionSummary {
            total_hooks: hooks.len(),
            hooks_run: outcomes.len(),
            hooks_skipped: tool_selection.skipped_tools.len(),
            hooks_succeeded,
            hooks_failed: outcomes.len() - hooks_succeeded,
            total_execution_time: start.elapsed(),
            filter_effectiveness_percent: tool_selection.effectiveness_percent,
            cache_effectiveness_percent,
            outcomes,
        }
    }

    /// Run one hook; the flag is false when filtering left nothing to run
    async fn run_hook<H: HookDefinition>(
        &mut self,
        hook: &H,
        options: &ExecutionOptions,
    ) -> (HookOutcome, bool) {
        if !hook.accepts_file_paths() {
            return (self.run_once(hook).await, true);
        }

        let resolved = self.resolver.resolve(hook);
        if resolved.is_empty() {
            return (self.run_once(hook).await, true);
        }

        let files = self.select_files(hook.name(), resolved, options);
        if files.is_empty() {
            let outcome = HookOutcome::without_files(
                hook.name(),
                true,
                "No files left after filtering".to_string(),
                None,
                Duration::ZERO,
            );
            return (outcome, false);
        }

        (self.run_incremental(hook, &files, options.force_rerun).await, true)
    }

    fn select_files(
        &self,
        hook_name: &str,
        resolved: Vec<PathBuf>,
        options: &ExecutionOptions,
    ) -> Vec<PathBuf> {
        if options.file_patterns.is_empty() && options.exclude_patterns.is_empty() {
            return resolved;
        }

        ToolFilter::new(options.file_filter_configuration())
            .filter_files(hook_name, &resolved)
            .selected_files
    }

    async fn run_incremental<H: HookDefinition>(
        &mut self,
        hook: &H,
        files: &[PathBuf],
        force_rerun: bool,
    ) -> HookOutcome {
        let command: Vec<OsString> = hook.command().into_iter().map(OsString::from).collect();
        let timeout = hook.timeout();

        let outcome = self
            .cache
            .execute_incremental(
                hook.name(),
                files,
                |path| {
                    let mut argv = command.clone();
                    argv.push(path.into_os_string());
                    async move {
                        let output = run_command(&argv, timeout).await;
                        match output.failure_message(timeout) {
                            None => Ok(json!({
                                "stdout": output.stdout,
                                "stderr": output.stderr,
                                "duration": output.duration.as_secs_f64(),
                            })),
                            Some(message) => Err(anyhow::anyhow!(message)),
                        }
                    }
                },
                force_rerun,
            )
            .await;

        self.profiler
            .record_cache_activity(hook.name(), outcome.files_cached, outcome.files_changed);
        HookOutcome::from_incremental(hook.name(), &outcome)
    }

    async fn run_once<H: HookDefinition>(&mut self, hook: &H) -> HookOutcome {
        let timeout = hook.timeout();
        let output = run_command(&hook.command(), timeout).await;

        HookOutcome::without_files(
            hook.name(),
            output.success(),
            output.combined_output(),
            output.failure_message(timeout),
            output.duration,
        )
    }

    /// Markdown report combining hook results, profiling data and filter guidance
    pub fn generate_report(&self, summary: &ExecutionSummary) -> String {
        report::render(summary, &self.profiler)
    }
}
