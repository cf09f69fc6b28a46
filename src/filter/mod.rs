//! Selective tool and file filtering
//!
//! Narrows the set of hooks to run (by tool name) and the set of files each
//! hook sees (changed-only, include globs, exclude globs). Every stage reports
//! what it skipped so callers can show how much work was avoided.

use crate::cache::{PersistentCache, percentage};
use crate::shared::glob::{build_globset_lenient, matches_name_or_path};
use globset::GlobSet;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Options that decide which tools and files are selected
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterConfiguration {
    /// Run only the tool with this exact name
    pub tool_name_filter: Option<String>,
    /// Keep only files without a cached result for the tool
    pub changed_only: bool,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

/// What a filter pass selected and skipped
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOutcome {
    pub total_tools: usize,
    pub selected_tools: Vec<String>,
    pub skipped_tools: Vec<String>,
    pub total_files: usize,
    pub selected_files: Vec<PathBuf>,
    pub skipped_files: Vec<PathBuf>,
    pub effectiveness_percent: f64,
}

/// Estimated effect of the tool-name filter on total run time (seconds)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSavings {
    pub baseline: f64,
    pub filtered: f64,
    pub saved: f64,
    pub percent_saved: f64,
}

/// Tool/file filter bound to an optional cache for changed-file detection
pub struct ToolFilter<'a> {
    config: FilterConfiguration,
    include: GlobSet,
    exclude: GlobSet,
    cache: Option<&'a PersistentCache>,
}

impl<'a> ToolFilter<'a> {
    pub fn new(config: FilterConfiguration) -> Self {
        let include = build_globset_lenient(&config.include_patterns);
        let exclude = build_globset_lenient(&config.exclude_patterns);

        Self {
            config,
            include,
            exclude,
            cache: None,
        }
    }

    /// Attach the cache consulted by the changed-only stage
    pub fn with_cache(mut self, cache: &'a PersistentCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &FilterConfiguration {
        &self.config
    }

    /// Select tools by the configured tool-name filter
    ///
    /// A filter naming an unknown tool selects nothing and reports every
    /// available tool as skipped.
    pub fn filter_tools(&self, available_tools: &[String]) -> FilterOutcome {
        let (selected_tools, skipped_tools): (Vec<String>, Vec<String>) =
            match &self.config.tool_name_filter {
                Some(name) => available_tools.iter().cloned().partition(|tool| tool == name),
                None => (available_tools.to_vec(), Vec::new()),
            };

        tracing::debug!(
            "Tool filter selected {}/{} tools",
            selected_tools.len(),
            available_tools.len()
        );

        FilterOutcome {
            total_tools: available_tools.len(),
            effectiveness_percent: percentage(skipped_tools.len(), available_tools.len()),
            selected_tools,
            skipped_tools,
            ..FilterOutcome::default()
        }
    }

    /// Select files for `tool_name` through the changed/include/exclude stages
    ///
    /// The exclude stage reports every input file matching an exclude glob,
    /// so a file dropped earlier can appear in `skipped_files` twice.
    pub fn filter_files(&self, tool_name: &str, all_files: &[PathBuf]) -> FilterOutcome {
        let mut candidates = all_files.to_vec();
        let mut skipped_files = Vec::new();

        if self.config.changed_only {
            match self.cache {
                Some(cache) => {
                    let changed = cache.get_changed_files(tool_name, &candidates);
                    let (kept, removed): (Vec<PathBuf>, Vec<PathBuf>) =
                        candidates.into_iter().partition(|file| changed.contains(file));
                    skipped_files.extend(removed);
                    candidates = kept;
                }
                None => tracing::debug!("changed_only requested without a cache; stage skipped"),
            }
        }

        if !self.config.include_patterns.is_empty() {
            let (kept, removed): (Vec<PathBuf>, Vec<PathBuf>) = candidates
                .into_iter()
                .partition(|file| matches_name_or_path(&self.include, file));
            skipped_files.extend(removed);
            candidates = kept;
        }

        if !self.config.exclude_patterns.is_empty() {
            let excluded: Vec<PathBuf> = all_files
                .iter()
                .filter(|file| matches_name_or_path(&self.exclude, file))
                .cloned()
                .collect();
            candidates.retain(|file| !excluded.contains(file));
            skipped_files.extend(excluded);
        }

        tracing::debug!(
            "{}: file filter kept {}/{} files",
            tool_name,
            candidates.len(),
            all_files.len()
        );

        FilterOutcome {
            total_files: all_files.len(),
            selected_files: candidates,
            effectiveness_percent: percentage(skipped_files.len(), all_files.len()),
            skipped_files,
            ..FilterOutcome::default()
        }
    }

    /// Estimate the time saved by the tool-name filter alone
    ///
    /// Changed-only and pattern filtering act per file and are not reflected.
    pub fn estimate_time_savings(&self, baseline_times: &HashMap<String, f64>) -> TimeSavings {
        let baseline: f64 = baseline_times.values().sum();
        let filtered = match &self.config.tool_name_filter {
            Some(name) => baseline_times.get(name).copied().unwrap_or(0.0),
            None => baseline,
        };
        let saved = baseline - filtered;
        let percent_saved = if baseline > 0.0 {
            saved / baseline * 100.0
        } else {
            0.0
        };

        TimeSavings {
            baseline,
            filtered,
            saved,
            percent_saved,
        }
    }

    /// Render the supplied outcomes as a Markdown report
    pub fn generate_filter_summary(
        &self,
        tool_outcome: Option<&FilterOutcome>,
        file_outcome: Option<&FilterOutcome>,
    ) -> String {
        let mut report = String::from("# Filter Summary\n");

        let _ = writeln!(report, "\n## Configuration\n");
        let _ = writeln!(
            report,
            "- Tool filter: {}",
            self.config.tool_name_filter.as_deref().unwrap_or("(none)")
        );
        let _ = writeln!(report, "- Changed files only: {}", self.config.changed_only);
        let include = join_or_none(&self.config.include_patterns);
        let exclude = join_or_none(&self.config.exclude_patterns);
        let _ = writeln!(report, "- Include patterns: {}", include);
        let _ = writeln!(report, "- Exclude patterns: {}", exclude);

        if let Some(outcome) = tool_outcome {
            let _ = writeln!(report, "\n## Tool Filtering\n");
            let _ = writeln!(report, "- Total tools: {}", outcome.total_tools);
            let _ = writeln!(report, "- Selected: {}", outcome.selected_tools.len());
            let _ = writeln!(report, "- Skipped: {}", outcome.skipped_tools.len());
            let _ = writeln!(report, "- Effectiveness: {:.1}%", outcome.effectiveness_percent);
            if !outcome.selected_tools.is_empty() {
                let _ = writeln!(report, "\nSelected tools: {}", outcome.selected_tools.join(", "));
            }
        }

        if let Some(outcome) = file_outcome {
            let _ = writeln!(report, "\n## File Filtering\n");
            let _ = writeln!(report, "- Total files: {}", outcome.total_files);
            let _ = writeln!(report, "- Selected: {}", outcome.selected_files.len());
            let _ = writeln!(report, "- Skipped: {}", outcome.skipped_files.len());
            let _ = writeln!(report, "- Effectiveness: {:.1}%", outcome.effectiveness_percent);
        }

        report
    }
}

fn join_or_none(patterns: &[String]) -> String {
    if patterns.is_empty() {
        "(none)".to_string()
    } else {
        patterns.join(", ")
    }
}

#[cfg(test)]
mod tests;
