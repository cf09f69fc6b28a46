//! Per-tool performance profiling and bottleneck detection
//!
//! The profiler keeps timing and memory samples for every tool it has seen,
//! derives simple statistics from them and classifies tools that are slow,
//! memory hungry or poorly served by the cache.
//!
//! Samples arrive two ways: [`PerformanceProfiler::profile_tool`] measures a
//! callable directly, while callers such as the orchestrator feed measurements
//! through the `record_*` methods.

mod bottleneck;
mod memory;

pub use bottleneck::{Bottleneck, MetricType, Severity, sort_by_severity};
pub use memory::MemorySampler;

use crate::cache::percentage;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::time::{Duration, Instant};

/// Tools that make up the fast hook phase
pub const FAST_PHASE_TOOLS: &[&str] = &[
    "trailing-whitespace",
    "end-of-file-fixer",
    "check-yaml",
    "check-toml",
    "check-added-large-files",
    "uv-lock",
    "gitleaks",
    "codespell",
    "ruff-check",
    "ruff-format",
    "mdformat",
];

/// Tools that make up the comprehensive hook phase
pub const COMPREHENSIVE_PHASE_TOOLS: &[&str] = &[
    "pyright",
    "bandit",
    "vulture",
    "refurb",
    "creosote",
    "complexipy",
    "zuban",
    "skylos",
];

/// Collected samples for one tool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolProfile {
    pub tool_name: String,
    pub run_count: usize,
    /// Wall-clock durations in seconds
    pub execution_times: Vec<f64>,
    /// Resident memory deltas in MB
    pub memory_samples: Vec<f64>,
    pub cache_hits: usize,
    pub cache_misses: usize,
}

impl ToolProfile {
    pub fn new(tool_name: &str) -> Self {
        Self {
            tool_name: tool_name.to_string(),
            run_count: 0,
            execution_times: Vec::new(),
            memory_samples: Vec::new(),
            cache_hits: 0,
            cache_misses: 0,
        }
    }

    pub fn mean_time(&self) -> f64 {
        mean(&self.execution_times)
    }

    pub fn median_time(&self) -> f64 {
        if self.execution_times.is_empty() {
            return 0.0;
        }

        let mut sorted = self.execution_times.clone();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        }
    }

    /// Sample standard deviation, 0.0 with fewer than two samples
    pub fn stddev_time(&self) -> f64 {
        let n = self.execution_times.len();
        if n < 2 {
            return 0.0;
        }

        let mean = self.mean_time();
        let variance = self
            .execution_times
            .iter()
            .map(|t| (t - mean).powi(2))
            .sum::<f64>()
            / (n - 1) as f64;
        variance.sqrt()
    }

    pub fn mean_memory(&self) -> f64 {
        mean(&self.memory_samples)
    }

    pub fn cache_hit_rate(&self) -> f64 {
        percentage(self.cache_hits, self.cache_hits + self.cache_misses)
    }
}

fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        0.0
    } else {
        samples.iter().sum::<f64>() / samples.len() as f64
    }
}

/// Tool names grouped into the fast and comprehensive phases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSets {
    pub fast_tools: Vec<String>,
    pub comprehensive_tools: Vec<String>,
}

impl Default for PhaseSets {
    fn default() -> Self {
        Self {
            fast_tools: FAST_PHASE_TOOLS.iter().map(|t| t.to_string()).collect(),
            comprehensive_tools: COMPREHENSIVE_PHASE_TOOLS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Time spent in each phase, based on mean execution times
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseComparison {
    pub fast_phase_time: f64,
    pub comprehensive_phase_time: f64,
    pub total_time: f64,
    pub tools_profiled: usize,
    /// comprehensive / fast, or 0 when the fast phase took no time
    pub time_ratio: f64,
    pub bottlenecks: Vec<Bottleneck>,
}

/// Records samples per tool and derives statistics from them
pub struct PerformanceProfiler {
    profiles: Vec<ToolProfile>,
    phases: PhaseSets,
    memory: MemorySampler,
}

impl PerformanceProfiler {
    pub fn new() -> Self {
        Self::with_phases(PhaseSets::default())
    }

    pub fn with_phases(phases: PhaseSets) -> Self {
        Self {
            profiles: Vec::new(),
            phases,
            memory: MemorySampler::new(),
        }
    }

    /// Run `callable` `runs` times, sampling duration and memory delta each time
    pub fn profile_tool<F, R>(
        &mut self,
        tool_name: &str,
        mut callable: F,
        runs: usize,
    ) -> ToolProfile
    where
        F: FnMut() -> R,
    {
        tracing::debug!("Profiling {} over {} runs", tool_name, runs);

        for _ in 0..runs {
            let memory_before = self.memory.resident_mb();
            let start = Instant::now();
            let _ = callable();
            let elapsed = start.elapsed();
            let memory_after = self.memory.resident_mb();

            let profile = self.profile_entry(tool_name);
            profile.run_count += 1;
            profile.execution_times.push(elapsed.as_secs_f64());
            profile.memory_samples.push(memory_after - memory_before);
        }

        self.profile_entry(tool_name).clone()
    }

    /// Record one externally measured run
    pub fn record_execution(&mut self, tool_name: &str, duration: Duration) {
        let profile = self.profile_entry(tool_name);
        profile.run_count += 1;
        profile.execution_times.push(duration.as_secs_f64());
    }

    /// Record an externally measured memory delta in MB
    pub fn record_memory(&mut self, tool_name: &str, memory_mb: f64) {
        self.profile_entry(tool_name).memory_samples.push(memory_mb);
    }

    pub fn record_cache_activity(&mut self, tool_name: &str, hits: usize, misses: usize) {
        let profile = self.profile_entry(tool_name);
        profile.cache_hits += hits;
        profile.cache_misses += misses;
    }

    pub fn profile(&self, tool_name: &str) -> Option<&ToolProfile> {
        self.profiles.iter().find(|p| p.tool_name == tool_name)
    }

    /// Profiles in the order tools were first seen
    pub fn profiles(&self) -> &[ToolProfile] {
        &self.profiles
    }

    fn profile_entry(&mut self, tool_name: &str) -> &mut ToolProfile {
        let index = match self.profiles.iter().position(|p| p.tool_name == tool_name) {
            Some(index) => index,
            None => {
                self.profiles.push(ToolProfile::new(tool_name));
                self.profiles.len() - 1
            }
        };
        &mut self.profiles[index]
    }

    /// Bottlenecks for every profiled tool, most severe first
    pub fn identify_bottlenecks(&self) -> Vec<Bottleneck> {
        bottleneck::detect(&self.profiles)
    }

    pub fn compare_phases(&self) -> PhaseComparison {
        let phase_time = |names: &[String]| -> f64 {
            names
                .iter()
                .filter_map(|name| self.profile(name))
                .map(ToolProfile::mean_time)
                .sum()
        };

        let fast_phase_time = phase_time(&self.phases.fast_tools);
        let comprehensive_phase_time = phase_time(&self.phases.comprehensive_tools);
        let time_ratio = if fast_phase_time > 0.0 {
            comprehensive_phase_time / fast_phase_time
        } else {
            0.0
        };

        PhaseComparison {
            fast_phase_time,
            comprehensive_phase_time,
            total_time: fast_phase_time + comprehensive_phase_time,
            tools_profiled: self.profiles.len(),
            time_ratio,
            bottlenecks: self.identify_bottlenecks(),
        }
    }

    /// Markdown report with a summary, per-tool statistics and bottlenecks
    pub fn generate_report(&self) -> String {
        let phases = self.compare_phases();
        let total_runs: usize = self.profiles.iter().map(|p| p.run_count).sum();
        let mut report = String::from("# Performance Profile Report\n");

        let _ = writeln!(report, "\n## Summary\n");
        let _ = writeln!(report, "- Tools profiled: {}", phases.tools_profiled);
        let _ = writeln!(report, "- Total runs: {}", total_runs);
        let _ = writeln!(report, "- Fast phase time: {:.3}s", phases.fast_phase_time);
        let _ = writeln!(
            report,
            "- Comprehensive phase time: {:.3}s",
            phases.comprehensive_phase_time
        );
        let _ = writeln!(report, "- Comprehensive/fast ratio: {:.2}x", phases.time_ratio);

        if !self.profiles.is_empty() {
            let _ = writeln!(report, "\n## Tool Profiles");
        }
        for profile in &self.profiles {
            let _ = writeln!(report, "\n### {}\n", profile.tool_name);
            let _ = writeln!(report, "- Runs: {}", profile.run_count);
            let _ = writeln!(report, "- Mean time: {:.3}s", profile.mean_time());
            let _ = writeln!(report, "- Median time: {:.3}s", profile.median_time());
            let _ = writeln!(report, "- Std deviation: {:.3}s", profile.stddev_time());
            let _ = writeln!(report, "- Mean memory delta: {:.2} MB", profile.mean_memory());
            let _ = writeln!(
                report,
                "- Cache hit rate: {:.1}% ({} hits, {} misses)",
                profile.cache_hit_rate(),
                profile.cache_hits,
                profile.cache_misses
            );
        }

        if !phases.bottlenecks.is_empty() {
            let _ = writeln!(report, "\n## Bottlenecks\n");
            for b in &phases.bottlenecks {
                let _ = writeln!(
                    report,
                    "- **{}** {} ({}): observed {:.2}, threshold {:.2}. {}",
                    b.severity.to_string().to_uppercase(),
                    b.tool_name,
                    b.metric,
                    b.observed_value,
                    b.threshold,
                    b.recommendation
                );
            }
        }

        report
    }
}

impl Default for PerformanceProfiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
