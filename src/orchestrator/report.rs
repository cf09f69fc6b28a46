use super::ExecutionSummary;
use crate::profiler::PerformanceProfiler;
use std::fmt::Write;

pub(super) fn render(summary: &ExecutionSummary, profiler: &PerformanceProfiler) -> String {
    let mut report = String::from("# Hook Execution Report\n");

    let _ = writeln!(report, "\n## Summary\n");
    let _ = writeln!(
        report,
        "- Hooks: {} total, {} run, {} skipped",
        summary.total_hooks, summary.hooks_run, summary.hooks_skipped
    );
    let _ = writeln!(
        report,
        "- Results: {} passed, {} failed",
        summary.hooks_succeeded, summary.hooks_failed
    );
    let _ = writeln!(
        report,
        "- Total time: {:.2}s",
        summary.total_execution_time.as_secs_f64()
    );
    let _ = writeln!(
        report,
        "- Filter effectiveness: {:.1}%",
        summary.filter_effectiveness_percent
    );
    let _ = writeln!(
        report,
        "- Cache effectiveness: {:.1}%",
        summary.cache_effectiveness_percent
    );

    let _ = writeln!(report, "\n## Results\n");
    let _ = writeln!(report, "| Hook | Status | Time (s) | Files | Cached | Hit rate |");
    let _ = writeln!(report, "|------|--------|----------|-------|--------|----------|");
    for outcome in &summary.outcomes {
        let _ = writeln!(
            report,
            "| {} | {} | {:.2} | {} | {} | {:.1}% |",
            outcome.hook_name,
            if outcome.success { "passed" } else { "FAILED" },
            outcome.execution_time.as_secs_f64(),
            outcome.files_processed,
            outcome.files_cached,
            outcome.cache_hit_rate
        );
    }

    let failures: Vec<_> = summary.outcomes.iter().filter(|o| !o.success).collect();
    if !failures.is_empty() {
        let _ = writeln!(report, "\n## Failures");
        for outcome in failures {
            let _ = writeln!(report, "\n### {}\n", outcome.hook_name);
            let _ = writeln!(report, "```");
            let _ = writeln!(
                report,
                "{}",
                outcome.error.as_deref().unwrap_or("no error message").trim_end()
            );
            let _ = writeln!(report, "```");
        }
    }

    report.push('\n');
    report.push_str(&profiler.generate_report());

    let _ = writeln!(report, "\n## Filtering Tips\n");
    let _ = writeln!(report, "- `--tool NAME` runs a single hook");
    let _ = writeln!(report, "- `--changed-only` skips files whose results are cached");
    let _ = writeln!(report, "- `--include GLOB` / `--exclude GLOB` narrow the file set");
    if summary.cache_effectiveness_percent == 0.0 && summary.hooks_run > 0 {
        let _ = writeln!(
            report,
            "- No cached results were used; a second run over unchanged files should be faster"
        );
    }

    report
}
