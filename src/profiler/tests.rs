//! Profiler tests

use super::*;

fn secs(value: f64) -> Duration {
    Duration::from_secs_f64(value)
}

fn time_bottlenecks(profiler: &PerformanceProfiler) -> Vec<Bottleneck> {
    profiler
        .identify_bottlenecks()
        .into_iter()
        .filter(|b| b.metric == MetricType::Time)
        .collect()
}

#[test]
fn test_profile_tool_records_every_run() {
    let mut profiler = PerformanceProfiler::new();
    let mut calls = 0;

    let profile = profiler.profile_tool("ruff-check", || calls += 1, 3);

    assert_eq!(calls, 3);
    assert_eq!(profile.run_count, 3);
    assert_eq!(profile.execution_times.len(), 3);
    assert_eq!(profile.memory_samples.len(), 3);
    // Cache counters are left to external callers
    assert_eq!(profile.cache_hits + profile.cache_misses, 0);
    assert_eq!(profiler.profile("ruff-check"), Some(&profile));
}

#[test]
fn test_profile_tool_accumulates_across_calls() {
    let mut profiler = PerformanceProfiler::new();

    profiler.profile_tool("bandit", || (), 2);
    let profile = profiler.profile_tool("bandit", || "ignored", 1);

    assert_eq!(profile.run_count, 3);
    assert_eq!(profiler.profiles().len(), 1);
}

#[test]
fn test_statistics() {
    let mut profile = ToolProfile::new("pyright");
    assert_eq!(profile.mean_time(), 0.0);
    assert_eq!(profile.median_time(), 0.0);
    assert_eq!(profile.stddev_time(), 0.0);

    profile.execution_times = vec![1.0];
    assert_eq!(profile.stddev_time(), 0.0);

    profile.execution_times = vec![4.0, 1.0, 3.0, 2.0];
    assert_eq!(profile.mean_time(), 2.5);
    assert_eq!(profile.median_time(), 2.5);
    assert!((profile.stddev_time() - 1.290_994).abs() < 1e-5);

    profile.execution_times = vec![5.0, 1.0, 3.0];
    assert_eq!(profile.median_time(), 3.0);

    profile.memory_samples = vec![10.0, 20.0];
    assert_eq!(profile.mean_memory(), 15.0);
}

#[test]
fn test_cache_hit_rate() {
    let mut profiler = PerformanceProfiler::new();
    profiler.record_cache_activity("ruff", 3, 1);

    let profile = profiler.profile("ruff").unwrap();
    assert_eq!(profile.cache_hit_rate(), 75.0);
    assert_eq!(profile.run_count, 0);
    assert_eq!(ToolProfile::new("empty").cache_hit_rate(), 0.0);
}

#[test]
fn test_time_thresholds() {
    let mut profiler = PerformanceProfiler::new();
    profiler.record_execution("below", secs(1.99));
    profiler.record_execution("medium", secs(2.01));
    profiler.record_execution("high", secs(5.01));

    let found = time_bottlenecks(&profiler);

    assert_eq!(found.len(), 2);
    assert_eq!(found[0].tool_name, "high");
    assert_eq!(found[0].severity, Severity::High);
    assert_eq!(found[1].tool_name, "medium");
    assert_eq!(found[1].severity, Severity::Medium);
    assert_eq!(found[1].threshold, 2.0);
}

#[test]
fn test_tool_can_have_several_bottlenecks() {
    let mut profiler = PerformanceProfiler::new();
    profiler.record_execution("pyright", secs(3.0));
    profiler.record_memory("pyright", 700.0);
    profiler.record_cache_activity("pyright", 1, 20);

    let found = profiler.identify_bottlenecks();

    let summary: Vec<(MetricType, Severity)> =
        found.iter().map(|b| (b.metric, b.severity)).collect();
    assert_eq!(
        summary,
        vec![
            (MetricType::Memory, Severity::High),
            (MetricType::Time, Severity::Medium),
            (MetricType::Cache, Severity::Medium),
        ]
    );
}

#[test]
fn test_no_bottlenecks_for_healthy_tools() {
    let mut profiler = PerformanceProfiler::new();
    profiler.record_execution("ruff", secs(0.2));
    profiler.record_cache_activity("ruff", 30, 2);

    assert!(profiler.identify_bottlenecks().is_empty());
}

#[test]
fn test_compare_phases() {
    let mut profiler = PerformanceProfiler::new();
    profiler.record_execution("ruff-check", secs(1.0));
    profiler.record_execution("ruff-check", secs(3.0));
    profiler.record_execution("codespell", secs(0.5));
    profiler.record_execution("pyright", secs(5.0));
    profiler.record_execution("custom-tool", secs(9.0));

    let phases = profiler.compare_phases();

    assert_eq!(phases.fast_phase_time, 2.5);
    assert_eq!(phases.comprehensive_phase_time, 5.0);
    assert_eq!(phases.total_time, 7.5);
    assert_eq!(phases.tools_profiled, 4);
    assert_eq!(phases.time_ratio, 2.0);
    assert!(!phases.bottlenecks.is_empty());
}

#[test]
fn test_compare_phases_without_fast_tools() {
    let mut profiler = PerformanceProfiler::new();
    profiler.record_execution("pyright", secs(1.0));

    let phases = profiler.compare_phases();

    assert_eq!(phases.fast_phase_time, 0.0);
    assert_eq!(phases.time_ratio, 0.0);
}

#[test]
fn test_custom_phase_sets() {
    let mut profiler = PerformanceProfiler::with_phases(PhaseSets {
        fast_tools: vec!["fmt".to_string()],
        comprehensive_tools: vec!["clippy".to_string()],
    });
    profiler.record_execution("fmt", secs(0.5));
    profiler.record_execution("clippy", secs(2.0));

    assert_eq!(profiler.compare_phases().time_ratio, 4.0);
}

#[test]
fn test_generate_report() {
    let mut profiler = PerformanceProfiler::new();
    profiler.record_execution("ruff-check", secs(0.1));

    let report = profiler.generate_report();
    assert!(report.contains("# Performance Profile Report"));
    assert!(report.contains("### ruff-check"));
    assert!(report.contains("- Runs: 1"));
    assert!(!report.contains("## Bottlenecks"));

    profiler.record_execution("pyright", secs(6.0));
    let report = profiler.generate_report();
    assert!(report.contains("## Bottlenecks"));
    assert!(report.contains("**HIGH** pyright (time)"));
}
