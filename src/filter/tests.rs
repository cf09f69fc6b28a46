//! Tool filter tests

use super::*;
use crate::cache::DEFAULT_TTL_SECONDS;
use serde_json::{Value, json};
use std::fs;
use tempfile::TempDir;

fn tools(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn paths(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}

fn with_patterns(include: &[&str], exclude: &[&str]) -> FilterConfiguration {
    FilterConfiguration {
        include_patterns: tools(include),
        exclude_patterns: tools(exclude),
        ..FilterConfiguration::default()
    }
}

#[test]
fn test_filter_tools_by_name() {
    let filter = ToolFilter::new(FilterConfiguration {
        tool_name_filter: Some("X".to_string()),
        ..FilterConfiguration::default()
    });

    let outcome = filter.filter_tools(&tools(&["X", "Y", "Z"]));

    assert_eq!(outcome.total_tools, 3);
    assert_eq!(outcome.selected_tools, tools(&["X"]));
    assert_eq!(outcome.skipped_tools, tools(&["Y", "Z"]));
    assert!((outcome.effectiveness_percent - 66.67).abs() < 0.01);
}

#[test]
fn test_filter_tools_unknown_name_skips_everything() {
    let filter = ToolFilter::new(FilterConfiguration {
        tool_name_filter: Some("mypy".to_string()),
        ..FilterConfiguration::default()
    });

    let outcome = filter.filter_tools(&tools(&["ruff", "bandit"]));

    assert!(outcome.selected_tools.is_empty());
    assert_eq!(outcome.skipped_tools, tools(&["ruff", "bandit"]));
    assert_eq!(outcome.effectiveness_percent, 100.0);
}

#[test]
fn test_filter_tools_without_filter_selects_all() {
    let filter = ToolFilter::new(FilterConfiguration::default());

    let outcome = filter.filter_tools(&tools(&["ruff", "bandit"]));
    assert_eq!(outcome.selected_tools, tools(&["ruff", "bandit"]));
    assert!(outcome.skipped_tools.is_empty());
    assert_eq!(outcome.effectiveness_percent, 0.0);

    let empty = filter.filter_tools(&[]);
    assert_eq!(empty.total_tools, 0);
    assert_eq!(empty.effectiveness_percent, 0.0);
}

#[test]
fn test_filter_files_include_patterns() {
    let filter = ToolFilter::new(with_patterns(&["*.py"], &[]));

    let files = paths(&["src/app.py", "README.md", "tests/test_app.py"]);
    let outcome = filter.filter_files("ruff", &files);

    assert_eq!(outcome.selected_files, paths(&["src/app.py", "tests/test_app.py"]));
    assert_eq!(outcome.skipped_files, paths(&["README.md"]));
    assert!((outcome.effectiveness_percent - 33.33).abs() < 0.01);
}

#[test]
fn test_filter_files_exclude_patterns() {
    let filter = ToolFilter::new(with_patterns(&[], &["tests/*"]));

    let outcome = filter.filter_files("ruff", &paths(&["src/app.py", "tests/test_app.py"]));

    assert_eq!(outcome.selected_files, paths(&["src/app.py"]));
    assert_eq!(outcome.skipped_files, paths(&["tests/test_app.py"]));
}

#[test]
fn test_filter_files_no_patterns_is_noop() {
    let filter = ToolFilter::new(FilterConfiguration::default());
    let files = paths(&["a.py", "b.md"]);

    let outcome = filter.filter_files("ruff", &files);

    assert_eq!(outcome.selected_files, files);
    assert!(outcome.skipped_files.is_empty());
    assert_eq!(outcome.effectiveness_percent, 0.0);
}

#[test]
fn test_filter_files_excluded_file_counted_at_both_stages() {
    let filter = ToolFilter::new(with_patterns(&["*.py"], &["*.md"]));

    let outcome = filter.filter_files("ruff", &paths(&["app.py", "NOTES.md"]));

    assert_eq!(outcome.selected_files, paths(&["app.py"]));
    assert_eq!(outcome.skipped_files, paths(&["NOTES.md", "NOTES.md"]));
    assert_eq!(outcome.effectiveness_percent, 100.0);
}

#[tokio::test]
async fn test_filter_files_changed_only_uses_cache() {
    let workspace = TempDir::new().unwrap();
    let seen = workspace.path().join("seen.py");
    let fresh = workspace.path().join("fresh.py");
    fs::write(&seen, "x = 1\n").unwrap();
    fs::write(&fresh, "y = 2\n").unwrap();

    let mut cache = PersistentCache::new(workspace.path().join("cache"), DEFAULT_TTL_SECONDS);
    cache
        .execute_incremental(
            "ruff",
            &[seen.clone()],
            |_| async { Ok::<Value, anyhow::Error>(json!(null)) },
            false,
        )
        .await;

    let filter = ToolFilter::new(FilterConfiguration {
        changed_only: true,
        ..FilterConfiguration::default()
    })
    .with_cache(&cache);
    let all = vec![seen.clone(), fresh.clone()];

    let outcome = filter.filter_files("ruff", &all);
    assert_eq!(outcome.selected_files, vec![fresh.clone()]);
    assert_eq!(outcome.skipped_files, vec![seen.clone()]);
    assert_eq!(outcome.effectiveness_percent, 50.0);

    // Another tool has no cached results at all
    let other = filter.filter_files("bandit", &all);
    assert_eq!(other.selected_files, all);
}

#[tokio::test]
async fn test_changed_only_and_exclude_double_count() {
    let workspace = TempDir::new().unwrap();
    let cached_md = workspace.path().join("CHANGELOG.md");
    fs::write(&cached_md, "# changes\n").unwrap();

    let mut cache = PersistentCache::new(workspace.path().join("cache"), DEFAULT_TTL_SECONDS);
    cache
        .execute_incremental(
            "mdformat",
            &[cached_md.clone()],
            |_| async { Ok::<Value, anyhow::Error>(Value::Null) },
            false,
        )
        .await;

    let filter = ToolFilter::new(FilterConfiguration {
        changed_only: true,
        exclude_patterns: tools(&["*.md"]),
        ..FilterConfiguration::default()
    })
    .with_cache(&cache);

    let outcome = filter.filter_files("mdformat", &[cached_md.clone()]);

    assert!(outcome.selected_files.is_empty());
    assert_eq!(outcome.skipped_files, vec![cached_md.clone(), cached_md]);
    assert_eq!(outcome.effectiveness_percent, 200.0);
}

#[test]
fn test_changed_only_without_cache_keeps_candidates() {
    let filter = ToolFilter::new(FilterConfiguration {
        changed_only: true,
        ..FilterConfiguration::default()
    });
    let files = paths(&["a.py"]);

    assert_eq!(filter.filter_files("ruff", &files).selected_files, files);
}

#[test]
fn test_estimate_time_savings() {
    let baseline_times: HashMap<String, f64> =
        [("ruff".to_string(), 1.0), ("pyright".to_string(), 3.0)]
            .into_iter()
            .collect();

    let unfiltered = ToolFilter::new(FilterConfiguration::default());
    let savings = unfiltered.estimate_time_savings(&baseline_times);
    assert_eq!(savings.baseline, 4.0);
    assert_eq!(savings.filtered, 4.0);
    assert_eq!(savings.saved, 0.0);
    assert_eq!(savings.percent_saved, 0.0);

    let filtered = ToolFilter::new(FilterConfiguration {
        tool_name_filter: Some("ruff".to_string()),
        // Pattern options never influence the estimate
        include_patterns: tools(&["*.py"]),
        changed_only: true,
        ..FilterConfiguration::default()
    });
    let savings = filtered.estimate_time_savings(&baseline_times);
    assert_eq!(savings.filtered, 1.0);
    assert_eq!(savings.saved, 3.0);
    assert_eq!(savings.percent_saved, 75.0);

    let none = filtered.estimate_time_savings(&HashMap::new());
    assert_eq!(none.percent_saved, 0.0);
}

#[test]
fn test_generate_filter_summary_sections() {
    let filter = ToolFilter::new(FilterConfiguration {
        tool_name_filter: Some("ruff".to_string()),
        ..with_patterns(&["*.py"], &[])
    });
    let tool_outcome = filter.filter_tools(&tools(&["ruff", "bandit"]));
    let file_outcome = filter.filter_files("ruff", &paths(&["a.py", "b.md"]));

    let both = filter.generate_filter_summary(Some(&tool_outcome), Some(&file_outcome));
    assert!(both.contains("## Tool Filtering"));
    assert!(both.contains("## File Filtering"));
    assert!(both.contains("Effectiveness: 50.0%"));
    assert!(both.contains("Tool filter: ruff"));

    let tools_only = filter.generate_filter_summary(Some(&tool_outcome), None);
    assert!(tools_only.contains("## Tool Filtering"));
    assert!(!tools_only.contains("## File Filtering"));

    let neither = filter.generate_filter_summary(None, None);
    assert!(neither.contains("## Configuration"));
    assert!(!neither.contains("## Tool Filtering"));
}
