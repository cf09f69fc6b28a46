//! Cache maintenance commands

use anyhow::Result;

use crate::cli::{CacheCommands, OutputFormat, Output};
use crate::config::EngineConfig;

pub fn execute(
    cmd: CacheCommands,
    config: &EngineConfig,
    format: OutputFormat,
    output: &Output,
) -> Result<()> {
    let mut cache = config.cache.open();

    match cmd {
        CacheCommands::Stats => {
            let stats = cache.cache_stats();
            match format {
                OutputFormat::Json => output.raw(&serde_json::to_string_pretty(&stats)?),
                OutputFormat::Text => {
                    output.header("Cache Statistics");
                    output.key_value("Cache file", &cache.cache_file().display().to_string());
                    output.key_value("Entries", &stats.total_entries.to_string());
                    output.key_value("Tools", &stats.unique_tools.to_string());
                    output.key_value(
                        "Success rate",
                        &format!("{:.1}%", stats.success_rate_percent),
                    );
                    output.key_value("Approx. size", &format!("{:.3} MB", stats.approx_size_mb));
                }
            }
        }
        CacheCommands::Clear { tool } => {
            let removed = cache.clear_cache(tool.as_deref());
            match tool {
                Some(tool) => {
                    output.success(&format!("Removed {removed} cached results for {tool}"))
                }
                None => output.success(&format!("Removed {removed} cached results")),
            }
        }
        CacheCommands::Invalidate { path } => {
            let mut removed = cache.invalidate_file(&path);
            // `run` records absolute paths
            if path.is_relative() {
                removed += cache.invalidate_file(std::env::current_dir()?.join(&path));
            }
            output.success(&format!(
                "Removed {removed} cached results for {}",
                path.display()
            ));
        }
        CacheCommands::Changed { tool, files } => {
            let changed = cache.get_changed_files(&tool, &files);
            match format {
                OutputFormat::Json => output.raw(&serde_json::to_string_pretty(&changed)?),
                OutputFormat::Text => {
                    output.info(&format!(
                        "{} of {} files need {} to run",
                        changed.len(),
                        files.len(),
                        tool
                    ));
                    for file in &changed {
                        output.list_item(&file.display().to_string());
                    }
                }
            }
        }
    }

    Ok(())
}
