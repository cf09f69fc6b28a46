//! Configuration commands

use anyhow::Result;

use crate::cli::{ConfigCommands, OutputFormat, Output};
use crate::config::EngineConfig;

pub fn execute(
    cmd: ConfigCommands,
    config: &EngineConfig,
    format: OutputFormat,
    output: &Output,
) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show(config, format, output),
        ConfigCommands::Validate => validate(config, output),
    }
}

fn show(config: &EngineConfig, format: OutputFormat, output: &Output) -> Result<()> {
    match format {
        OutputFormat::Json => output.raw(&serde_json::to_string_pretty(config)?),
        OutputFormat::Text => {
            output.header("Configuration");
            output.key_value("Cache directory", &config.cache.cache_dir().display().to_string());
            output.key_value("Cache TTL", &format!("{}s", config.cache.ttl_seconds));
            output.key_value("Fast phase tools", &config.profiler.fast_tools.len().to_string());
            output.key_value(
                "Comprehensive tools",
                &config.profiler.comprehensive_tools.len().to_string(),
            );

            output.header("Hooks");
            if config.hooks.is_empty() {
                output.info("No hooks configured");
            }
            for hook in &config.hooks {
                let mode = if hook.accepts_file_paths { "per file" } else { "whole project" };
                output.list_item(&format!(
                    "{} ({}, timeout {}s): {}",
                    hook.name,
                    mode,
                    hook.timeout,
                    hook.command.join(" ")
                ));
            }
        }
    }
    Ok(())
}

fn validate(config: &EngineConfig, output: &Output) -> Result<()> {
    match config.validate() {
        Ok(()) => {
            output.success(&format!(
                "Configuration is valid ({} hooks)",
                config.hooks.len()
            ));
            Ok(())
        }
        Err(e) => {
            output.error(&format!("Configuration is invalid: {e}"));
            Err(e)
        }
    }
}
