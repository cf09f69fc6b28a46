//! Configuration management for Crackerjack
//!
//! Values are layered with figment, later layers winning:
//!
//! 1. the embedded `default-config.toml`
//! 2. the user config at `~/.config/crackerjack/config.{toml,json,yaml,yml}`
//! 3. the repository config `crackerjack.{toml,json,yaml,yml}`
//! 4. `CRACKERJACK_` environment variables, `__` separating nested keys
//!
//! An explicit config file replaces layers 2 and 3.

use crate::cache::{DEFAULT_TTL_SECONDS, PersistentCache, default_cache_dir};
use crate::hooks::HookSpec;
use crate::profiler::PhaseSets;
use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Json, Toml, Yaml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

const ENV_PREFIX: &str = "CRACKERJACK_";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub cache: CacheConfig,

    /// Tool names per hook phase, used when comparing phases
    #[serde(default)]
    pub profiler: PhaseSets,

    /// Hooks in execution order
    #[serde(default)]
    pub hooks: Vec<HookSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory, `.crackerjack/cache` under the working directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Records older than this are dropped when the cache is opened
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
}

fn default_ttl() -> u64 {
    DEFAULT_TTL_SECONDS
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }
}

impl CacheConfig {
    pub fn cache_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(default_cache_dir)
    }

    pub fn open(&self) -> PersistentCache {
        PersistentCache::new(self.cache_dir(), self.ttl_seconds)
    }
}

impl EngineConfig {
    pub fn load() -> Result<Self> {
        Self::load_with_custom_config(None)
    }

    pub fn load_with_custom_config(custom_config: Option<&Path>) -> Result<Self> {
        let config: EngineConfig = Self::figment(custom_config)
            .extract()
            .context("Failed to load configuration")?;
        tracing::debug!("Loaded configuration with {} hooks", config.hooks.len());
        Ok(config)
    }

    fn figment(custom_config: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        if let Some(custom_path) = custom_config {
            figment = merge_file(figment, custom_path);
        } else {
            if let Some(user_dir) = dirs::config_dir() {
                let user_dir = user_dir.join("crackerjack");
                for name in ["config.toml", "config.json", "config.yaml", "config.yml"] {
                    figment = merge_file(figment, &user_dir.join(name));
                }
            }
            for name in [
                "crackerjack.toml",
                "crackerjack.json",
                "crackerjack.yaml",
                "crackerjack.yml",
            ] {
                figment = merge_file(figment, Path::new(name));
            }
        }

        // Environment variables always have highest priority
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Check invariants the engine relies on
    pub fn validate(&self) -> Result<()> {
        if self.cache.ttl_seconds == 0 {
            anyhow::bail!("cache.ttl_seconds must be greater than 0");
        }

        let mut seen = HashSet::new();
        for hook in &self.hooks {
            if hook.name.trim().is_empty() {
                anyhow::bail!("Hook name cannot be empty");
            }
            if !seen.insert(hook.name.as_str()) {
                anyhow::bail!("Duplicate hook name: {}", hook.name);
            }
            if hook.command.is_empty() {
                anyhow::bail!("Hook '{}' has an empty command", hook.name);
            }
            if hook.timeout == 0 {
                anyhow::bail!("Hook '{}' timeout cannot be 0", hook.name);
            }
        }

        Ok(())
    }

    pub fn hook(&self, name: &str) -> Option<&HookSpec> {
        self.hooks.iter().find(|hook| hook.name == name)
    }
}

/// Merge a config file, picking the format from its extension (TOML otherwise)
fn merge_file(figment: Figment, path: &Path) -> Figment {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => figment.merge(Json::file(path)),
        Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
        _ => figment.merge(Toml::file(path)),
    }
}
