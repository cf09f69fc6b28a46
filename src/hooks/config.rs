use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::HookDefinition;

/// A hook as declared in configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HookSpec {
    pub name: String,

    /// Program and arguments; file paths are appended for per-file runs
    pub command: Vec<String>,

    /// Timeout in seconds for a single subprocess
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub accepts_file_paths: bool,

    /// Globs selecting the files this hook checks (empty means every file)
    #[serde(default)]
    pub file_patterns: Vec<String>,
}

fn default_timeout() -> u64 {
    300
}

impl HookSpec {
    pub fn new(name: &str, command: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            command: command.iter().map(|arg| arg.to_string()).collect(),
            timeout: default_timeout(),
            accepts_file_paths: false,
            file_patterns: Vec::new(),
        }
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    pub fn per_file(mut self, patterns: &[&str]) -> Self {
        self.accepts_file_paths = true;
        self.file_patterns = patterns.iter().map(|p| p.to_string()).collect();
        self
    }
}

impl HookDefinition for HookSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    fn accepts_file_paths(&self) -> bool {
        self.accepts_file_paths
    }

    fn command(&self) -> Vec<String> {
        self.command.clone()
    }

    fn file_patterns(&self) -> &[String] {
        &self.file_patterns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_deserializing() {
        let spec: HookSpec = serde_json::from_value(serde_json::json!({
            "name": "ruff-check",
            "command": ["ruff", "check"]
        }))
        .unwrap();

        assert_eq!(spec.timeout, 300);
        assert!(!spec.accepts_file_paths);
        assert!(spec.file_patterns.is_empty());
        assert_eq!(HookDefinition::timeout(&spec), Duration::from_secs(300));
    }

    #[test]
    fn test_builder_helpers() {
        let spec = HookSpec::new("bandit", &["bandit", "-q"])
            .with_timeout(30)
            .per_file(&["*.py"]);

        assert_eq!(spec.command(), vec!["bandit".to_string(), "-q".to_string()]);
        assert!(spec.accepts_file_paths());
        assert_eq!(spec.file_patterns(), ["*.py".to_string()]);
        assert_eq!(spec.timeout, 30);
    }
}
