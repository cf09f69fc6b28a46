//! Hook definitions and how they are executed
//!
//! A hook is an external quality-check tool run as a subprocess. Hook
//! registries hand the engine anything implementing [`HookDefinition`]; the
//! configuration file provides [`HookSpec`] values.
//!
//! ```toml
//! [[hooks]]
//! name = "ruff-check"
//! command = ["ruff", "check"]
//! timeout = 60
//! accepts_file_paths = true
//! file_patterns = ["*.py"]
//! ```
//!
//! Hooks that accept file paths are run once per file with the path appended
//! to their command, which lets results be cached per file content.

mod command;
mod config;
mod files;

pub use command::{CommandOutput, CommandStatus, run_command};
pub use config::HookSpec;
pub use files::{FileResolver, ProjectFiles, StaticFiles};

use std::time::Duration;

/// What the engine needs to know about a hook
pub trait HookDefinition {
    fn name(&self) -> &str;

    /// Upper bound for a single subprocess run
    fn timeout(&self) -> Duration;

    /// Whether the command accepts file paths as trailing arguments
    fn accepts_file_paths(&self) -> bool;

    /// Program and arguments
    fn command(&self) -> Vec<String>;

    /// Globs selecting candidate files; empty means every file
    fn file_patterns(&self) -> &[String] {
        &[]
    }
}
