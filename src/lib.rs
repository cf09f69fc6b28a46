//! # Crackerjack - Hook Execution Optimization Engine
//!
//! Runs quality-check hooks (linters, type checkers, security scanners) as
//! subprocesses and decides which hooks run, on which files, and when a
//! cached result can stand in for a fresh run.
//!
//! ## Components
//!
//! - [`cache`]: content-addressed fingerprints and a persistent per-tool result cache
//! - [`filter`]: tool-name and file-level selection with effectiveness reporting
//! - [`profiler`]: timing statistics, phase comparison and bottleneck detection
//! - [`orchestrator`]: composes the three to run a set of hooks
//!
//! ## Quick Start
//!
//! ```bash
//! # Declare hooks in crackerjack.toml, then
//! crackerjack run
//!
//! # Only re-check what changed since the last run
//! crackerjack run --changed-only --report report.md
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod filter;
pub mod hooks;
pub mod orchestrator;
pub mod profiler;
pub mod shared;

pub use cli::{Cli, Output};
pub use config::EngineConfig;

/// Result type alias for Crackerjack operations
pub type Result<T> = anyhow::Result<T>;
