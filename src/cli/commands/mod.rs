//! Command implementations for the Crackerjack CLI
//!
//! Each command is organized into its own module.

pub mod cache;
pub mod config;
pub mod run;
