//! Glob pattern utilities
//!
//! Patterns follow shell conventions where `*` also crosses directory
//! separators, so `*.py` matches `src/pkg/mod.py` through its full path.

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Create a GlobSet from a list of patterns for efficient batch matching
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }

    Ok(builder.build()?)
}

/// Build a GlobSet, dropping (and logging) patterns that fail to parse
pub fn build_globset_lenient(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => tracing::warn!("Skipping invalid glob pattern '{}': {}", pattern, e),
        }
    }

    builder.build().unwrap_or_else(|e| {
        tracing::warn!("Failed to compile glob patterns: {}", e);
        GlobSet::empty()
    })
}

/// True when the file name or the full path matches any glob in the set
pub fn matches_name_or_path<P: AsRef<Path>>(globset: &GlobSet, path: P) -> bool {
    let path = path.as_ref();

    path.file_name()
        .is_some_and(|name| globset.is_match(Path::new(name)))
        || globset.is_match(path)
}
