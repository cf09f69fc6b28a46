//! Candidate file resolution for per-file hooks

use super::HookDefinition;
use crate::shared::glob::{build_globset_lenient, matches_name_or_path};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Supplies the candidate files for a hook
pub trait FileResolver {
    fn resolve(&self, hook: &dyn HookDefinition) -> Vec<PathBuf>;
}

/// Walks a project tree, honouring `.gitignore` and hidden-file rules
pub struct ProjectFiles {
    root: PathBuf,
}

impl ProjectFiles {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn walk(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkBuilder::new(&self.root)
            .build()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
            .map(|entry| entry.into_path())
            .collect();

        files.sort();
        files
    }
}

impl FileResolver for ProjectFiles {
    fn resolve(&self, hook: &dyn HookDefinition) -> Vec<PathBuf> {
        let files = self.walk();
        let patterns = hook.file_patterns();
        if patterns.is_empty() {
            return files;
        }

        let globset = build_globset_lenient(patterns);
        files
            .into_iter()
            .filter(|file| {
                let relative = file.strip_prefix(&self.root).unwrap_or(file);
                matches_name_or_path(&globset, relative)
            })
            .collect()
    }
}

/// A fixed list of files handed in by the caller (e.g. staged files)
pub struct StaticFiles {
    files: Vec<PathBuf>,
}

impl StaticFiles {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files }
    }
}

impl FileResolver for StaticFiles {
    fn resolve(&self, hook: &dyn HookDefinition) -> Vec<PathBuf> {
        let patterns = hook.file_patterns();
        if patterns.is_empty() {
            return self.files.clone();
        }

        let globset = build_globset_lenient(patterns);
        self.files
            .iter()
            .filter(|file| matches_name_or_path(&globset, file))
            .cloned()
            .collect()
    }
}
