//! Content-addressed result cache
//!
//! Results are stored per `(tool, content hash)` pair and persisted as a single
//! JSON document under the cache directory. Records older than the TTL are
//! dropped when the cache is loaded; after that a loaded record stays valid for
//! the lifetime of the [`PersistentCache`] instance.
//!
//! The cache file is owned by one instance. There is no file locking, so two
//! processes sharing a cache directory race and the last writer wins.

mod fingerprint;

pub use fingerprint::{FileFingerprinter, Fingerprint, hash_bytes};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// File name of the persisted cache inside the cache directory
pub const CACHE_FILE_NAME: &str = "incremental_cache.json";

/// Default record lifetime (one day)
pub const DEFAULT_TTL_SECONDS: u64 = 86_400;

/// Cache directory used when none is configured, relative to the working directory
pub const DEFAULT_CACHE_SUBDIR: &str = ".crackerjack/cache";

/// A stored tool result for one file content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    pub tool_name: String,

    #[serde(rename = "file_hash")]
    pub fingerprint: Fingerprint,

    /// Opaque payload returned by the tool function
    #[serde(default)]
    pub result: Value,

    /// Write time as seconds since the unix epoch
    pub timestamp: f64,

    pub success: bool,

    #[serde(default)]
    pub error_message: Option<String>,
}

impl CacheRecord {
    pub fn key(&self) -> String {
        cache_key(&self.tool_name, &self.fingerprint.content_hash)
    }
}

/// Build the lookup key for a tool and content hash
pub fn cache_key(tool_name: &str, content_hash: &str) -> String {
    format!("{tool_name}:{content_hash}")
}

#[derive(Debug, Default, Deserialize)]
struct CacheDocument {
    #[serde(default)]
    entries: Vec<CacheRecord>,
}

#[derive(Serialize)]
struct CacheDocumentRef<'a> {
    entries: Vec<&'a CacheRecord>,
}

/// Result for a single file within an incremental run
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub path: PathBuf,
    /// Served from the cache rather than executed
    pub cached: bool,
    pub success: bool,
    pub result: Value,
    pub error_message: Option<String>,
}

impl FileResult {
    fn from_record(path: &Path, record: &CacheRecord, cached: bool) -> Self {
        Self {
            path: path.to_path_buf(),
            cached,
            success: record.success,
            result: record.result.clone(),
            error_message: record.error_message.clone(),
        }
    }
}

/// Aggregate result of [`PersistentCache::execute_incremental`]
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionOutcome {
    pub tool_name: String,
    pub files_processed: usize,
    pub files_cached: usize,
    pub files_changed: usize,
    pub cache_hit_rate: f64,
    pub execution_time: Duration,
    pub per_file_results: Vec<FileResult>,
}

impl ExecutionOutcome {
    fn new(
        tool_name: &str,
        files_cached: usize,
        per_file_results: Vec<FileResult>,
        execution_time: Duration,
    ) -> Self {
        let files_processed = per_file_results.len();

        Self {
            tool_name: tool_name.to_string(),
            files_processed,
            files_cached,
            files_changed: files_processed - files_cached,
            cache_hit_rate: percentage(files_cached, files_processed),
            execution_time,
            per_file_results,
        }
    }

    /// True when every file (cached or executed) succeeded
    pub fn all_succeeded(&self) -> bool {
        self.per_file_results.iter().all(|r| r.success)
    }

    /// Failed files with their error messages
    pub fn failures(&self) -> impl Iterator<Item = &FileResult> {
        self.per_file_results.iter().filter(|r| !r.success)
    }
}

/// Summary numbers about the cache contents
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub unique_tools: usize,
    pub success_rate_percent: f64,
    pub approx_size_mb: f64,
}

/// Disk-backed cache of per-(tool, file content) results
pub struct PersistentCache {
    cache_dir: PathBuf,
    cache_file: PathBuf,
    ttl_seconds: u64,
    index: HashMap<String, CacheRecord>,
}

impl PersistentCache {
    /// Open the cache in `cache_dir`, dropping records older than `ttl_seconds`
    pub fn new<P: Into<PathBuf>>(cache_dir: P, ttl_seconds: u64) -> Self {
        let cache_dir = cache_dir.into();
        let cache_file = cache_dir.join(CACHE_FILE_NAME);

        if let Err(e) = std::fs::create_dir_all(&cache_dir) {
            tracing::warn!("Cannot create cache directory {}: {}", cache_dir.display(), e);
        }

        let index = load_index(&cache_file, ttl_seconds);
        tracing::debug!(
            "Loaded {} cache records from {}",
            index.len(),
            cache_file.display()
        );

        Self {
            cache_dir,
            cache_file,
            ttl_seconds,
            index,
        }
    }

    /// Open the cache at `<cwd>/.crackerjack/cache` with the default TTL
    pub fn in_current_dir() -> Self {
        Self::new(default_cache_dir(), DEFAULT_TTL_SECONDS)
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Run `tool_fn` on every file whose content has no stored result
    ///
    /// Files with a stored result for `tool_name` are answered from the cache
    /// unless `force_rerun` is set. Failures of `tool_fn` are recorded in the
    /// per-file results and cached like successes. The cache file is rewritten
    /// once after all files are processed.
    pub async fn execute_incremental<F, Fut>(
        &mut self,
        tool_name: &str,
        files: &[PathBuf],
        mut tool_fn: F,
        force_rerun: bool,
    ) -> ExecutionOutcome
    where
        F: FnMut(PathBuf) -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        let start = Instant::now();
        let mut per_file_results = Vec::with_capacity(files.len());
        let mut files_cached = 0;

        for file in files {
            let fingerprint = FileFingerprinter::compute_fingerprint(file);
            let key = cache_key(tool_name, &fingerprint.content_hash);

            if !force_rerun {
                if let Some(record) = self.lookup(&key, &fingerprint) {
                    tracing::trace!("Cache hit for {} on {}", tool_name, file.display());
                    files_cached += 1;
                    per_file_results.push(FileResult::from_record(file, record, true));
                    continue;
                }
            }

            let (result, success, error_message) = match tool_fn(file.clone()).await {
                Ok(value) => (value, true, None),
                Err(e) => {
                    tracing::debug!("{} failed on {}: {:#}", tool_name, file.display(), e);
                    (Value::Null, false, Some(format!("{e:#}")))
                }
            };

            let record = CacheRecord {
                tool_name: tool_name.to_string(),
                fingerprint,
                result,
                timestamp: unix_now(),
                success,
                error_message,
            };
            per_file_results.push(FileResult::from_record(file, &record, false));

            // The sentinel must never become a hit for another unreadable file
            if !record.fingerprint.is_unreadable() {
                self.index.insert(key, record);
            }
        }

        self.persist();

        let outcome =
            ExecutionOutcome::new(tool_name, files_cached, per_file_results, start.elapsed());
        tracing::info!(
            "{}: {} files, {} cached, {} changed ({:.1}% hit rate)",
            tool_name,
            outcome.files_processed,
            outcome.files_cached,
            outcome.files_changed,
            outcome.cache_hit_rate
        );
        outcome
    }

    /// Files with no stored result for `tool_name`, in input order
    pub fn get_changed_files(&self, tool_name: &str, files: &[PathBuf]) -> Vec<PathBuf> {
        files
            .iter()
            .filter(|file| {
                let fingerprint = FileFingerprinter::compute_fingerprint(file);
                let key = cache_key(tool_name, &fingerprint.content_hash);
                self.lookup(&key, &fingerprint).is_none()
            })
            .cloned()
            .collect()
    }

    /// Remove every record for `path` across all tools
    pub fn invalidate_file<P: AsRef<Path>>(&mut self, path: P) -> usize {
        let path = path.as_ref();
        let before = self.index.len();
        self.index.retain(|_, record| record.fingerprint.path != path);

        let removed = before - self.index.len();
        if removed > 0 {
            tracing::debug!("Invalidated {} records for {}", removed, path.display());
            self.persist();
        }
        removed
    }

    /// Remove all records, or only those belonging to `tool_name`
    pub fn clear_cache(&mut self, tool_name: Option<&str>) -> usize {
        let before = self.index.len();
        match tool_name {
            Some(tool) => self.index.retain(|_, record| record.tool_name != tool),
            None => self.index.clear(),
        }

        let removed = before - self.index.len();
        if removed > 0 {
            self.persist();
        }
        removed
    }

    pub fn cache_stats(&self) -> CacheStats {
        let total_entries = self.index.len();
        let unique_tools = self
            .index
            .values()
            .map(|record| record.tool_name.as_str())
            .collect::<HashSet<_>>()
            .len();
        let successes = self.index.values().filter(|record| record.success).count();
        let size_bytes = std::fs::metadata(&self.cache_file)
            .map(|m| m.len())
            .unwrap_or(0);

        CacheStats {
            total_entries,
            unique_tools,
            success_rate_percent: percentage(successes, total_entries),
            approx_size_mb: size_bytes as f64 / (1024.0 * 1024.0),
        }
    }

    fn lookup(&self, key: &str, fingerprint: &Fingerprint) -> Option<&CacheRecord> {
        if fingerprint.is_unreadable() {
            return None;
        }
        self.index.get(key)
    }

    /// Rewrite the cache file; failures are logged and otherwise ignored
    fn persist(&self) {
        if let Err(e) = self.write_document() {
            tracing::warn!("Failed to persist cache: {:#}", e);
        }
    }

    fn write_document(&self) -> Result<()> {
        std::fs::create_dir_all(&self.cache_dir).with_context(|| {
            format!("Failed to create cache directory: {}", self.cache_dir.display())
        })?;

        let mut entries: Vec<&CacheRecord> = self.index.values().collect();
        entries.sort_by(|a, b| {
            a.timestamp
                .total_cmp(&b.timestamp)
                .then_with(|| a.key().cmp(&b.key()))
        });

        let content = serde_json::to_string_pretty(&CacheDocumentRef { entries })
            .context("Failed to serialize cache")?;
        std::fs::write(&self.cache_file, content)
            .with_context(|| format!("Failed to write cache file: {}", self.cache_file.display()))?;

        Ok(())
    }
}

/// `<cwd>/.crackerjack/cache`, or the bare relative path if cwd is unavailable
pub fn default_cache_dir() -> PathBuf {
    std::env::current_dir()
        .map(|cwd| cwd.join(DEFAULT_CACHE_SUBDIR))
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CACHE_SUBDIR))
}

fn load_index(cache_file: &Path, ttl_seconds: u64) -> HashMap<String, CacheRecord> {
    let content = match std::fs::read_to_string(cache_file) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
        Err(e) => {
            tracing::warn!("Cannot read cache file {}: {}", cache_file.display(), e);
            return HashMap::new();
        }
    };

    let document: CacheDocument = match serde_json::from_str(&content) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!(
                "Ignoring malformed cache file {}: {}",
                cache_file.display(),
                e
            );
            return HashMap::new();
        }
    };

    let now = unix_now();
    let ttl = ttl_seconds as f64;
    let mut expired = 0;
    let mut index = HashMap::with_capacity(document.entries.len());

    for record in document.entries {
        if now - record.timestamp > ttl {
            expired += 1;
            continue;
        }
        index.insert(record.key(), record);
    }

    if expired > 0 {
        tracing::debug!("Dropped {} expired cache records", expired);
    }
    index
}

pub(crate) fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// `100 * part / whole`, or 0 when `whole` is 0
pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}
