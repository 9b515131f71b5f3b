/*!
 * Change cache for incremental translation.
 *
 * One JSON record per source document records the fingerprint of the content that
 * was last processed. A document whose current fingerprint matches its record is
 * skipped. Records are replaced atomically (temp file + rename), so concurrent
 * readers never see a half-written record and the last writer wins.
 */

use chrono::Utc;
use log::{debug, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

use crate::errors::TranslationError;

/// Longest sanitized key prefix kept in a record file name
const MAX_KEY_PREFIX: usize = 80;

/// SHA-256 hex digest of `content`
pub fn fingerprint(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}

/// What the cache remembers about a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Fingerprint of the last processed content
    pub fingerprint: String,
    /// Milliseconds since the Unix epoch of the last successful processing
    pub timestamp: i64,
}

impl CacheEntry {
    /// Entry stamped with the current time
    pub fn new(fingerprint: impl Into<String>) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// On-disk record; `hash` is accepted for records written by older tooling
#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord {
    #[serde(default)]
    key: Option<String>,
    #[serde(alias = "hash")]
    fingerprint: String,
    #[serde(default)]
    timestamp: i64,
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Number of records on disk
    pub entries: usize,
    /// Total size of the records in bytes
    pub size_bytes: u64,
    /// Lookups that found a record
    pub hits: usize,
    /// Lookups that found nothing usable
    pub misses: usize,
}

/// File-backed change cache
#[derive(Debug, Clone)]
pub struct ChangeCache {
    /// Directory holding one record per document
    dir: PathBuf,

    /// Cache hit counter
    hits: Arc<RwLock<usize>>,

    /// Cache miss counter
    misses: Arc<RwLock<usize>>,
}

impl ChangeCache {
    /// Open (and create if needed) a cache directory; creation failures are logged only
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(e) = fs::create_dir_all(&dir) {
            warn!("Cannot create cache directory {:?}, caching will be ineffective: {}", dir, e);
        }

        Self {
            dir,
            hits: Arc::new(RwLock::new(0)),
            misses: Arc::new(RwLock::new(0)),
        }
    }

    /// The cache directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fingerprint of `content`
    pub fn hash(content: &str) -> String {
        fingerprint(content)
    }

    /// File name safe form of a key: sanitized prefix plus a digest of the full key
    pub fn sanitize_key(key: &str) -> String {
        let prefix: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .take(MAX_KEY_PREFIX)
            .collect();
        let digest = fingerprint(key);

        format!("{}_{}", prefix, &digest[..16])
    }

    /// Path of the record for `key`
    pub fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", Self::sanitize_key(key)))
    }

    /// Look up a key; unreadable or corrupt records count as absent
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let entry = self.read_record(key);
        match &entry {
            Some(_) => {
                *self.hits.write() += 1;
                debug!("Cache hit for '{}'", key);
            }
            None => {
                *self.misses.write() += 1;
                debug!("Cache miss for '{}'", key);
            }
        }
        entry
    }

    fn read_record(&self, key: &str) -> Option<CacheEntry> {
        let path = self.record_path(key);
        if !path.exists() {
            return None;
        }

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Cache read error for {:?}: {}", path, e);
                return None;
            }
        };

        match serde_json::from_str::<CacheRecord>(&raw) {
            Ok(record) if record.key.as_deref().is_none_or(|stored| stored == key) => Some(CacheEntry {
                fingerprint: record.fingerprint,
                timestamp: record.timestamp,
            }),
            Ok(_) => {
                warn!("Cache record {:?} belongs to another key, ignoring it", path);
                None
            }
            Err(e) => {
                warn!("Corrupt cache record {:?}, treating as absent: {}", path, e);
                None
            }
        }
    }

    /// Store an entry, replacing any previous record for the key
    pub fn set(&self, key: &str, entry: &CacheEntry) -> Result<(), TranslationError> {
        let record = CacheRecord {
            key: Some(key.to_string()),
            fingerprint: entry.fingerprint.clone(),
            timestamp: entry.timestamp,
        };
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| TranslationError::CacheIo(e.to_string()))?;

        fs::create_dir_all(&self.dir)
            .map_err(|e| TranslationError::CacheIo(format!("{:?}: {}", self.dir, e)))?;

        let path = self.record_path(key);
        let mut temp = NamedTempFile::new_in(&self.dir)
            .map_err(|e| TranslationError::CacheIo(format!("{:?}: {}", self.dir, e)))?;
        temp.write_all(json.as_bytes())
            .map_err(|e| TranslationError::CacheIo(format!("{:?}: {}", path, e)))?;
        temp.persist(&path)
            .map_err(|e| TranslationError::CacheIo(format!("{:?}: {}", path, e.error)))?;

        debug!("Cached fingerprint for '{}'", key);
        Ok(())
    }

    /// Whether `key` was last processed with exactly this fingerprint
    pub fn is_unchanged(&self, key: &str, fingerprint: &str) -> bool {
        self.get(key)
            .is_some_and(|entry| entry.fingerprint == fingerprint)
    }

    /// Remove every record; returns how many were removed
    pub fn clear(&self) -> Result<usize, TranslationError> {
        if !self.dir.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        for path in self.record_files()? {
            fs::remove_file(&path)
                .map_err(|e| TranslationError::CacheIo(format!("{:?}: {}", path, e)))?;
            removed += 1;
        }

        *self.hits.write() = 0;
        *self.misses.write() = 0;

        debug!("Change cache cleared ({} records)", removed);
        Ok(removed)
    }

    /// Record count, size and lookup counters
    pub fn stats(&self) -> CacheStats {
        let files = self.record_files().unwrap_or_default();
        let size_bytes = files
            .iter()
            .filter_map(|path| fs::metadata(path).ok())
            .map(|meta| meta.len())
            .sum();

        CacheStats {
            entries: files.len(),
            size_bytes,
            hits: *self.hits.read(),
            misses: *self.misses.read(),
        }
    }

    fn record_files(&self) -> Result<Vec<PathBuf>, TranslationError> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| TranslationError::CacheIo(format!("{:?}: {}", self.dir, e)))?;

        Ok(entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect())
    }
}
