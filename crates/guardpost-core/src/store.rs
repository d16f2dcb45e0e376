//! Persistent key-value storage used by the cache.
//!
//! The cache never touches the filesystem directly; it talks to a
//! `KeyValueStore`. `FileStore` keeps one JSON file per key in the cache
//! directory, `MemoryStore` keeps everything in a map for tests and
//! `--no-cache` runs.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing::debug;

/// String-keyed, string-valued storage with no expiry of its own.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
    fn keys(&self) -> Result<Vec<String>>;
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.lock()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

// ============================================================================
// File-backed store
// ============================================================================

const ENTRY_EXTENSION: &str = "json";

/// Longest escaped key used directly as a file stem. Longer keys (long or
/// non-ASCII search filters) are stored under a hash so the name stays well
/// inside NAME_MAX.
const MAX_PLAIN_STEM_LEN: usize = 120;

/// Prefix for hashed stems. `encode_key` never emits `~~`, so the two kinds
/// of stem cannot collide.
const HASHED_STEM_PREFIX: &str = "~~";

/// One JSON file per key. Writes go to a unique temp file in the same
/// directory and are renamed into place, so readers never see a partial
/// entry and overlapping writers of one key do not disturb each other.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", file_stem(key).0, ENTRY_EXTENSION))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache entry: {}", key))?;

        if !file_stem(key).1 {
            return Ok(Some(contents));
        }
        // Hashed entries carry their key on the first line
        match contents.split_once('\n') {
            Some((header, value)) if header == encode_key(key) => Ok(Some(value.to_string())),
            _ => {
                debug!(cache = %key, file = %path.display(), "Hashed cache file holds another key");
                Ok(None)
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.entry_path(key);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("Failed to create temp file for cache entry: {}", key))?;

        let written = if file_stem(key).1 {
            write!(tmp, "{}\n{}", encode_key(key), value)
        } else {
            tmp.write_all(value.as_bytes())
        };
        written.with_context(|| format!("Failed to write cache entry: {}", key))?;

        tmp.persist(&path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace cache entry: {}", key))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to delete cache entry: {}", key))?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let key = if stem.starts_with(HASHED_STEM_PREFIX) {
                read_hashed_header(&path)
            } else {
                decode_key(stem)
            };
            match key {
                Some(key) => keys.push(key),
                None => debug!(file = %path.display(), "Skipping foreign file in cache dir"),
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// File stem for `key`, and whether it had to be hashed.
fn file_stem(key: &str) -> (String, bool) {
    let encoded = encode_key(key);
    if encoded.len() <= MAX_PLAIN_STEM_LEN {
        return (encoded, false);
    }
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    (format!("{}{:016x}", HASHED_STEM_PREFIX, hasher.finish()), true)
}

fn read_hashed_header(path: &Path) -> Option<String> {
    let contents = std::fs::read_to_string(path).ok()?;
    let (header, _) = contents.split_once('\n')?;
    decode_key(header)
}

/// Escape a key into a portable file stem.
/// ASCII alphanumerics, `-` and `_` pass through; every other byte becomes `~XX`.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            out.push(b as char);
        } else {
            out.push_str(&format!("~{:02X}", b));
        }
    }
    out
}

fn decode_key(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'~' {
            let hex = stem.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
