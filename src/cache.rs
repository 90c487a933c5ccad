//! Persistence of computed result sets, keyed by a caller-chosen identifier.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::PathBuf;

use log::debug;
use tempfile::NamedTempFile;

use crate::compare::ResultSet;
use crate::error::{DunningError, Result};

/// Outcome of a cache read that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<T> {
    Found(T),
    NotFound,
}

impl<T> CacheLookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            CacheLookup::Found(v) => Some(v),
            CacheLookup::NotFound => None,
        }
    }
}

/// Storage for result sets. A missing entry is `Ok(CacheLookup::NotFound)`; `Err` is reserved for
/// entries that exist but cannot be read or decoded.
pub trait ResultCache {
    fn load(&self, key: &str) -> Result<CacheLookup<ResultSet>>;
    fn store(&self, results: &ResultSet, key: &str) -> Result<PathBuf>;
}

/// Stores each result set as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct DirCache {
    dir: PathBuf,
}

impl DirCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Location of the entry for `key`, whether or not it exists.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_key(key)))
    }
}

impl ResultCache for DirCache {
    fn load(&self, key: &str) -> Result<CacheLookup<ResultSet>> {
        let path = self.entry_path(key);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("cache miss for '{key}' ({})", path.display());
                return Ok(CacheLookup::NotFound);
            }
            Err(e) => return Err(e.into()),
        };
        let results: ResultSet =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                DunningError::CacheCorrupt {
                    key: key.to_string(),
                    source,
                }
            })?;
        Ok(CacheLookup::Found(results))
    }

    fn store(&self, results: &ResultSet, key: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.entry_path(key);

        // Write next to the target and rename, so readers never see a half-written entry.
        let temp_file = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(&temp_file);
            serde_json::to_writer(&mut writer, results)?;
            writer.flush()?;
        }
        temp_file.persist(&path).map_err(|e| e.error)?;
        Ok(path)
    }
}

/// Keys come from corpus names and search terms. Bytes outside `[A-Za-z0-9._-]`, and `%` itself,
/// are percent-encoded so that distinct keys never share a file.
fn encode_key(key: &str) -> String {
    if key.is_empty() {
        // No encoded key is a bare `%`.
        return "%".to_string();
    }
    // "." and ".." are directory entries, not file names.
    let dots_only = key.bytes().all(|b| b == b'.');
    let mut encoded = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_') || (b == b'.' && !dots_only) {
            encoded.push(char::from(b));
        } else {
            encoded.push_str(&format!("%{b:02X}"));
        }
    }
    encoded
}
