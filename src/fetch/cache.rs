use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{trace, warn};

use super::Fetcher;
use crate::error::TransportError;

/// On-disk memo of every response, keyed by URL.
///
/// Entries live at `<dir>/<sha256(url)>.json` and never expire; use
/// [`clear`] to start over.
pub struct CachedFetcher<F> {
    inner: F,
    dir: PathBuf,
}

impl<F: Fetcher> CachedFetcher<F> {
    pub fn new(inner: F, dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            dir: dir.into(),
        }
    }

    pub fn entry_path(&self, url: &str) -> PathBuf {
        entry_path(&self.dir, url)
    }

    fn read(&self, path: &Path) -> Option<Value> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable cache entry, refetching");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupt cache entry, refetching");
                None
            }
        }
    }

    fn write(&self, path: &Path, doc: &Value) -> Result<(), TransportError> {
        let cache_err = |source: std::io::Error| TransportError::Cache {
            path: path.to_path_buf(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(cache_err)?;
        let body = serde_json::to_vec(doc).map_err(|e| cache_err(e.into()))?;
        fs::write(path, body).map_err(cache_err)
    }
}

impl<F: Fetcher> Fetcher for CachedFetcher<F> {
    fn fetch(&self, url: &str) -> Result<Value, TransportError> {
        let path = self.entry_path(url);
        if let Some(doc) = self.read(&path) {
            trace!(url, "Cache hit");
            return Ok(doc);
        }

        let doc = self.inner.fetch(url)?;
        self.write(&path, &doc)?;
        Ok(doc)
    }
}

fn entry_path(dir: &Path, url: &str) -> PathBuf {
    let digest = Sha256::digest(url.as_bytes());
    dir.join(format!("{}.json", hex::encode(digest)))
}

/// Delete the cache directory. Returns false if there was nothing to delete.
pub fn clear(dir: &Path) -> Result<bool, TransportError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(source) => Err(TransportError::Cache {
            path: dir.to_path_buf(),
            source,
        }),
    }
}
