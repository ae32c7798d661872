//! Durable key/value state storage.
//!
//! `FileStore` keeps the whole map in memory and rewrites the backing TOML
//! file atomically on `flush` (write to a sibling temp file, fsync, rename).
//! Puts only mutate the in-memory table; the tracker calls `flush` once per
//! mutation batch, which keeps the write-through policy to one file write
//! per sensor callback.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use stride_traits::StateStore;

use crate::error::{PlatformError, Result};

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("new");
    {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    fs::rename(tmp, path)
}

/// TOML-file-backed `StateStore`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    table: toml::Table,
}

impl FileStore {
    /// Open or create a store at `path`. A missing file is an empty store;
    /// an unparseable file is reported, not silently discarded.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let table = match fs::read_to_string(&path) {
            Ok(text) => text
                .parse::<toml::Table>()
                .map_err(|e| PlatformError::Corrupt(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => toml::Table::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, table })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStore {
    fn get_i64(&self, key: &str) -> Option<i64> {
        self.table.get(key).and_then(toml::Value::as_integer)
    }

    fn get_f64(&self, key: &str) -> Option<f64> {
        let v = self.table.get(key)?;
        v.as_float().or_else(|| v.as_integer().map(|i| i as f64))
    }

    fn put_i64(
        &mut self,
        key: &str,
        value: i64,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.table.insert(key.to_owned(), toml::Value::Integer(value));
        Ok(())
    }

    fn put_f64(
        &mut self,
        key: &str,
        value: f64,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.table.insert(key.to_owned(), toml::Value::Float(value));
        Ok(())
    }

    fn remove(
        &mut self,
        key: &str,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.table.remove(key);
        Ok(())
    }

    fn flush(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).map_err(PlatformError::Io)?;
            }
        }
        let text = toml::to_string(&self.table)
            .map_err(|e| PlatformError::Corrupt(e.to_string()))?;
        write_atomic(&self.path, text.as_bytes()).map_err(PlatformError::Io)?;
        Ok(())
    }

    fn contains(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }
}
