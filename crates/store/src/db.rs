//! Byte-addressed blob storage behind the trace store.
//!
//! The store itself is agnostic about where blobs live; anything that can
//! get, put and enumerate keys will do. The directory-backed variant keeps
//! one file per key with hex-encoded names.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use crate::error::StoreError;

/// Flat key-value access to opaque blobs. Writes are whole-value; keys are
/// raw bytes with no namespacing.
pub trait BlobDb {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;
    /// Every stored key, in deterministic order. Used by schema upgrades.
    fn keys(&self) -> Result<Vec<Vec<u8>>, StoreError>;
}

/// Volatile in-memory backend, for tests and short-lived tooling.
#[derive(Debug, Default)]
pub struct MemoryDb {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobDb for MemoryDb {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.entries.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn keys(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// Directory-backed backend: one file per key, file names are the
/// hex-encoded key bytes.
#[derive(Debug)]
pub struct DirDb {
    dir: PathBuf,
}

impl DirDb {
    /// Opens (creating if necessary) a blob directory.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    fn path_for(&self, key: &[u8]) -> PathBuf {
        self.dir.join(hex::encode(key))
    }
}

impl BlobDb for DirDb {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let name = entry?.file_name();
            let Some(name) = name.to_str() else { continue };
            // Foreign files in the directory are not ours to touch.
            if let Ok(key) = hex::decode(name) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}
