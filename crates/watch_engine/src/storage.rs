use std::fs;
use std::io;
use std::path::PathBuf;

use watch_core::{BlobStore, StoreError};
use watch_logging::watch_debug;

use crate::persist::{is_plain_file_name, AtomicFileWriter};

/// Blob store keeping one file per key inside a data directory.
///
/// The directory is created on the first save.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    writer: AtomicFileWriter,
}

impl FsBlobStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if !is_plain_file_name(key) {
            return Err(StoreError::storage(key, "key is not a plain file name"));
        }
        Ok(self.writer.dir().join(key))
    }
}

impl BlobStore for FsBlobStore {
    fn load(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.to_string()))
            }
            Err(err) => Err(StoreError::storage(key, err.to_string())),
        }
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self
            .writer
            .write(key, bytes)
            .map_err(|err| StoreError::storage(key, err.to_string()))?;
        watch_debug!("Saved {} bytes to {:?}", bytes.len(), path);
        Ok(())
    }
}
