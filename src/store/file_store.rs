use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt, BufReader},
};
use tracing::{debug, trace};

use super::{KeyValueStore, StorageError};

/// The main realization of [KeyValueStore]. Every key is a separate file inside `store_dir`, whose
/// content is the value as is.
pub struct FileStore {
    store_dir: PathBuf,
}

impl FileStore {
    pub fn new(store_dir: PathBuf) -> Result<Self, io::Error> {
        std::fs::create_dir_all(&store_dir)?;

        Ok(Self { store_dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::io(
                key,
                io::Error::new(ErrorKind::InvalidInput, "key can't be used as a file name"),
            ));
        }
        Ok(self.store_dir.join(key))
    }

    async fn read_inner(path: &Path) -> Result<String, io::Error> {
        debug!("Reading {path:?}");
        let file = File::open(path).await?;
        file.lock_shared()?;
        let mut reader = BufReader::new(file);
        let mut value = String::new();
        let result = reader.read_to_string(&mut value).await;
        reader.into_inner().unlock_async().await?;
        result?;
        Ok(value)
    }

    async fn write_with_file(file: &mut File, value: &str) -> Result<(), io::Error> {
        // The file is opened without truncation, so that the content is only dropped once the
        // exclusive lock is held.
        file.set_len(0).await?;
        file.seek(io::SeekFrom::Start(0)).await?;
        file.write_all(value.as_bytes()).await?;
        file.flush().await?;
        file.sync_data().await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match Self::read_inner(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        trace!("Writing {} bytes into {path:?}", value.len());

        let mut file = File::options()
            .write(true)
            .create(true)
            .read(true)
            .truncate(false)
            .open(&path)
            .await
            .map_err(|e| StorageError::io(key, e))?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive().map_err(|e| StorageError::io(key, e))?;
        let result = Self::write_with_file(&mut file, value).await;
        file.unlock_async()
            .await
            .map_err(|e| StorageError::io(key, e))?;
        result.map_err(|e| StorageError::io(key, e))
    }
}
