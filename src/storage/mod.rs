//! Upload storage. Files are addressed by name only; the database keeps the
//! name and the web layer serves the directory under `/uploads`.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid file name {0:?}")]
    InvalidName(String),

    #[error("file {0:?} not found")]
    NotFound(String),

    #[error("storage i/o error: {0}")]
    Io(#[from] io::Error),
}

#[async_trait]
pub trait FileStore: Send + Sync {
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError>;

    async fn retrieve(&self, name: &str) -> Result<Vec<u8>, StorageError>;

    /// Delete a stored file. Removing a name that was never stored succeeds.
    async fn remove(&self, name: &str) -> Result<(), StorageError>;
}

/// Stores files flat in one directory on local disk.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Create the store, creating `root` if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StorageError> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\', '\0']);
        if !valid {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(name)?;
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(file = name, size = bytes.len(), "upload stored");
        Ok(())
    }

    async fn retrieve(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StorageError::NotFound(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, name: &str) -> Result<(), StorageError> {
        let path = self.path_for(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Name for an uploaded file: `{unix_millis}-{field}{.ext}`, keeping the
/// client's extension when it is plain alphanumeric.
pub fn upload_name(field: &str, original_name: Option<&str>, unix_millis: i64) -> String {
    let ext = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    let field: String = field
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    format!("{unix_millis}-{field}{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_names_keep_safe_extensions() {
        assert_eq!(upload_name("utara", Some("7-12 extract.PDF"), 1700), "1700-utara.pdf");
        assert_eq!(upload_name("landImage", Some("photo"), 1700), "1700-landImage");
        assert_eq!(upload_name("landImage", Some("x.ph/p"), 1700), "1700-landImage");
        assert_eq!(upload_name("../utara", None, 5), "5-utara");
    }

    #[tokio::test]
    async fn files_round_trip_and_names_are_confined() {
        let dir = std::env::temp_dir().join(format!("agrosync-store-{}", uuid::Uuid::new_v4()));
        let store = LocalFileStore::open(&dir).await.unwrap();

        store.save("1-utara.pdf", b"%PDF").await.unwrap();
        assert_eq!(store.retrieve("1-utara.pdf").await.unwrap(), b"%PDF");

        assert!(matches!(store.retrieve("missing.png").await, Err(StorageError::NotFound(_))));
        assert!(matches!(store.save("../escape", b"x").await, Err(StorageError::InvalidName(_))));

        store.remove("1-utara.pdf").await.unwrap();
        assert!(matches!(store.retrieve("1-utara.pdf").await, Err(StorageError::NotFound(_))));
        store.remove("1-utara.pdf").await.unwrap();

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
