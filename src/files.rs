//! Per-user file storage.
//!
//! Each user owns one folder. Files are never overwritten; uploads get a
//! timestamp prefix so repeated uploads of the same file coexist.

use crate::notification::Notification;
use crate::{log_debug, log_error};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use url::Url;

/// One entry in a user's folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,
    pub size: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredFile {
    /// Size in whole kilobytes, rounded half up
    pub fn size_kb(&self) -> u64 {
        (self.size + 512) / 1024
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("Invalid file name '{0}'")]
    InvalidName(String),
    #[error("File '{0}' not found")]
    NotFound(String),
    #[error("File '{0}' already exists")]
    AlreadyExists(String),
    #[error("Cannot build a link for '{0}'")]
    Link(String),
    #[error("File storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Object-store operations the files surface relies on
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn upload(
        &self,
        user_id: &str,
        name: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, FileError>;
    async fn download(&self, user_id: &str, name: &str) -> Result<Vec<u8>, FileError>;
    /// Files in the user's folder, sorted by name
    async fn list(&self, user_id: &str) -> Result<Vec<StoredFile>, FileError>;
    async fn delete(&self, user_id: &str, name: &str) -> Result<(), FileError>;
    /// Link to the file; does not check that it exists
    fn public_url(&self, user_id: &str, name: &str) -> Result<Url, FileError>;
}

/// A single path segment: not empty, no separators, not `.` or `..`
fn check_segment(name: &str) -> Result<&str, FileError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        Err(FileError::InvalidName(name.to_string()))
    } else {
        Ok(name)
    }
}

/// Store rooted at a local directory, one subdirectory per user
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn folder(&self, user_id: &str) -> Result<PathBuf, FileError> {
        Ok(self.root.join(check_segment(user_id)?))
    }

    fn file_path(&self, user_id: &str, name: &str) -> Result<PathBuf, FileError> {
        Ok(self.folder(user_id)?.join(check_segment(name)?))
    }
}

fn missing_as_not_found(name: &str) -> impl FnOnce(std::io::Error) -> FileError + '_ {
    move |e| {
        if e.kind() == ErrorKind::NotFound {
            FileError::NotFound(name.to_string())
        } else {
            FileError::Io(e)
        }
    }
}

fn stored_file(name: String, metadata: &std::fs::Metadata) -> StoredFile {
    StoredFile {
        name,
        size: metadata.len(),
        updated_at: metadata.modified().ok().map(DateTime::<Utc>::from),
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn upload(
        &self,
        user_id: &str,
        name: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, FileError> {
        let path = self.file_path(user_id, name)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                if e.kind() == ErrorKind::AlreadyExists {
                    FileError::AlreadyExists(name.to_string())
                } else {
                    FileError::Io(e)
                }
            })?;
        file.write_all(bytes).await?;
        file.flush().await?;
        let metadata = file.metadata().await?;
        log_debug!("Stored {} ({} bytes)", path.display(), bytes.len());
        Ok(stored_file(name.to_string(), &metadata))
    }

    async fn download(&self, user_id: &str, name: &str) -> Result<Vec<u8>, FileError> {
        let path = self.file_path(user_id, name)?;
        tokio::fs::read(&path).await.map_err(missing_as_not_found(name))
    }

    async fn list(&self, user_id: &str) -> Result<Vec<StoredFile>, FileError> {
        let folder = self.folder(user_id)?;
        let mut entries = match tokio::fs::read_dir(&folder).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            files.push(stored_file(name, &metadata));
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    async fn delete(&self, user_id: &str, name: &str) -> Result<(), FileError> {
        let path = self.file_path(user_id, name)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(missing_as_not_found(name))
    }

    fn public_url(&self, user_id: &str, name: &str) -> Result<Url, FileError> {
        let path = std::path::absolute(self.file_path(user_id, name)?)?;
        Url::from_file_path(&path).map_err(|()| FileError::Link(name.to_string()))
    }
}

/// Name an upload is stored under: `<unix millis>_<original name>`
pub fn upload_name(original: &str, now: DateTime<Utc>) -> String {
    format!("{}_{}", now.timestamp_millis(), original)
}

/// Files surface for one signed-in user
pub struct FilesService<S> {
    store: S,
    user_id: String,
}

impl<S: FileStore> FilesService<S> {
    pub fn new(store: S, user_id: impl Into<String>) -> Self {
        Self {
            store,
            user_id: user_id.into(),
        }
    }

    pub async fn list(&self) -> Result<Vec<StoredFile>, FileError> {
        self.store
            .list(&self.user_id)
            .await
            .inspect_err(|e| log_error!("Error loading files: {}", e))
    }

    /// Upload the file at `source` under a timestamped name
    pub async fn upload(&self, source: &Path) -> Result<StoredFile, FileError> {
        self.upload_from(source)
            .await
            .inspect_err(|e| log_error!("Error uploading file: {}", e))
    }

    async fn upload_from(&self, source: &Path) -> Result<StoredFile, FileError> {
        let original = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| FileError::InvalidName(source.display().to_string()))?;
        let bytes = tokio::fs::read(source)
            .await
            .map_err(missing_as_not_found(&original))?;
        let name = upload_name(&original, Utc::now());
        self.store.upload(&self.user_id, &name, &bytes).await
    }

    /// Copy a stored file to `dest`, returning the byte count
    pub async fn download(&self, name: &str, dest: &Path) -> Result<u64, FileError> {
        self.download_to(name, dest)
            .await
            .inspect_err(|e| log_error!("Error downloading file: {}", e))
    }

    async fn download_to(&self, name: &str, dest: &Path) -> Result<u64, FileError> {
        let bytes = self.store.download(&self.user_id, name).await?;
        tokio::fs::write(dest, &bytes).await?;
        Ok(u64::try_from(bytes.len()).unwrap_or(u64::MAX))
    }

    pub async fn delete(&self, name: &str) -> Result<(), FileError> {
        self.store
            .delete(&self.user_id, name)
            .await
            .inspect_err(|e| log_error!("Error deleting file: {}", e))
    }

    pub fn public_url(&self, name: &str) -> Result<Url, FileError> {
        self.store.public_url(&self.user_id, name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Load,
    Upload,
    Download,
    Delete,
    Link,
}

impl FileAction {
    const fn error_title(self) -> &'static str {
        match self {
            Self::Load => "Error loading files",
            Self::Upload => "Error uploading file",
            Self::Download => "Error downloading file",
            Self::Delete => "Error deleting file",
            Self::Link => "Error opening file link",
        }
    }
}

/// Notification for the outcome of a files operation
pub fn notification<T>(action: FileAction, result: &Result<T, FileError>) -> Notification {
    match (action, result) {
        (FileAction::Upload, Ok(_)) => {
            Notification::info("File uploaded", "Your file has been uploaded successfully")
        }
        (FileAction::Delete, Ok(_)) => {
            Notification::info("File deleted", "Your file has been deleted successfully")
        }
        (FileAction::Download, Ok(_)) => {
            Notification::info("File downloaded", "Your file has been saved")
        }
        (FileAction::Load | FileAction::Link, Ok(_)) => Notification::info("Files loaded", ""),
        (action, Err(e)) => Notification::error(action.error_title(), e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_rules() {
        assert!(check_segment("report.pdf").is_ok());
        assert!(check_segment("1700000000000_notes v2.txt").is_ok());
        for bad in ["", ".", "..", "a/b", "..\\up", "nul\0"] {
            assert!(
                matches!(check_segment(bad), Err(FileError::InvalidName(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_size_kb_rounds_half_up() {
        let file = |size| StoredFile {
            name: "f".into(),
            size,
            updated_at: None,
        };
        assert_eq!(file(0).size_kb(), 0);
        assert_eq!(file(511).size_kb(), 0);
        assert_eq!(file(512).size_kb(), 1);
        assert_eq!(file(2048).size_kb(), 2);
    }

    #[test]
    fn test_upload_name_prefixes_millis() {
        let now = DateTime::from_timestamp_millis(1_700_000_000_123).expect("valid timestamp");
        assert_eq!(upload_name("a.txt", now), "1700000000123_a.txt");
    }

    #[test]
    fn test_notifications() {
        let ok: Result<(), FileError> = Ok(());
        assert_eq!(notification(FileAction::Upload, &ok).title, "File uploaded");
        assert_eq!(notification(FileAction::Delete, &ok).title, "File deleted");

        let gone: Result<(), FileError> = Err(FileError::NotFound("x".into()));
        let n = notification(FileAction::Delete, &gone);
        assert_eq!(n.title, "Error deleting file");
        assert!(n.is_error());
        assert_eq!(
            notification(FileAction::Load, &gone).title,
            "Error loading files"
        );
    }
}
