//! Transient on-disk staging for uploaded files.
//!
//! Every file attached to a media request is written under the staging
//! directory with a generated name and must be gone by the time the request
//! completes. [`StagedFile`] is the guard that enforces this: callers are
//! expected to [`StagedFile::release`] it, and dropping an unreleased guard
//! (early return, panic, cancelled request) removes the file synchronously.

use service_core::error::AppError;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    /// Create the staging directory if needed.
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        let dir = fs::canonicalize(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create an empty staged file that upload chunks can be written into.
    pub async fn acquire(&self, mime_type: impl Into<String>) -> Result<StagedFile, AppError> {
        let path = self.dir.join(Uuid::new_v4().simple().to_string());
        let writer = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                tracing::error!(path = %path.display(), "Failed to create staged file: {}", e);
                e
            })?;

        Ok(StagedFile {
            path,
            mime_type: mime_type.into(),
            len: 0,
            writer: Some(writer),
            released: false,
        })
    }
}

#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    mime_type: String,
    len: u64,
    writer: Option<File>,
    released: bool,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// MIME type the upload layer reported for this file.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), AppError> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!("Staged file is already sealed"))
        })?;
        writer.write_all(chunk).await?;
        self.len += chunk.len() as u64;
        Ok(())
    }

    /// Flush and close the writer. Further writes are rejected.
    pub async fn seal(&mut self) -> Result<(), AppError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().await?;
        }
        Ok(())
    }

    /// Read the whole file into memory.
    pub async fn read(&self) -> Result<Vec<u8>, AppError> {
        Ok(fs::read(&self.path).await?)
    }

    /// Delete the file. A file that is already gone counts as released.
    pub async fn release(mut self) -> io::Result<()> {
        self.writer.take();
        self.released = true;
        match fs::remove_file(&self.path).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.writer.take();
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %self.path.display(),
                    "Failed to remove unreleased staged file: {}",
                    e
                );
            }
            _ => {
                tracing::debug!(path = %self.path.display(), "Removed unreleased staged file");
            }
        }
    }
}
