//! On-disk upload storage
//!
//! Files live under `<root>/uploads/{photos,videos}/<uuid>.<ext>` and are
//! referenced as `{photos,videos}/<uuid>.<ext>`.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use bmj_common::config::UploadConfig;
use bmj_common::{CascadeReport, Error, MediaKind, MediaRef, Result};

#[derive(Debug, Clone)]
pub struct FileStore {
    uploads_dir: PathBuf,
    rules: UploadConfig,
}

impl FileStore {
    /// Store rooted at `<root>/uploads`
    pub fn new(root: &Path, rules: UploadConfig) -> Self {
        Self {
            uploads_dir: root.join("uploads"),
            rules,
        }
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    /// Create the photo and video directories
    pub async fn init(&self) -> Result<()> {
        for kind in [MediaKind::Photo, MediaKind::Video] {
            tokio::fs::create_dir_all(self.uploads_dir.join(kind.dir())).await?;
        }
        info!(path = %self.uploads_dir.display(), "Upload storage ready");
        Ok(())
    }

    /// Check an uploaded file name before anything is written
    pub fn check_name(&self, original_name: &str) -> Result<String> {
        if original_name.contains("..") {
            return Err(Error::validation(
                "file",
                format!("Invalid path sequence in file name: {}", original_name),
            ));
        }
        if !self.rules.accepts(original_name) {
            return Err(Error::validation(
                "file",
                format!("File type not allowed: {}", original_name),
            ));
        }
        MediaRef::new(original_name)
            .extension()
            .ok_or_else(|| Error::validation("file", "File has no extension"))
    }

    /// Write `bytes` under a fresh name, returning its reference
    pub async fn save(&self, kind: MediaKind, original_name: &str, bytes: &[u8]) -> Result<MediaRef> {
        let ext = self.check_name(original_name)?;
        let file_name = format!("{}.{}", Uuid::new_v4(), ext);

        let dir = self.uploads_dir.join(kind.dir());
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&file_name), bytes).await?;

        debug!(original = original_name, stored = %file_name, size = bytes.len(), "Stored upload");
        Ok(MediaRef::new(format!("{}/{}", kind.dir(), file_name)))
    }

    /// Disk path of a stored reference, by basename only
    pub fn path_of(&self, kind: MediaKind, media: &MediaRef) -> PathBuf {
        self.uploads_dir.join(kind.dir()).join(media.basename())
    }

    /// Remove a stored file; failures are logged, never raised
    pub async fn delete(&self, kind: MediaKind, media: &MediaRef) {
        if media.basename().contains("..") || media.basename().is_empty() {
            warn!(media = %media, "Refusing to delete suspicious path");
            return;
        }
        let path = self.path_of(kind, media);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!(path = %path.display(), "Deleted upload"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to delete upload"),
        }
    }

    pub async fn delete_all(&self, kind: MediaKind, media: &[MediaRef]) {
        for item in media {
            self.delete(kind, item).await;
        }
    }

    /// Remove every file dropped by a cascade delete
    pub async fn delete_report(&self, report: &CascadeReport) {
        self.delete_all(MediaKind::Photo, &report.photos).await;
        self.delete_all(MediaKind::Video, &report.videos).await;
    }
}
