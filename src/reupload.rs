//! The reupload job: wipe the bucket, then seed it from local folders of
//! pre-made avatars.

use crate::catalog::TeamMember;
use crate::database::UserDirectory;
use crate::error::StoreError;
use crate::image::ImageFormat;
use crate::pipeline::persist;
use crate::report::{FailureReason, JobKind, RunReport, UserOutcome};
use crate::storage::{seeded_object_key, ObjectStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Extensions picked up from an avatar folder.
pub const AVATAR_EXTENSIONS: [&str; 2] = ["png", "jpg"];

/// What the bucket clear step did.
#[derive(Debug)]
pub enum ClearOutcome {
    /// Nothing to delete.
    Empty,
    /// Deleted this many objects.
    Cleared(usize),
    /// Listing or deleting failed; the run continues regardless.
    Failed(StoreError),
}

/// Deletes every object in the bucket, best-effort.
pub async fn clear_bucket(store: &dyn ObjectStore) -> ClearOutcome {
    let names = match store.list().await {
        Ok(names) => names,
        Err(e) => {
            tracing::warn!(error = %e, "could not clear bucket, continuing with upload");
            return ClearOutcome::Failed(e);
        }
    };

    if names.is_empty() {
        tracing::info!("no existing files found in bucket");
        return ClearOutcome::Empty;
    }

    tracing::info!(count = names.len(), "deleting existing files");
    for name in &names {
        tracing::info!(key = %name, "delete");
    }

    match store.remove(&names).await {
        Ok(()) => {
            tracing::info!(count = names.len(), "bucket cleared");
            ClearOutcome::Cleared(names.len())
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not clear bucket, continuing with upload");
            ClearOutcome::Failed(e)
        }
    }
}

/// `*.png` and `*.jpg` files directly inside `folder`, sorted by path.
///
/// A missing folder yields an empty list.
pub fn collect_avatar_files(folder: &Path) -> std::io::Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| AVATAR_EXTENSIONS.contains(&ext));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Uploads pre-made avatars and points each user's record at them.
pub struct Reuploader {
    store: Arc<dyn ObjectStore>,
    directory: Arc<dyn UserDirectory>,
}

impl Reuploader {
    /// Wires the job to its adapters.
    pub fn new(store: Arc<dyn ObjectStore>, directory: Arc<dyn UserDirectory>) -> Self {
        Self { store, directory }
    }

    /// Clears the bucket, then uploads `{avatars_dir}/{Name}/*` for each member.
    pub async fn run(&self, roster: &[TeamMember], avatars_dir: &Path) -> RunReport {
        clear_bucket(self.store.as_ref()).await;

        let mut report = RunReport::new(JobKind::Upload);
        for member in roster {
            tracing::info!(user = member.name, "processing user");
            let urls = self.upload_user(member.name, &avatars_dir.join(member.name)).await;

            let outcome = if urls.is_empty() {
                tracing::warn!(user = member.name, "no avatars to upload");
                UserOutcome::Failed(FailureReason::NoImagesFound)
            } else {
                persist(self.directory.as_ref(), member.name, urls).await
            };
            report.record(member.name, outcome);
        }
        report
    }

    /// Uploads every avatar file in `folder`; returns the public URLs of the
    /// ones that made it, in file order.
    pub async fn upload_user(&self, name: &str, folder: &Path) -> Vec<String> {
        let files = match collect_avatar_files(folder) {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(folder = %folder.display(), error = %e, "could not read folder");
                return Vec::new();
            }
        };
        if files.is_empty() {
            tracing::warn!(folder = %folder.display(), "folder missing or has no images");
            return Vec::new();
        }

        let mut urls = Vec::with_capacity(files.len());
        for path in files {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                tracing::warn!(
                    user = name,
                    path = %path.display(),
                    "skipping non UTF-8 file name"
                );
                continue;
            };
            match self.upload_file(name, file_name, &path).await {
                Ok(url) => {
                    tracing::info!(user = name, file = file_name, "uploaded");
                    urls.push(url);
                }
                Err(e) => {
                    tracing::warn!(user = name, file = file_name, error = %e, "upload failed");
                }
            }
        }
        urls
    }

    async fn upload_file(
        &self,
        name: &str,
        file_name: &str,
        path: &Path,
    ) -> Result<String, crate::error::AvatarError> {
        let data = tokio::fs::read(path).await?;
        let key = seeded_object_key(name, file_name);
        let content_type = ImageFormat::from_path(path).unwrap_or_default().mime_type();
        self.store.upload(&key, data, content_type).await?;
        Ok(self.store.public_url(&key))
    }
}
