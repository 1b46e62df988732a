//! Filesystem-backed object store

use super::BlobStore;
use crate::error::{Error, Result};
use async_trait::async_trait;
use rand::Rng;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Stores objects as files under `root/<container>/<key>`
///
/// The body is written to a hidden temporary file in the destination
/// directory and renamed into place, so readers never observe a partially
/// written object and a failed write leaves nothing behind.
#[derive(Clone, Debug)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Store rooted at `root`; directories are created on first write
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path an object would be written to
    ///
    /// Keys may contain `/` to form sub-directories. Absolute keys and
    /// `..` segments are rejected so objects cannot escape the container.
    pub fn object_path(&self, container: &str, key: &str) -> Result<PathBuf> {
        let mut path = self.root.clone();
        for part in [container, key] {
            let relative = Path::new(part);
            let escapes = relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            if part.is_empty() || escapes {
                return Err(Error::StorageWrite {
                    key: key.to_string(),
                    reason: format!("'{part}' is not a valid relative object path"),
                });
            }
            path.push(relative);
        }
        Ok(path)
    }
}

/// Hidden sibling of `dest`, unique per write
fn temp_path(dest: &Path) -> PathBuf {
    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let nonce: u32 = rand::thread_rng().gen_range(0..=u32::MAX);
    dest.with_file_name(format!(
        ".{file_name}.{}.{nonce:08x}.tmp",
        std::process::id()
    ))
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, container: &str, key: &str, body: Vec<u8>) -> Result<()> {
        let dest = self.object_path(container, key)?;
        let write_failed = |e: std::io::Error| Error::StorageWrite {
            key: key.to_string(),
            reason: format!("{}: {e}", dest.display()),
        };

        let parent = dest.parent().unwrap_or(&self.root).to_path_buf();
        tokio::fs::create_dir_all(&parent)
            .await
            .map_err(write_failed)?;

        let tmp = temp_path(&dest);

        let written = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(&body).await?;
            file.sync_all().await?;
            tokio::fs::rename(&tmp, &dest).await
        }
        .await;

        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(write_failed(e));
        }

        debug!(path = %dest.display(), bytes = body.len(), "object written");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
