//! Local media: avatar selection and post image uploads

use anyhow::{Context, Result};
use aphid_shared::validation::image_extension;
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::PathBuf;
use tracing::warn;
use uuid::Uuid;

/// Picks a random avatar for new users from a directory of images
#[derive(Debug, Clone)]
pub struct ProfilePicPicker {
    dir: PathBuf,
}

impl ProfilePicPicker {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Filename of a random image in the directory.
    ///
    /// An unreadable or empty directory yields `None`; registration goes
    /// ahead without an avatar.
    pub async fn pick(&self) -> Option<String> {
        let candidates = match self.candidates().await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(dir = %self.dir.display(), "Could not list profile pictures: {:#}", e);
                return None;
            }
        };
        choose(&candidates, &mut rand::thread_rng())
    }

    async fn candidates(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("reading {}", self.dir.display()))?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if image_extension(name).is_some() {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }
}

fn choose<R: Rng + ?Sized>(candidates: &[String], rng: &mut R) -> Option<String> {
    candidates.choose(rng).cloned()
}

/// Stores uploaded post images under generated names
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `bytes` as a new file with extension `ext`, returning its name.
    ///
    /// The client's filename is never used on disk.
    pub async fn save(&self, ext: &str, bytes: &[u8]) -> Result<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating {}", self.dir.display()))?;

        let name = format!("{}.{}", Uuid::new_v4(), ext);
        let path = self.dir.join(&name);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(name)
    }

    /// Best-effort removal, used when the post insert fails after upload
    pub async fn remove(&self, name: &str) {
        if let Err(e) = tokio::fs::remove_file(self.dir.join(name)).await {
            warn!(file = name, "Could not remove orphaned upload: {}", e);
        }
    }
}
