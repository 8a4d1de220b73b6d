//! # rf-storage-local
//! rusty-forum/crates/rf-storage-local/src/lib.rs
//! Local filesystem implementation of `MediaStore`.
//! Avatars live under `<root>/avatars/` with generated, collision-free names.

use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::bail;
use async_trait::async_trait;
use rf_core::traits::MediaStore;
use tokio::fs;
use uuid::Uuid;

const AVATAR_DIR: &str = "avatars";

pub struct LocalMediaStore {
    /// Root directory for all uploads (e.g., "./data/uploads")
    root_path: PathBuf,
    /// Public URL prefix the root is served under (e.g., "/uploads")
    url_prefix: String,
}

impl LocalMediaStore {
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self {
            root_path: root,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root_path
    }

    /// Media ids are relative paths we generated ourselves; anything else is refused.
    fn resolve(&self, media_id: &str) -> anyhow::Result<PathBuf> {
        let Some(name) = media_id.strip_prefix("avatars/") else {
            bail!("unknown media id {media_id}");
        };
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            bail!("unknown media id {media_id}");
        }
        Ok(self.root_path.join(AVATAR_DIR).join(name))
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    /// Saves an upload as `avatars/<uuid>.<ext>`. The extension has already
    /// been validated by the caller.
    async fn save_avatar(&self, data: Vec<u8>, extension: &str) -> anyhow::Result<String> {
        let dir = self.root_path.join(AVATAR_DIR);
        fs::create_dir_all(&dir).await?;

        let file_name = format!("{}.{}", Uuid::now_v7().simple(), extension);
        fs::write(dir.join(&file_name), &data).await?;
        log::info!("stored avatar {file_name} ({} bytes)", data.len());

        Ok(format!("{AVATAR_DIR}/{file_name}"))
    }

    async fn get_url(&self, media_id: &str) -> String {
        format!("{}/{}", self.url_prefix, media_id)
    }

    async fn remove(&self, media_id: &str) -> anyhow::Result<()> {
        let path = self.resolve(media_id)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
