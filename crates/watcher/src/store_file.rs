//! Flat-file watermark store with atomic writes.

use std::path::{Path, PathBuf};

use {
    anyhow::{Context, Result},
    async_trait::async_trait,
    tokio::fs,
};

use crate::store::WatermarkStore;

/// File-backed store. The watermark is the entire content of one file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Create a store at the default per-user location
    /// (`~/.local/share/verwatch/last_version_date.txt` on Linux).
    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "verwatch")
            .context("cannot determine user data directory")?;
        Ok(Self::new(dirs.data_dir().join("last_version_date.txt")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomic write: write to temp, rename over target.
    async fn atomic_write(&self, value: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("txt.tmp");
        fs::write(&tmp, value.as_bytes()).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl WatermarkStore for FileStore {
    async fn load(&self) -> Result<Option<String>> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("read {}", self.path.display()))?;
        // Tolerate hand-edited files with trailing whitespace.
        let value = data.trim();
        if value.is_empty() {
            return Ok(None);
        }
        Ok(Some(value.to_string()))
    }

    async fn save(&self, value: &str) -> Result<()> {
        self.atomic_write(value)
            .await
            .with_context(|| format!("write {}", self.path.display()))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, tempfile::TempDir};

    fn make_store(dir: &Path) -> FileStore {
        FileStore::new(dir.join("last_version_date.txt"))
    }

    #[tokio::test]
    async fn test_save_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(tmp.path());

        store.save("08/20/2026-10:00").await.unwrap();
        assert_eq!(
            store.load().await.unwrap().as_deref(),
            Some("08/20/2026-10:00")
        );
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(tmp.path());
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_replaces_existing() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(tmp.path());

        store.save("old").await.unwrap();
        store.save("new").await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_save_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("nested/state/watermark.txt"));

        store.save("v1").await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(tmp.path());

        store.save("v1").await.unwrap();
        assert!(!tmp.path().join("last_version_date.txt.tmp").exists());
    }

    #[tokio::test]
    async fn test_load_trims_whitespace() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(tmp.path());

        std::fs::write(store.path(), "08/20/2026\n").unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some("08/20/2026"));
    }

    #[tokio::test]
    async fn test_whitespace_only_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(tmp.path());

        std::fs::write(store.path(), "  \n").unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }
}
