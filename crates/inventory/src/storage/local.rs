use crate::abstract_trait::storage::FileStorageTrait;
use async_trait::async_trait;
use shared::{errors::ServiceError, utils::DecodedFile};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{error, info};
use uuid::Uuid;

/// Stores uploads below a media root on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// `name.ext` becomes `name_<suffix>.ext`.
fn with_suffix(file_name: &str, suffix: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{suffix}.{ext}"),
        _ => format!("{file_name}_{suffix}"),
    }
}

fn storage_error(path: &Path, err: std::io::Error) -> ServiceError {
    error!("❌ File operation on {} failed: {err}", path.display());
    ServiceError::Internal("file storage failed".into())
}

#[async_trait]
impl FileStorageTrait for LocalFileStorage {
    async fn save(&self, prefix: &str, file: &DecodedFile) -> Result<String, ServiceError> {
        let dir = self.root.join(prefix);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| storage_error(&dir, e))?;

        let mut name = file.file_name.clone();
        loop {
            let target = dir.join(&name);

            // create_new refuses to clobber an existing file, even under a race.
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&target)
                .await
            {
                Ok(mut handle) => {
                    handle
                        .write_all(&file.bytes)
                        .await
                        .map_err(|e| storage_error(&target, e))?;
                    handle
                        .flush()
                        .await
                        .map_err(|e| storage_error(&target, e))?;

                    let relative = format!("{prefix}/{name}");
                    info!("📁 Stored upload at {relative} ({} bytes)", file.bytes.len());
                    return Ok(relative);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    let suffix = Uuid::new_v4().simple().to_string();
                    name = with_suffix(&file.file_name, &suffix[..7]);
                }
                Err(e) => return Err(storage_error(&target, e)),
            }
        }
    }

    async fn remove(&self, path: &str) -> Result<(), ServiceError> {
        let target = self.root.join(path);
        match fs::remove_file(&target).await {
            Ok(()) => {
                info!("🗑️ Removed upload {path}");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(&target, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> DecodedFile {
        DecodedFile {
            file_name: name.into(),
            content_type: "text/plain".into(),
            bytes: b"cocoa".to_vec(),
        }
    }

    #[test]
    fn suffix_goes_before_extension() {
        assert_eq!(with_suffix("spec.pdf", "ab12cd3"), "spec_ab12cd3.pdf");
        assert_eq!(with_suffix("README", "ab12cd3"), "README_ab12cd3");
    }

    #[tokio::test]
    async fn never_overwrites_existing_files() {
        let root = std::env::temp_dir().join(format!("inventory-media-{}", Uuid::new_v4()));
        let storage = LocalFileStorage::new(&root);

        let first = storage.save("user_main", &file("coa.txt")).await.unwrap();
        let second = storage.save("user_main", &file("coa.txt")).await.unwrap();

        assert_eq!(first, "user_main/coa.txt");
        assert_ne!(first, second);
        assert!(second.starts_with("user_main/coa_"));
        assert!(root.join(&second).exists());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn removes_saved_files_and_tolerates_missing_ones() {
        let root = std::env::temp_dir().join(format!("inventory-media-{}", Uuid::new_v4()));
        let storage = LocalFileStorage::new(&root);

        let saved = storage.save("categories", &file("shea.png")).await.unwrap();
        storage.remove(&saved).await.unwrap();

        assert!(!root.join(&saved).exists());
        storage.remove(&saved).await.unwrap();

        let _ = std::fs::remove_dir_all(&root);
    }
}
