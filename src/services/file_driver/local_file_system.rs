use super::{FileDriver, OpenedFile, StoredFileInfo, WriteError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocket::fs::TempFile;
use std::{
    fs::Metadata,
    path::{Path, PathBuf},
};
use tokio::fs::File;

/// Stores every file flat inside a single root directory.
pub struct LocalFileSystem {
    root_path: PathBuf,
    should_copy_files: bool,
}

impl LocalFileSystem {
    /// Ensures both the root directory and the temporary directory exist.
    /// Missing parent directories are created as well.
    pub async fn new(
        temp_path: impl Into<PathBuf>,
        root_path: impl Into<PathBuf>,
    ) -> Result<Self, std::io::Error> {
        fn get_device_id(meta: &Metadata) -> Option<u64> {
            #[cfg(unix)]
            {
                use std::os::unix::fs::MetadataExt;
                Some(meta.dev())
            }
            // stable std exposes no volume id on other platforms
            #[cfg(not(unix))]
            {
                let _ = meta;
                None
            }
        }

        let temp_path = temp_path.into();
        let root_path = root_path.into();

        for path in [&temp_path, &root_path] {
            let exists = match tokio::fs::try_exists(path).await {
                Ok(exists) => exists,
                Err(err) => {
                    log::error!(target: "file_driver", method = "new", path:?, err:err; "Failed to check if path exists.");
                    return Err(err);
                }
            };

            if !exists {
                if let Err(err) = tokio::fs::create_dir_all(path).await {
                    log::error!(target: "file_driver", method = "new", path:?, err:err; "Failed to create directory.");
                    return Err(err);
                }

                log::info!(target: "file_driver", method = "new", path:?; "Directory has been created.");
            }
        }

        let temp_path_meta = tokio::fs::metadata(&temp_path).await;
        let temp_path_meta = match temp_path_meta {
            Ok(meta) => meta,
            Err(err) => {
                log::error!(target: "file_driver", method = "new", temp_path:?, err:err; "Failed to get metadata of temp path.");
                return Err(err);
            }
        };

        let root_path_meta = tokio::fs::metadata(&root_path).await;
        let root_path_meta = match root_path_meta {
            Ok(meta) => meta,
            Err(err) => {
                log::error!(target: "file_driver", method = "new", root_path:?, err:err; "Failed to get metadata of root path.");
                return Err(err);
            }
        };

        if !root_path_meta.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("`{}` is not a directory", root_path.display()),
            ));
        }

        // Renaming only works within a single device.
        let should_copy_files = match (
            get_device_id(&temp_path_meta),
            get_device_id(&root_path_meta),
        ) {
            (Some(temp_device_id), Some(root_device_id)) => temp_device_id != root_device_id,
            _ => true,
        };

        Ok(Self {
            root_path,
            should_copy_files,
        })
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Maps a file name to its path inside the root.
    /// Returns `None` for names that would resolve outside of the root.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if !is_flat_file_name(name) {
            return None;
        }

        Some(self.root_path.join(name))
    }
}

/// A name is accepted only if it is a single, normal path segment.
fn is_flat_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name
            .chars()
            .any(|c| c == '/' || c == '\\' || c == '\0' || c.is_control())
}

fn created_at(meta: &Metadata) -> Result<DateTime<Utc>, std::io::Error> {
    // Not every filesystem records a birth time.
    let time = meta.created().or_else(|_| meta.modified())?;
    Ok(DateTime::<Utc>::from(time))
}

#[async_trait]
impl FileDriver for LocalFileSystem {
    async fn exists(&self, name: &str) -> Result<bool, std::io::Error> {
        let path = match self.resolve(name) {
            Some(path) => path,
            None => return Ok(false),
        };

        match tokio::fs::try_exists(&path).await {
            Ok(exists) => Ok(exists),
            Err(err) => {
                log::error!(target: "file_driver", method = "exists", name, path:?, err:err; "Failed to check if file exists.");
                Err(err)
            }
        }
    }

    async fn commit(&self, name: &str, temp_file: &mut TempFile<'_>) -> Result<(), WriteError> {
        let path = self.resolve(name).ok_or_else(|| WriteError::InvalidName {
            name: name.to_owned(),
        })?;

        if self.exists(name).await? {
            return Err(WriteError::AlreadyExists {
                name: name.to_owned(),
            });
        }

        let result = if self.should_copy_files {
            temp_file.copy_to(&path).await
        } else {
            temp_file.move_copy_to(&path).await
        };

        if let Err(err) = result {
            log::error!(target: "file_driver", method = "commit", name, path:?, should_copy_files = self.should_copy_files, err:err; "Failed to persist file.");
            return Err(err.into());
        }

        Ok(())
    }

    async fn read(&self, name: &str) -> Result<Option<OpenedFile>, std::io::Error> {
        let path = match self.resolve(name) {
            Some(path) => path,
            None => return Ok(None),
        };

        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                log::error!(target: "file_driver", method = "read", name, path:?, err:err; "Failed to open file.");
                return Err(err);
            }
        };

        let meta = match file.metadata().await {
            Ok(meta) => meta,
            Err(err) => {
                log::error!(target: "file_driver", method = "read", name, path:?, err:err; "Failed to get file metadata.");
                return Err(err);
            }
        };

        if !meta.is_file() {
            return Ok(None);
        }

        Ok(Some(OpenedFile {
            path,
            size: meta.len(),
            file,
        }))
    }

    async fn list(&self) -> Result<Vec<StoredFileInfo>, std::io::Error> {
        let root_path = &self.root_path;

        let mut entries = match tokio::fs::read_dir(root_path).await {
            Ok(entries) => entries,
            Err(err) => {
                log::error!(target: "file_driver", method = "list", root_path:?, err:err; "Failed to read root directory.");
                return Err(err);
            }
        };

        let mut files = Vec::new();

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) => {
                    log::error!(target: "file_driver", method = "list", root_path:?, err:err; "Failed to read directory entry.");
                    return Err(err);
                }
            };

            let meta = match entry.metadata().await {
                Ok(meta) => meta,
                // removed while enumerating
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => {
                    let path = entry.path();
                    log::error!(target: "file_driver", method = "list", path:?, err:err; "Failed to get file metadata.");
                    return Err(err);
                }
            };

            if !meta.is_file() {
                continue;
            }

            files.push(StoredFileInfo {
                filename: entry.file_name().to_string_lossy().into_owned(),
                size: meta.len(),
                created_at: created_at(&meta)?,
            });
        }

        Ok(files)
    }

    async fn remove(&self, name: &str) -> Result<bool, std::io::Error> {
        let path = match self.resolve(name) {
            Some(path) => path,
            None => return Ok(false),
        };

        // only regular files and symlinks are stored entries
        match tokio::fs::symlink_metadata(&path).await {
            Ok(meta) if meta.is_dir() => return Ok(false),
            Ok(_) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(err) => {
                log::error!(target: "file_driver", method = "remove", name, path:?, err:err; "Failed to read file metadata.");
                return Err(err);
            }
        }

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => {
                log::error!(target: "file_driver", method = "remove", name, path:?, err:err; "Failed to remove file.");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::create_test_directory;
    use tokio::io::AsyncReadExt;

    #[rocket::async_test]
    async fn test_new_creates_missing_directories() {
        let (base_path, _directory_dropper) = create_test_directory();
        let root_path = base_path.join("nested").join("files");
        let temp_path = base_path.join("temp");

        let driver = LocalFileSystem::new(&temp_path, &root_path).await.unwrap();

        assert!(root_path.is_dir());
        assert!(temp_path.is_dir());
        assert_eq!(driver.root_path(), root_path);

        // idempotent
        LocalFileSystem::new(&temp_path, &root_path).await.unwrap();
    }

    #[rocket::async_test]
    async fn test_resolve_rejects_names_outside_root() {
        let (base_path, _directory_dropper) = create_test_directory();
        let driver = LocalFileSystem::new(base_path.join("temp"), base_path.join("files"))
            .await
            .unwrap();

        for name in ["", ".", "..", "../secret", "a/b", "a\\b", "a\0b", "/etc/passwd"] {
            assert_eq!(driver.resolve(name), None, "{:?} should be rejected", name);
        }

        assert_eq!(
            driver.resolve("report-1-2.pdf"),
            Some(base_path.join("files").join("report-1-2.pdf"))
        );
        assert!(driver.resolve("..hidden").is_some());
    }

    #[rocket::async_test]
    async fn test_read_list_and_remove() {
        let (base_path, _directory_dropper) = create_test_directory();
        let root_path = base_path.join("files");
        let driver = LocalFileSystem::new(base_path.join("temp"), &root_path)
            .await
            .unwrap();

        std::fs::write(root_path.join("a.txt"), b"alpha").unwrap();
        std::fs::create_dir(root_path.join("nested")).unwrap();
        std::fs::write(base_path.join("secret.txt"), b"secret").unwrap();

        let mut opened = driver.read("a.txt").await.unwrap().unwrap();
        let mut content = Vec::new();
        opened.file.read_to_end(&mut content).await.unwrap();

        assert_eq!(opened.size, 5);
        assert_eq!(content, b"alpha");
        assert!(driver.read("missing.txt").await.unwrap().is_none());
        assert!(driver.read("nested").await.unwrap().is_none());
        assert!(driver.read("../secret.txt").await.unwrap().is_none());

        let files = driver.list().await.unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].filename, "a.txt");
        assert_eq!(files[0].size, 5);

        assert!(driver.exists("a.txt").await.unwrap());
        assert!(driver.remove("a.txt").await.unwrap());
        assert!(!driver.remove("a.txt").await.unwrap());
        assert!(!driver.remove("../secret.txt").await.unwrap());
        assert!(!driver.remove("nested").await.unwrap());
        assert!(root_path.join("nested").is_dir());
        assert!(!driver.exists("a.txt").await.unwrap());
        assert!(base_path.join("secret.txt").exists());
        assert!(driver.list().await.unwrap().is_empty());
    }
}
