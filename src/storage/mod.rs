//! Filesystem operations over the storage root.
//!
//! Every client path goes through [`StorageRoot`] before it touches the disk.
//! Copy, move and remove requests fan out through [`batch`] and report with
//! all-or-nothing semantics.

pub mod batch;
pub mod types;

use crate::error::AppError;
use crate::utils::path::StorageRoot;
use batch::BatchItem;
use futures::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use types::{DirectoryEntry, ItemResult};

pub struct OpenedFile {
    pub file: fs::File,
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct Storage {
    root: StorageRoot,
    batch_concurrency: usize,
}

impl Storage {
    pub fn new(root: StorageRoot, batch_concurrency: usize) -> Self {
        Self {
            root,
            batch_concurrency: batch_concurrency.max(1),
        }
    }

    pub fn root(&self) -> &StorageRoot {
        &self.root
    }

    /// Immediate children of `dir`. Children that cannot be stat'ed are left out.
    pub async fn list(&self, dir: &str) -> Result<Vec<DirectoryEntry>, AppError> {
        const MSG: &str = "Cannot read that folder";
        let path = self.root.resolve(dir)?;

        let mut entries = fs::read_dir(&path)
            .await
            .map_err(|e| AppError::io(MSG, e))?;
        let mut items = Vec::new();

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::io(MSG, e))?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            let entry_path = entry.path();
            match fs::metadata(&entry_path).await {
                Ok(metadata) => {
                    items.push(DirectoryEntry::from_metadata(name, &entry_path, &metadata))
                }
                Err(e) => {
                    tracing::debug!(path = %entry_path.display(), error = %e, "skipping unreadable entry")
                }
            }
        }

        Ok(items)
    }

    pub async fn create_dir(&self, parent: &str, name: &str) -> Result<(), AppError> {
        let target = self.root.resolve_child(parent, name)?;

        let exists = fs::try_exists(&target)
            .await
            .map_err(|e| AppError::io("Unknown error creating folder", e))?;
        if exists {
            return Err(AppError::AlreadyExists(
                "The folder already exists".to_string(),
            ));
        }

        fs::create_dir(&target)
            .await
            .map_err(|e| AppError::io("Unknown error creating folder", e))?;

        tracing::info!(path = %target.display(), "created directory");
        Ok(())
    }

    pub async fn open_file(&self, path: &str) -> Result<OpenedFile, AppError> {
        let path = self.root.resolve(path)?;

        let metadata = match fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::NotFound("File not found".to_string()))
            }
            Err(e) => return Err(AppError::io("Cannot read that file", e)),
        };
        if metadata.is_dir() {
            return Err(AppError::BadRequest(
                "Path is a directory, not a file".to_string(),
            ));
        }

        let file = fs::File::open(&path)
            .await
            .map_err(|e| AppError::io("Cannot read that file", e))?;

        Ok(OpenedFile {
            file,
            path,
            size: metadata.len(),
        })
    }

    pub async fn copy_items(
        &self,
        dir: &str,
        filenames: &[String],
        destination: &str,
    ) -> Result<Vec<ItemResult>, AppError> {
        let items = self.plan(dir, filenames, Some(destination))?;
        let results = batch::run(items, self.batch_concurrency, copy_one).await;
        let results = batch::settle(results, "An error occurred copying files")?;
        tracing::info!(count = results.len(), "copied items");
        Ok(results)
    }

    pub async fn move_items(
        &self,
        dir: &str,
        filenames: &[String],
        destination: &str,
    ) -> Result<Vec<ItemResult>, AppError> {
        let items = self.plan(dir, filenames, Some(destination))?;
        let results = batch::run(items, self.batch_concurrency, move_one).await;
        let results = batch::settle(results, "An error occurred moving files")?;
        tracing::info!(count = results.len(), "moved items");
        Ok(results)
    }

    pub async fn remove_items(
        &self,
        dir: &str,
        filenames: &[String],
    ) -> Result<Vec<ItemResult>, AppError> {
        let items = self.plan(dir, filenames, None)?;
        let results = batch::run(items, self.batch_concurrency, remove_one).await;
        let results = batch::settle(results, "An error occurred deleting files")?;
        tracing::info!(count = results.len(), "removed items");
        Ok(results)
    }

    /// Renames a single path. The storage root itself can be neither source nor target.
    pub async fn move_item(&self, path: &str, destination: &str) -> Result<ItemResult, AppError> {
        let source = self.root.resolve(path)?;
        let target = self.root.resolve(destination)?;
        if source == self.root.path() || target == self.root.path() {
            return Err(AppError::BadRequest(
                "The storage root cannot be moved or replaced".to_string(),
            ));
        }

        let item = BatchItem {
            filename: file_name_of(&source),
            source,
            destination: Some(target),
        };
        let result = move_one(item).await;
        if !result.success {
            return Err(AppError::ItemFailure {
                message: "An error occurred renaming file".to_string(),
                failure: Box::new(result),
            });
        }

        tracing::info!(from = %result.old_path, to = ?result.new_path, "renamed item");
        Ok(result)
    }

    /// Writes an uploaded stream straight under the storage root, keeping only
    /// the final component of the client-supplied name. Existing files are
    /// overwritten.
    pub async fn save_upload<S, B, E>(&self, original_name: &str, chunks: S) -> Result<u64, AppError>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: std::fmt::Display,
    {
        let filename = Path::new(original_name)
            .file_name()
            .ok_or_else(|| AppError::BadRequest(format!("Invalid file name: {}", original_name)))?;
        let target = self.root.path().join(filename);

        let mut file = fs::File::create(&target)
            .await
            .map_err(|e| AppError::io("Cannot store uploaded file", e))?;

        let mut size = 0u64;
        let mut chunks = std::pin::pin!(chunks);
        while let Some(chunk) = chunks.next().await {
            let written = match chunk {
                Ok(data) => {
                    let data = data.as_ref();
                    size += data.len() as u64;
                    file.write_all(data)
                        .await
                        .map_err(|e| AppError::io("Cannot store uploaded file", e))
                }
                Err(e) => Err(AppError::BadRequest(format!("Upload interrupted: {}", e))),
            };
            if let Err(e) = written {
                drop(file);
                fs::remove_file(&target).await.ok();
                return Err(e);
            }
        }
        file.flush()
            .await
            .map_err(|e| AppError::io("Cannot store uploaded file", e))?;

        tracing::info!(path = %target.display(), size, "stored upload");
        Ok(size)
    }

    /// Resolves every item up front so an invalid or escaping name rejects
    /// the whole batch before anything runs.
    fn plan(
        &self,
        dir: &str,
        filenames: &[String],
        destination: Option<&str>,
    ) -> Result<Vec<BatchItem>, AppError> {
        filenames
            .iter()
            .map(|name| -> Result<BatchItem, AppError> {
                Ok(BatchItem {
                    filename: name.clone(),
                    source: self.root.resolve_item(dir, name)?,
                    destination: destination
                        .map(|dest| self.root.resolve_item(dest, name))
                        .transpose()?,
                })
            })
            .collect()
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn missing_destination() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, "missing destination")
}

async fn copy_one(item: BatchItem) -> ItemResult {
    let outcome = match item.destination.as_deref() {
        Some(dest) => fs::copy(&item.source, dest).await.map(|_| ()),
        None => Err(missing_destination()),
    };
    item.settle(outcome)
}

async fn move_one(item: BatchItem) -> ItemResult {
    let outcome = match item.destination.as_deref() {
        Some(dest) => fs::rename(&item.source, dest).await,
        None => Err(missing_destination()),
    };
    item.settle(outcome)
}

async fn remove_one(item: BatchItem) -> ItemResult {
    let outcome = fs::remove_file(&item.source).await;
    item.settle(outcome)
}
