//! Capability-scoped blob storage on the local filesystem.
//!
//! All paths are resolved inside a single [`Dir`] opened at startup, so a
//! stored path can never escape the upload root. Writes land in a staging
//! file first and are renamed into place.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use cap_std::{ambient_authority, fs::Dir};
use uuid::Uuid;

use crate::domain::StoragePath;
use crate::domain::ports::{BlobStorage, BlobStorageError};

/// Blob storage rooted at the configured upload directory.
#[derive(Clone)]
pub struct LocalBlobStorage {
    root: Arc<Dir>,
}

impl LocalBlobStorage {
    /// Create (if needed) and open the upload root.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the directory cannot be created
    /// or opened.
    pub fn open(root: &Path) -> io::Result<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            root: Arc::new(dir),
        })
    }

    async fn run_blocking<F>(&self, path: &StoragePath, task: F) -> Result<(), BlobStorageError>
    where
        F: FnOnce(&Dir) -> io::Result<()> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        let display = path.to_string();
        tokio::task::spawn_blocking(move || task(&root))
            .await
            .map_err(|error| BlobStorageError::io(display.clone(), error.to_string()))?
            .map_err(|error| BlobStorageError::io(display, error.to_string()))
    }
}

fn write_staged(root: &Dir, relative: &str, content: &[u8]) -> io::Result<()> {
    let target = Path::new(relative);
    let parent = target.parent().filter(|parent| !parent.as_os_str().is_empty());
    if let Some(parent) = parent {
        root.create_dir_all(parent)?;
    }
    let staging_name = format!(".tmp-upload-{}", Uuid::new_v4().simple());
    let staging = parent.map_or_else(
        || Path::new(&staging_name).to_path_buf(),
        |parent| parent.join(&staging_name),
    );
    if let Err(error) = root.write(&staging, content) {
        let _cleanup = root.remove_file(&staging);
        return Err(error);
    }
    root.rename(&staging, root, target).inspect_err(|_| {
        let _cleanup = root.remove_file(&staging);
    })
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    async fn put(&self, path: &StoragePath, content: Bytes) -> Result<(), BlobStorageError> {
        let relative = path.as_str().to_owned();
        self.run_blocking(path, move |root| write_staged(root, &relative, &content))
            .await
    }

    async fn remove(&self, path: &StoragePath) -> Result<(), BlobStorageError> {
        let relative = path.as_str().to_owned();
        self.run_blocking(path, move |root| root.remove_file(&relative))
            .await
    }
}
