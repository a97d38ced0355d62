//! Local filesystem content store.

use crate::ByteStream;
use crate::error::{StoreError, StoreResult};
use cass_core::hash::ContentDigest;
use cass_core::object::StoredObject;
use futures::StreamExt;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use uuid::Uuid;

/// Prefix of in-flight upload files inside the temp directory.
const TEMP_PREFIX: &str = "cass_";

/// Mode of published objects: owner read/write, world read.
#[cfg(unix)]
const PUBLISHED_MODE: u32 = 0o644;

/// Filesystem store that names every object after the SHA-1 of its content.
///
/// Content is written to a unique file in `temp_dir` and renamed into
/// `file_store` once complete, so readers of `file_store` never see a
/// partially written object under its public name.
#[derive(Debug)]
pub struct ContentStore {
    file_store: PathBuf,
    temp_dir: PathBuf,
}

impl ContentStore {
    /// Open a store, creating both directories if they are missing.
    pub async fn new(file_store: impl AsRef<Path>, temp_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let file_store = file_store.as_ref().to_path_buf();
        let temp_dir = temp_dir.as_ref().to_path_buf();
        for dir in [&file_store, &temp_dir] {
            fs::create_dir_all(dir)
                .await
                .map_err(|source| StoreError::Init {
                    path: dir.clone(),
                    source,
                })?;
        }
        Ok(Self {
            file_store,
            temp_dir,
        })
    }

    /// Directory published objects live in.
    pub fn file_store(&self) -> &Path {
        &self.file_store
    }

    /// Directory in-flight uploads are written to.
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Path an object with the given filename is published at.
    pub fn object_path(&self, filename: &str) -> PathBuf {
        self.file_store.join(filename)
    }

    /// Persist `stream` and return the digest-derived filename it was published under.
    ///
    /// The extension is taken from `original_filename`; nothing else of it is used.
    /// Storing the same bytes under the same extension again yields the same name
    /// and replaces the object with identical content.
    #[instrument(skip(self, stream))]
    pub async fn store(
        &self,
        mut stream: ByteStream<'_>,
        original_filename: &str,
    ) -> StoreResult<String> {
        // Removes the temp file on every exit, including when this future is dropped.
        let (file, temp) = self.create_temp_file().await?;

        let (digest, size) = write_hashed(file, &mut stream)
            .await
            .map_err(StoreError::CopyFailed)?;
        drop(stream);

        let filename = StoredObject::new(digest, original_filename).filename();
        let destination = self.object_path(&filename);

        publish(temp.path(), &destination, &filename).await?;
        set_published_permissions(&destination).await;

        tracing::info!(filename = %filename, size, "Stored object");
        Ok(filename)
    }

    /// Verify both directories exist and are directories.
    pub async fn health_check(&self) -> StoreResult<()> {
        for dir in [&self.file_store, &self.temp_dir] {
            let metadata = fs::metadata(dir).await.map_err(|source| StoreError::Init {
                path: dir.clone(),
                source,
            })?;
            if !metadata.is_dir() {
                return Err(StoreError::Init {
                    path: dir.clone(),
                    source: io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
                });
            }
        }
        Ok(())
    }

    /// Whether the temp and store directories share a filesystem, i.e. whether
    /// publishing can be a plain rename.
    #[cfg(unix)]
    pub async fn same_device(&self) -> StoreResult<bool> {
        use std::os::unix::fs::MetadataExt;

        let mut devices = Vec::with_capacity(2);
        for dir in [&self.file_store, &self.temp_dir] {
            let metadata = fs::metadata(dir).await.map_err(|source| StoreError::Init {
                path: dir.clone(),
                source,
            })?;
            devices.push(metadata.dev());
        }
        Ok(devices[0] == devices[1])
    }

    #[cfg(not(unix))]
    pub async fn same_device(&self) -> StoreResult<bool> {
        Ok(true)
    }

    async fn create_temp_file(&self) -> StoreResult<(fs::File, TempFile)> {
        let path = self
            .temp_dir
            .join(format!("{TEMP_PREFIX}{}", Uuid::new_v4().simple()));
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|source| StoreError::TempFileCreateFailed {
                dir: self.temp_dir.clone(),
                source,
            })?;
        Ok((file, TempFile { path }))
    }
}

/// In-flight upload file. Removed when dropped; after a successful publish
/// nothing is left at the path and the removal is a no-op.
struct TempFile {
    path: PathBuf,
}

impl TempFile {
    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != io::ErrorKind::NotFound
        {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove temporary file"
            );
        }
    }
}

/// Copy every chunk into `file` while hashing it; returns digest and size.
async fn write_hashed(
    mut file: fs::File,
    stream: &mut ByteStream<'_>,
) -> io::Result<(ContentDigest, u64)> {
    let mut hasher = ContentDigest::hasher();
    let mut size = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        hasher.update(&chunk);
        file.write_all(&chunk).await?;
        size += chunk.len() as u64;
    }
    file.flush().await?;
    // Data must be on disk before the rename makes it visible.
    file.sync_all().await?;
    Ok((hasher.finalize(), size))
}

/// Move a finished temp file to its public name. After the copy fallback
/// the temp file is still in place; the caller's `TempFile` removes it.
async fn publish(temp_path: &Path, destination: &Path, filename: &str) -> StoreResult<()> {
    let rename = match fs::rename(temp_path, destination).await {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    tracing::warn!(
        filename = %filename,
        error = %rename,
        "Rename into file store failed, falling back to staged copy"
    );

    copy_then_rename(temp_path, destination)
        .await
        .map_err(|fallback| StoreError::PublishFailed {
            filename: filename.to_string(),
            rename,
            fallback,
        })
}

/// Copy `source` next to `destination` under a hidden staging name, then
/// rename it into place. The rename stays on the destination's filesystem,
/// so readers see either the old object or the complete new one.
pub(crate) async fn copy_then_rename(source: &Path, destination: &Path) -> io::Result<()> {
    let staging = staging_path(destination);
    let result = async {
        fs::copy(source, &staging).await?;
        fs::File::open(&staging).await?.sync_all().await?;
        fs::rename(&staging, destination).await
    }
    .await;

    if result.is_err() {
        let _ = fs::remove_file(&staging).await;
    }
    result
}

fn staging_path(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    destination.with_file_name(format!(".{name}.tmp.{}", Uuid::new_v4().simple()))
}

#[cfg(unix)]
async fn set_published_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let permissions = std::fs::Permissions::from_mode(PUBLISHED_MODE);
    if let Err(e) = fs::set_permissions(path, permissions).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to set object permissions");
    }
}

#[cfg(not(unix))]
async fn set_published_permissions(_path: &Path) {}
