use std::io;
use std::path::Path;

use compio::fs;

/// Filesystem calls the executor is allowed to make. Nothing here reads file
/// contents or removes entries.
///
/// Futures are awaited on compio's thread-per-core runtime, so they carry no
/// `Send` bound.
#[allow(async_fn_in_trait)]
pub trait FsCapability {
    async fn exists(&self, path: &Path) -> bool;
    /// Creates `path` and every missing ancestor.
    async fn create_directory_recursive(&self, path: &Path) -> io::Result<()>;
    /// Creates an empty file, truncating an existing one.
    async fn create_empty_file(&self, path: &Path) -> io::Result<()>;
}

/// The real filesystem, through compio.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompioFs;

impl FsCapability for CompioFs {
    async fn exists(&self, path: &Path) -> bool {
        fs::metadata(path).await.is_ok()
    }

    async fn create_directory_recursive(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path).await
    }

    async fn create_empty_file(&self, path: &Path) -> io::Result<()> {
        fs::write(path, Vec::<u8>::new()).await.0
    }
}
