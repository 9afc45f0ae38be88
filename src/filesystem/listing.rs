use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use snafu::{ResultExt, Snafu, ensure};
use tracing::debug;

use crate::ext::BestEffortPathExt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingEntry {
    pub name: String,
    pub path: PathBuf,
}

/// Immediate children of a directory, split by kind and sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryListing {
    pub path: PathBuf,
    pub directories: Vec<ListingEntry>,
    pub files: Vec<ListingEntry>,
}

#[derive(Debug, Snafu)]
pub enum ListingError {
    #[snafu(display("Directory {} does not exist or is not accessible", path.best_effort_path_display()))]
    Inaccessible { path: PathBuf, source: std::io::Error },
    #[snafu(display("{} is not a directory", path.best_effort_path_display()))]
    NotADirectory { path: PathBuf },
    #[snafu(display("Failed to read directory {}", path.best_effort_path_display()))]
    Read { path: PathBuf, source: std::io::Error },
}

/// Lists `path` one level deep. Entries that are neither plain files nor
/// directories are left out.
pub fn list_directory(path: &Path) -> Result<DirectoryListing, ListingError> {
    let metadata = fs::metadata(path).context(InaccessibleSnafu { path })?;
    ensure!(metadata.is_dir(), NotADirectorySnafu { path });

    let mut directories = Vec::new();
    let mut files = Vec::new();
    for entry in fs::read_dir(path).context(ReadSnafu { path })? {
        let entry = entry.context(ReadSnafu { path })?;
        let file_type = entry.file_type().context(ReadSnafu { path })?;
        let listed = ListingEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
        };
        if file_type.is_dir() {
            directories.push(listed);
        } else if file_type.is_file() {
            files.push(listed);
        }
    }

    directories.sort_by(|a, b| a.name.cmp(&b.name));
    files.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(
        "Listed {} directories and {} files in {}",
        directories.len(),
        files.len(),
        path.display()
    );

    Ok(DirectoryListing {
        path: path.to_path_buf(),
        directories,
        files,
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn lists_immediate_children_only() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir_all(root.join("b/nested")).unwrap();
        fs::create_dir(root.join("a")).unwrap();
        fs::write(root.join("z.txt"), "").unwrap();
        fs::write(root.join("b/inner.txt"), "").unwrap();

        let listing = list_directory(root).expect("listing succeeds");

        let directories = listing
            .directories
            .iter()
            .map(|entry| entry.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(directories, vec!["a", "b"]);
        assert_eq!(listing.files.len(), 1);
        assert_eq!(listing.files[0].name, "z.txt");
        assert_eq!(listing.files[0].path, root.join("z.txt"));
    }

    #[test]
    fn missing_path_is_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result = list_directory(&temp_dir.path().join("missing"));
        assert!(matches!(result, Err(ListingError::Inaccessible { .. })));
    }

    #[test]
    fn file_path_is_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, "").unwrap();

        let result = list_directory(&file);

        assert!(matches!(result, Err(ListingError::NotADirectory { .. })));
    }
}
