//! Asset versioning. Clients holding a page built against other assets are asked to do a full reload.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::VersionError;

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), VersionError> {
    let entries = fs::read_dir(dir).map_err(|source| VersionError::ListFailed {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| VersionError::ListFailed {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        // Symlinked directories are not followed
        let file_type = entry.file_type().map_err(|source| VersionError::ListFailed {
            path: path.clone(),
            source,
        })?;

        if file_type.is_dir() {
            collect_files(&path, files)?;
        } else if file_type.is_symlink() && !path.is_file() {
            debug!(name: "inertia", "skipping {} while hashing assets", path.display());
        } else {
            files.push(path);
        }
    }

    Ok(())
}

/// Computes the version of the assets found under `dir`.
///
/// The version covers the relative path and content of every file, so renaming, editing, adding or removing an asset all change it.
pub fn hash_assets(dir: &Path) -> Result<String, VersionError> {
    if !dir.is_dir() {
        return Err(VersionError::MissingDirectory {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    collect_files(dir, &mut files)?;
    files.sort();

    let mut hasher = blake3::Hasher::new();

    for file in &files {
        let content = fs::read(file).map_err(|source| VersionError::ReadFailed {
            path: file.clone(),
            source,
        })?;
        let relative = file.strip_prefix(dir).unwrap_or(file);

        hasher.update(relative.to_string_lossy().as_bytes());
        hasher.update(&[0]);
        hasher.update(&(content.len() as u64).to_le_bytes());
        hasher.update(&content);
    }

    // A short hash is plenty to tell builds apart
    Ok(hasher.finalize().to_hex()[..16].to_string())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::hash_assets;
    use crate::errors::VersionError;

    #[test]
    fn test_hash_is_stable() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("app.js"), "console.log('hi')").unwrap();

        let first = hash_assets(dir.path()).unwrap();
        let second = hash_assets(dir.path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 16);
    }

    #[test]
    fn test_hash_changes_with_assets() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("app.js"), "console.log('hi')").unwrap();
        let before = hash_assets(dir.path()).unwrap();

        fs::write(dir.path().join("app.js"), "console.log('hello')").unwrap();
        let edited = hash_assets(dir.path()).unwrap();

        fs::create_dir(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("css/app.css"), "body {}").unwrap();
        let added = hash_assets(dir.path()).unwrap();

        assert_ne!(before, edited);
        assert_ne!(edited, added);
    }

    #[test]
    fn test_hash_of_empty_directory() {
        let dir = tempdir().unwrap();

        assert_eq!(hash_assets(dir.path()).unwrap().len(), 16);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directories_are_not_followed() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("app.js"), "console.log('hi')").unwrap();
        let before = hash_assets(dir.path()).unwrap();

        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();

        assert_eq!(hash_assets(dir.path()).unwrap(), before);
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempdir().unwrap();

        assert!(matches!(
            hash_assets(&dir.path().join("assets")),
            Err(VersionError::MissingDirectory { .. })
        ));
    }
}
