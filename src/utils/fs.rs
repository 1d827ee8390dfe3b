//! Recursive directory copying for template resources.

use std::{fs, io, path::Path};
use thiserror::Error;
use walkdir::WalkDir;

/// Errors from the resource copy step. Fatal for the current build.
#[derive(Debug, Error)]
pub enum CopyError {
    #[error("resource directory `{0}` does not exist")]
    MissingSource(std::path::PathBuf),

    #[error("failed to copy `{0}`")]
    Io(std::path::PathBuf, #[source] io::Error),

    #[error("failed to walk `{0}`")]
    Walk(std::path::PathBuf, #[source] walkdir::Error),
}

/// Recursively copy `src` into `dest`, overwriting existing files.
///
/// Directory structure is mirrored; `dest` is created if needed.
pub fn copy_dir_recursive(src: &Path, dest: &Path) -> Result<(), CopyError> {
    if !src.is_dir() {
        return Err(CopyError::MissingSource(src.to_path_buf()));
    }

    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(|err| CopyError::Walk(src.to_path_buf(), err))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .expect("walkdir yields paths under its root");
        let target = dest.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|err| CopyError::Io(target.clone(), err))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .map_err(|err| CopyError::Io(parent.to_path_buf(), err))?;
            }
            fs::copy(entry.path(), &target)
                .map_err(|err| CopyError::Io(entry.path().to_path_buf(), err))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copies_nested_tree() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        fs::create_dir_all(src.path().join("css")).unwrap();
        fs::write(src.path().join("css/main.css"), "body {}").unwrap();
        fs::write(src.path().join("logo.svg"), "<svg/>").unwrap();

        copy_dir_recursive(src.path(), dest.path()).unwrap();

        assert_eq!(
            fs::read_to_string(dest.path().join("css/main.css")).unwrap(),
            "body {}"
        );
        assert_eq!(
            fs::read_to_string(dest.path().join("logo.svg")).unwrap(),
            "<svg/>"
        );
    }

    #[test]
    fn test_overwrites_existing_files() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        fs::write(src.path().join("main.css"), "new").unwrap();
        fs::write(dest.path().join("main.css"), "old").unwrap();

        copy_dir_recursive(src.path(), dest.path()).unwrap();

        assert_eq!(
            fs::read_to_string(dest.path().join("main.css")).unwrap(),
            "new"
        );
    }

    #[test]
    fn test_missing_source_is_error() {
        let dest = tempfile::tempdir().unwrap();
        let err = copy_dir_recursive(Path::new("/nonexistent/resources"), dest.path())
            .unwrap_err();

        assert!(matches!(err, CopyError::MissingSource(_)));
    }

    #[test]
    fn test_creates_missing_destination() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        fs::write(src.path().join("a.txt"), "a").unwrap();
        let nested = dest.path().join("not/yet/created");

        copy_dir_recursive(src.path(), &nested).unwrap();

        assert!(nested.join("a.txt").is_file());
    }
}
