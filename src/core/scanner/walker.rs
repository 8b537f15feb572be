//! Directory walking implementation using walkdir.

use super::filter::{is_hidden, AudioFilter};
use crate::error::ScanError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lazily yields paths under `root` that pass an [`AudioFilter`].
///
/// Paths are relative to the root. Within a directory entries come out in
/// file-name order. The first traversal error is returned once, after which
/// the walker is exhausted.
pub struct GlobWalker {
    root: PathBuf,
    filter: AudioFilter,
    entries: walkdir::IntoIter,
    failed: bool,
}

impl GlobWalker {
    /// Start walking `root`
    pub fn new(root: &Path, filter: AudioFilter) -> Result<Self, ScanError> {
        if !root.exists() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        if !root.is_dir() {
            return Err(ScanError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        let entries = WalkDir::new(root).sort_by_file_name().into_iter();

        Ok(Self {
            root: root.to_path_buf(),
            filter,
            entries,
            failed: false,
        })
    }

    fn walk_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());

        if error.io_error().map(|e| e.kind()) == Some(std::io::ErrorKind::PermissionDenied) {
            ScanError::PermissionDenied { path }
        } else {
            ScanError::ReadDirectory {
                path,
                source: error.into(),
            }
        }
    }
}

impl Iterator for GlobWalker {
    type Item = Result<PathBuf, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(error) => {
                    self.failed = true;
                    return Some(Err(self.walk_error(error)));
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            // Prune hidden directories instead of walking into them
            if !self.filter.include_hidden() && is_hidden(entry.file_name()) {
                if entry.file_type().is_dir() {
                    self.entries.skip_current_dir();
                }
                continue;
            }

            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or(entry.path())
                .to_path_buf();

            if self.filter.should_include(&relative) {
                return Some(Ok(relative));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::filter::DEFAULT_PATTERN;
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn create_track(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(b"\xff\xfb audio").unwrap();
        path
    }

    fn walk(root: &Path, filter: AudioFilter) -> Vec<PathBuf> {
        GlobWalker::new(root, filter)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    fn default_filter() -> AudioFilter {
        AudioFilter::new(DEFAULT_PATTERN).unwrap()
    }

    #[test]
    fn walk_empty_directory_yields_nothing() {
        let temp_dir = TempDir::new().unwrap();
        assert!(walk(temp_dir.path(), default_filter()).is_empty());
    }

    #[test]
    fn walk_yields_relative_paths_in_name_order() {
        let temp_dir = TempDir::new().unwrap();
        create_track(temp_dir.path(), "b.mp3");
        create_track(temp_dir.path(), "a.mp3");

        let found = walk(temp_dir.path(), default_filter());
        assert_eq!(found, vec![PathBuf::from("a.mp3"), PathBuf::from("b.mp3")]);
    }

    #[test]
    fn walk_traverses_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let album = temp_dir.path().join("artist").join("album");
        fs::create_dir_all(&album).unwrap();
        create_track(temp_dir.path(), "root.mp3");
        create_track(&album, "nested.mp3");

        let found = walk(temp_dir.path(), default_filter());
        assert_eq!(found.len(), 2);
        assert!(found.contains(&PathBuf::from("artist/album/nested.mp3")));
    }

    #[test]
    fn walk_excludes_non_matching_files() {
        let temp_dir = TempDir::new().unwrap();
        create_track(temp_dir.path(), "track.mp3");
        File::create(temp_dir.path().join("cover.jpg")).unwrap();
        File::create(temp_dir.path().join("notes.txt")).unwrap();

        let found = walk(temp_dir.path(), default_filter());
        assert_eq!(found, vec![PathBuf::from("track.mp3")]);
    }

    #[test]
    fn walk_skips_hidden_entries_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let hidden_dir = temp_dir.path().join(".trash");
        fs::create_dir(&hidden_dir).unwrap();
        create_track(&hidden_dir, "old.mp3");
        create_track(temp_dir.path(), ".hidden.mp3");
        create_track(temp_dir.path(), "visible.mp3");

        let found = walk(temp_dir.path(), default_filter());
        assert_eq!(found, vec![PathBuf::from("visible.mp3")]);

        let found = walk(temp_dir.path(), default_filter().with_hidden(true));
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn walk_missing_root_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let result = GlobWalker::new(&missing, default_filter());
        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }

    #[test]
    fn walk_file_root_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_track(temp_dir.path(), "track.mp3");

        let result = GlobWalker::new(&file, default_filter());
        assert!(matches!(result, Err(ScanError::NotADirectory { .. })));
    }
}
