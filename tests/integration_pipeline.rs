//! Integration tests for the pipeline.
//!
//! These run whole passes over real files in a temporary directory:
//! - Duplicates resolved by creation time
//! - Tag-only differences still count as duplicates
//! - Dry runs, list files, hidden files
//! - Fatal enumeration errors

use assert_fs::prelude::*;
use assert_fs::TempDir;
use duprm::core::fingerprint::{fingerprint_bytes, FingerprintComputer, FingerprintData};
use duprm::core::pipeline::Pipeline;
use duprm::core::trash::Trasher;
use duprm::error::{DuprmError, FingerprintError, ScanError, TrashError};
use predicates::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

/// Real content fingerprints, creation times from a table keyed by file name
struct StampedComputer {
    times: HashMap<String, u64>,
}

impl StampedComputer {
    fn new(times: &[(&str, u64)]) -> Arc<Self> {
        Arc::new(Self {
            times: times.iter().map(|(n, t)| (n.to_string(), *t)).collect(),
        })
    }
}

impl FingerprintComputer for StampedComputer {
    fn compute(&self, path: &Path) -> Result<FingerprintData, FingerprintError> {
        let data = fs::read(path).map_err(|e| FingerprintError::from_io(path.to_path_buf(), e))?;
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        let secs = self.times.get(&name).copied().unwrap_or(0);
        Ok(FingerprintData {
            time: UNIX_EPOCH + Duration::from_secs(secs),
            fingerprint: fingerprint_bytes(&data),
        })
    }
}

/// Moves files into a recovery directory, like a trash can would
struct RecoveryDir {
    dir: PathBuf,
}

impl Trasher for RecoveryDir {
    fn trash(&self, path: &Path) -> Result<(), TrashError> {
        let target = self.dir.join(path.file_name().unwrap());
        fs::rename(path, target).map_err(|e| TrashError::DeleteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

fn id3v2(title: &str, payload: &[u8]) -> Vec<u8> {
    let mut frame = b"TIT2".to_vec();
    frame.extend_from_slice(&(title.len() as u32 + 1).to_be_bytes());
    frame.extend_from_slice(&[0, 0, 0]);
    frame.extend_from_slice(title.as_bytes());

    let size = frame.len() as u32;
    let mut data = b"ID3".to_vec();
    data.extend_from_slice(&[3, 0, 0]);
    data.extend_from_slice(&[
        ((size >> 21) & 0x7f) as u8,
        ((size >> 14) & 0x7f) as u8,
        ((size >> 7) & 0x7f) as u8,
        (size & 0x7f) as u8,
    ]);
    data.extend_from_slice(&frame);
    data.extend_from_slice(payload);
    data
}

fn recovery() -> (TempDir, Arc<RecoveryDir>) {
    let dir = TempDir::new().unwrap();
    let trasher = Arc::new(RecoveryDir {
        dir: dir.path().to_path_buf(),
    });
    (dir, trasher)
}

#[test]
fn newest_copy_is_kept_even_with_different_tags() {
    let music = TempDir::new().unwrap();
    music.child("a.mp3").write_binary(&id3v2("Old rip", b"frames-1")).unwrap();
    music.child("album/b.mp3").write_binary(&id3v2("New rip", b"frames-1")).unwrap();
    music.child("c.mp3").write_binary(b"frames-2").unwrap();
    let (bin, trasher) = recovery();

    let result = Pipeline::builder()
        .directory(music.path())
        .workers(4)
        .fingerprinter(StampedComputer::new(&[("a.mp3", 100), ("b.mp3", 200), ("c.mp3", 50)]))
        .trasher(trasher)
        .build()
        .run()
        .unwrap();

    music.child("a.mp3").assert(predicate::path::missing());
    music.child("album/b.mp3").assert(predicate::path::exists());
    music.child("c.mp3").assert(predicate::path::exists());
    bin.child("a.mp3").assert(predicate::path::exists());

    assert_eq!(result.total_files, 3);
    assert_eq!(result.kept.len(), 2);
    assert_eq!(result.trashed, vec![music.path().join("a.mp3")]);
    assert!(result.errors.is_empty());
}

#[test]
fn equal_times_keep_exactly_one_copy() {
    let music = TempDir::new().unwrap();
    for name in ["1.mp3", "2.mp3", "3.mp3"] {
        music.child(name).write_binary(b"same audio").unwrap();
    }
    let (_bin, trasher) = recovery();

    let result = Pipeline::builder()
        .directory(music.path())
        .workers(2)
        .fingerprinter(StampedComputer::new(&[]))
        .trasher(trasher)
        .build()
        .run()
        .unwrap();

    assert_eq!(result.kept.len(), 1);
    assert_eq!(result.trashed.len(), 2);
    music.child(result.kept[0].name.file_name().unwrap()).assert(predicate::path::exists());
}

#[test]
fn dry_run_leaves_every_file_in_place() {
    let music = TempDir::new().unwrap();
    music.child("a.mp3").write_binary(b"payload").unwrap();
    music.child("b.mp3").write_binary(b"payload").unwrap();

    let result = Pipeline::builder()
        .directory(music.path())
        .workers(2)
        .dry_run(true)
        .build()
        .run()
        .unwrap();

    music.child("a.mp3").assert(predicate::path::exists());
    music.child("b.mp3").assert(predicate::path::exists());
    assert_eq!(result.kept.len(), 1);
    assert_eq!(result.trashed.len(), 1);
}

#[test]
fn only_matching_visible_files_are_considered() {
    let music = TempDir::new().unwrap();
    music.child("song.mp3").write_binary(b"x").unwrap();
    music.child("SHOUT.MP3").write_binary(b"x").unwrap();
    music.child("cover.jpg").write_binary(b"x").unwrap();
    music.child(".hidden.mp3").write_binary(b"x").unwrap();
    music.child(".cache/copy.mp3").write_binary(b"x").unwrap();
    let (_bin, trasher) = recovery();

    let result = Pipeline::builder()
        .directory(music.path())
        .workers(2)
        .fingerprinter(StampedComputer::new(&[]))
        .trasher(trasher)
        .build()
        .run()
        .unwrap();

    assert_eq!(result.total_files, 1);
    assert!(result.trashed.is_empty());
    music.child(".cache/copy.mp3").assert(predicate::path::exists());
}

#[test]
fn list_file_entries_are_resolved_against_the_directory() {
    let music = TempDir::new().unwrap();
    music.child("a.mp3").write_binary(b"dup").unwrap();
    music.child("sub/b.mp3").write_binary(b"dup").unwrap();
    music.child("ignored.mp3").write_binary(b"dup").unwrap();
    let list = music.child("list.txt");
    list.write_str("a.mp3\n\nsub/b.mp3\r\n").unwrap();
    let (_bin, trasher) = recovery();

    let result = Pipeline::builder()
        .directory(music.path())
        .list(list.path())
        .workers(8)
        .fingerprinter(StampedComputer::new(&[("a.mp3", 2), ("b.mp3", 1)]))
        .trasher(trasher)
        .build()
        .run()
        .unwrap();

    assert_eq!(result.total_files, 2);
    music.child("a.mp3").assert(predicate::path::exists());
    music.child("sub/b.mp3").assert(predicate::path::missing());
    music.child("ignored.mp3").assert(predicate::path::exists());
}

#[test]
fn repeated_list_entry_never_trashes_the_file() {
    let music = TempDir::new().unwrap();
    music.child("only.mp3").write_binary(b"the one copy").unwrap();
    let list = music.child("list.txt");
    list.write_str("only.mp3\nonly.mp3\n").unwrap();
    let (bin, trasher) = recovery();

    let result = Pipeline::builder()
        .directory(music.path())
        .list(list.path())
        .workers(4)
        .fingerprinter(StampedComputer::new(&[("only.mp3", 10)]))
        .trasher(trasher)
        .build()
        .run()
        .unwrap();

    music.child("only.mp3").assert(predicate::path::exists());
    bin.child("only.mp3").assert(predicate::path::missing());
    assert_eq!(result.total_files, 2);
    assert_eq!(result.kept.len(), 1);
    assert_eq!(result.kept[0].name, music.path().join("only.mp3"));
    assert!(result.trashed.is_empty());
    assert!(result.trash_failures.is_empty());
}

#[test]
fn unreadable_list_entries_are_reported_per_file() {
    let music = TempDir::new().unwrap();
    music.child("here.mp3").write_binary(b"audio").unwrap();
    let list = music.child("list.txt");
    list.write_str("here.mp3\nnot-there.mp3\n").unwrap();

    let result = Pipeline::builder()
        .directory(music.path())
        .list(list.path())
        .workers(2)
        .dry_run(true)
        .build()
        .run()
        .unwrap();

    assert_eq!(result.kept.len(), 1);
    assert_eq!(result.errors.len(), 1);
    assert!(predicate::str::contains("not-there.mp3").eval(&result.errors[0]));
}

#[test]
fn missing_directory_is_fatal() {
    let music = TempDir::new().unwrap();

    let result = Pipeline::builder()
        .directory(music.path().join("nope"))
        .dry_run(true)
        .build()
        .run();

    assert!(matches!(
        result,
        Err(DuprmError::Scan(ScanError::DirectoryNotFound { .. }))
    ));
}

#[test]
fn missing_list_file_is_fatal() {
    let music = TempDir::new().unwrap();

    let result = Pipeline::builder()
        .directory(music.path())
        .list(music.path().join("absent.txt"))
        .dry_run(true)
        .build()
        .run();

    assert!(matches!(result, Err(DuprmError::Scan(ScanError::ReadList { .. }))));
}
