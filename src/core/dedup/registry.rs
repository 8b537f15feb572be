//! Registry of kept files.

use crate::core::fingerprint::Fingerprint;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::SystemTime;

/// A file currently kept by the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Path of the file
    pub name: PathBuf,
    /// Creation time
    pub time: SystemTime,
    /// Content fingerprint
    pub fingerprint: Fingerprint,
}

#[derive(Debug)]
struct Slot {
    sequence: u64,
    record: FileRecord,
}

/// Insertion-ordered set of kept files, at most one per fingerprint.
///
/// Records are keyed by fingerprint, so a second record with the same
/// fingerprint cannot exist: inserting one replaces the first.
#[derive(Debug, Default)]
pub struct Registry {
    slots: HashMap<Fingerprint, Slot>,
    next_sequence: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The record holding `fingerprint`, if any
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&FileRecord> {
        self.slots.get(fingerprint).map(|slot| &slot.record)
    }

    /// Insert as the most recent record, returning any record it displaced
    pub fn insert(&mut self, record: FileRecord) -> Option<FileRecord> {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.slots
            .insert(record.fingerprint, Slot { sequence, record })
            .map(|slot| slot.record)
    }

    pub fn remove(&mut self, fingerprint: &Fingerprint) -> Option<FileRecord> {
        self.slots.remove(fingerprint).map(|slot| slot.record)
    }

    /// Records in insertion order
    pub fn records(&self) -> Vec<&FileRecord> {
        let mut slots: Vec<&Slot> = self.slots.values().collect();
        slots.sort_by_key(|slot| slot.sequence);
        slots.into_iter().map(|slot| &slot.record).collect()
    }

    /// Consume the registry, returning records in insertion order
    pub fn into_records(self) -> Vec<FileRecord> {
        let mut slots: Vec<Slot> = self.slots.into_values().collect();
        slots.sort_by_key(|slot| slot.sequence);
        slots.into_iter().map(|slot| slot.record).collect()
    }
}
