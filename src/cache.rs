//! Resolution cache: absolute path to extracted document record, in discovery order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::types::DocumentRecord;

/// Insertion-ordered map of absolute document path to its record.
///
/// Records are appended, never replaced or removed, so an index handed out
/// by `len` stays valid for the rest of the run.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    /// Position of each record in `records`.
    index: HashMap<PathBuf, usize>,
    /// Records in the order they were discovered.
    records: Vec<DocumentRecord>,
}

impl ResolutionCache {
    /// Whether a record exists for this absolute path.
    pub fn contains(&self, absolute_path: &Path) -> bool {
        return self.index.contains_key(absolute_path);
    }

    /// The record for this absolute path, if one was loaded.
    pub fn get(&self, absolute_path: &Path) -> Option<&DocumentRecord> {
        return self
            .index
            .get(absolute_path)
            .and_then(|&position| return self.records.get(position));
    }

    /// Add a fully populated record. Returns `false` and drops the record
    /// when its path is already present.
    pub fn insert(&mut self, record: DocumentRecord) -> bool {
        if self.contains(&record.absolute_path) {
            return false;
        }
        self.index.insert(record.absolute_path.clone(), self.records.len());
        self.records.push(record);
        return true;
    }

    /// Whether no document has been loaded yet.
    pub fn is_empty(&self) -> bool {
        return self.records.is_empty();
    }

    /// Number of records loaded so far.
    pub fn len(&self) -> usize {
        return self.records.len();
    }

    /// The record discovered at `position`.
    pub fn record_at(&self, position: usize) -> Option<&DocumentRecord> {
        return self.records.get(position);
    }
}
