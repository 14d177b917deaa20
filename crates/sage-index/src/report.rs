use serde::Serialize;
use std::path::PathBuf;

/// Outcome of a cache rebuild.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RebuildReport {
    /// Documents whose index entries were rewritten, in processing order.
    pub documents: Vec<PathBuf>,
    /// Facts decoded across all rebuilt documents.
    pub facts: usize,
    pub entries_written: usize,
    /// Documents skipped during a directory rebuild because they failed to decode.
    pub failures: Vec<DocumentFailure>,
}

impl RebuildReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub(crate) fn merge(&mut self, other: RebuildReport) {
        self.documents.extend(other.documents);
        self.facts += other.facts;
        self.entries_written += other.entries_written;
        self.failures.extend(other.failures);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Summary of what is currently on disk for an index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IndexStatus {
    pub index_root: PathBuf,
    pub shards: usize,
    pub entries: usize,
    pub size_bytes: u64,
}
