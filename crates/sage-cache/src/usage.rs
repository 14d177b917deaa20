use crate::error::CacheError;
use serde::Serialize;
use std::path::Path;
use walkdir::WalkDir;

/// Disk usage of an index root laid out as `<root>/<shard-key>/<entry>`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IndexUsage {
    /// Shard directories directly below the root.
    pub shards: usize,
    /// Regular files one level below a shard directory.
    pub entries: usize,
    pub size_bytes: u64,
}

/// Scans `index_root` two levels deep. A missing root reports zero usage.
pub fn index_usage(index_root: &Path) -> Result<IndexUsage, CacheError> {
    let mut usage = IndexUsage::default();
    if !index_root.is_dir() {
        return Ok(usage);
    }

    for entry in WalkDir::new(index_root).min_depth(1).max_depth(2) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                // Entries can race with a concurrent rebuild replacing files.
                if err
                    .io_error()
                    .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
                {
                    continue;
                }
                return Err(err.into());
            }
        };

        let file_type = entry.file_type();
        match entry.depth() {
            1 if file_type.is_dir() => usage.shards += 1,
            2 if file_type.is_file() => {
                usage.entries += 1;
                usage.size_bytes += entry.metadata()?.len();
            }
            _ => {}
        }
    }

    tracing::debug!(
        target: "sage.cache",
        root = %index_root.display(),
        shards = usage.shards,
        entries = usage.entries,
        size_bytes = usage.size_bytes,
        "scanned index usage"
    );
    Ok(usage)
}
