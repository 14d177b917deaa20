use crate::error::IndexError;
use crate::language::Language;
use crate::report::{DocumentFailure, IndexStatus, RebuildReport};
use sage_cache::{ShardKey, StandardStorage};
use sage_core::{Fact, FactCodec, FactError, Word};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const INDEX_CATEGORY: &str = "database";
pub const INDEX_SUBCATEGORY: &str = "index";

/// File-backed fact index, sharded by word.
///
/// Layout: `<index_root>/<shard-key>/<document-name>` holds the facts of one source
/// document that contain the shard's word.
#[derive(Clone)]
pub struct DiskIndex {
    storage: StandardStorage,
    codec: Arc<dyn FactCodec>,
    language: Language,
}

impl DiskIndex {
    pub fn new(storage: StandardStorage, codec: Arc<dyn FactCodec>, language: Language) -> Self {
        Self {
            storage,
            codec,
            language,
        }
    }

    pub fn storage(&self) -> &StandardStorage {
        &self.storage
    }

    pub fn codec(&self) -> &dyn FactCodec {
        self.codec.as_ref()
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// `cache_<code>/database/index`.
    pub fn index_root(&self) -> PathBuf {
        self.storage.category_dir(INDEX_CATEGORY, INDEX_SUBCATEGORY)
    }

    fn shard_path(&self, key: &ShardKey, origin: Option<&str>) -> PathBuf {
        self.storage
            .resolve_shard_path(INDEX_CATEGORY, INDEX_SUBCATEGORY, key, origin)
    }

    /// Union of [`DiskIndex::find_facts_by_word`] over `words`.
    pub fn find_facts_by_words(&self, words: &[Word]) -> Result<BTreeSet<Fact>, IndexError> {
        tracing::info!(target: "sage.index", words = words.len(), "find by words");

        let distinct: BTreeSet<&Word> = words.iter().collect();
        let mut found = BTreeSet::new();
        for word in distinct {
            found.extend(self.find_facts_by_word(word)?);
        }

        tracing::info!(target: "sage.index", facts = found.len(), "facts found");
        Ok(found)
    }

    /// All indexed facts containing `word`. An unknown word yields an empty set.
    pub fn find_facts_by_word(&self, word: &Word) -> Result<BTreeSet<Fact>, IndexError> {
        let key = ShardKey::for_word(word);
        tracing::debug!(target: "sage.index", %word, %key, "find by word");
        self.find_facts_in(&self.shard_path(&key, None))
    }

    fn find_facts_in(&self, path: &Path) -> Result<BTreeSet<Fact>, IndexError> {
        let mut found = BTreeSet::new();

        let meta = match std::fs::metadata(path) {
            Ok(meta) => meta,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(found),
            Err(err) => return Err(IndexError::io(path, err)),
        };

        if meta.is_dir() {
            tracing::debug!(target: "sage.index", path = %path.display(), "find in directory");
            // Only the entries directly inside the shard directory belong to it.
            for entry in self.document_children(path)? {
                found.extend(self.read_document(&entry)?);
            }
        } else if meta.is_file() {
            tracing::debug!(target: "sage.index", path = %path.display(), "find in file");
            found.extend(self.read_document(path)?);
        }

        Ok(found)
    }

    /// Rebuilds the index entries of every document in the language directory.
    pub fn update_cache(&self) -> Result<RebuildReport, IndexError> {
        self.update_cache_path(self.storage.language_dir())
    }

    /// Rebuilds the index entries contributed by `target`.
    ///
    /// A relative `target` is resolved against the language directory. A directory
    /// target rebuilds each fact document directly inside it; nested directories are
    /// not descended into. Documents that fail to decode are recorded in
    /// [`RebuildReport::failures`] and the remaining documents are still processed. A
    /// single-document target that fails to decode is an error, and one without the
    /// codec's document extension is skipped. Write failures always abort the rebuild.
    pub fn update_cache_path(&self, target: impl AsRef<Path>) -> Result<RebuildReport, IndexError> {
        let target = target.as_ref();
        let target = if target.is_absolute() {
            target.to_path_buf()
        } else {
            self.storage.language_dir().join(target)
        };
        tracing::info!(target: "sage.index", path = %target.display(), "update cache");

        let meta = match std::fs::metadata(&target) {
            Ok(meta) => meta,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(
                    target: "sage.index",
                    path = %target.display(),
                    "update cache target does not exist"
                );
                return Ok(RebuildReport::default());
            }
            Err(err) => return Err(IndexError::io(&target, err)),
        };

        if meta.is_dir() {
            self.update_cache_directory(&target)
        } else if meta.is_file() && self.codec.is_document(&target) {
            self.update_cache_document(&target)
        } else {
            // Queries only read entries named after documents with the codec's extension.
            tracing::warn!(
                target: "sage.index",
                path = %target.display(),
                "update cache target is not a fact document"
            );
            Ok(RebuildReport::default())
        }
    }

    fn update_cache_directory(&self, dir: &Path) -> Result<RebuildReport, IndexError> {
        tracing::info!(target: "sage.index", path = %dir.display(), "update cache for directory");

        let mut report = RebuildReport::default();
        for document in self.document_children(dir)? {
            match self.update_cache_document(&document) {
                Ok(document_report) => report.merge(document_report),
                Err(err) if err.is_document_failure() => {
                    tracing::warn!(
                        target: "sage.index",
                        path = %document.display(),
                        error = %err,
                        "skipping fact document"
                    );
                    report.failures.push(DocumentFailure {
                        path: document,
                        error: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }
        Ok(report)
    }

    fn update_cache_document(&self, document: &Path) -> Result<RebuildReport, IndexError> {
        tracing::info!(target: "sage.index", path = %document.display(), "update cache for file");

        let origin = document
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| IndexError::NonUtf8DocumentName {
                path: document.to_path_buf(),
            })?;
        let facts = self.read_document(document)?;

        let mut entries: BTreeMap<PathBuf, BTreeSet<Fact>> = BTreeMap::new();
        for fact in &facts {
            tracing::trace!(target: "sage.index", fact = %fact, "update cache for fact");
            for word in fact.distinct_words() {
                let path = self.shard_path(&ShardKey::for_word(&word), Some(origin));
                entries.entry(path).or_default().insert(fact.clone());
            }
        }

        for (path, facts) in &entries {
            let mut content = String::new();
            for fact in facts {
                content.push_str(&self.codec.encode(fact));
            }
            tracing::debug!(target: "sage.index", path = %path.display(), "write cache file");
            sage_cache::atomic_write(path, content.as_bytes())?;
        }

        Ok(RebuildReport {
            documents: vec![document.to_path_buf()],
            facts: facts.len(),
            entries_written: entries.len(),
            failures: Vec::new(),
        })
    }

    /// Reads, canonicalizes and decodes one fact document.
    fn read_document(&self, path: &Path) -> Result<Vec<Fact>, IndexError> {
        let bytes = std::fs::read(path).map_err(|err| IndexError::io(path, err))?;
        let decode_error = |source: FactError| IndexError::Decode {
            path: path.to_path_buf(),
            source,
        };
        let text = String::from_utf8(bytes).map_err(|err| decode_error(err.into()))?;
        let canonical = self.codec.canonicalize(&text).map_err(decode_error)?;
        self.codec
            .decode(&canonical, Some(path))
            .map_err(decode_error)
    }

    /// Regular files directly inside `dir` that carry the codec's document extension,
    /// sorted by path.
    fn document_children(&self, dir: &Path) -> Result<Vec<PathBuf>, IndexError> {
        let read_dir = std::fs::read_dir(dir).map_err(|err| IndexError::io(dir, err))?;

        let mut documents = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|err| IndexError::io(dir, err))?;
            let path = entry.path();
            if !self.codec.is_document(&path) {
                continue;
            }
            match std::fs::metadata(&path) {
                Ok(meta) if meta.is_file() => documents.push(path),
                Ok(_) => {}
                // Replaced or removed since `read_dir` listed it.
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(IndexError::io(&path, err)),
            }
        }
        documents.sort();
        Ok(documents)
    }

    /// Removes every index entry. Source documents are untouched.
    pub fn clear(&self) -> Result<(), IndexError> {
        let root = self.index_root();
        let removed = sage_cache::remove_dir_if_exists(&root)?;
        tracing::info!(target: "sage.index", path = %root.display(), removed, "cleared index");
        Ok(())
    }

    pub fn status(&self) -> Result<IndexStatus, IndexError> {
        let index_root = self.index_root();
        let usage = sage_cache::index_usage(&index_root)?;
        Ok(IndexStatus {
            index_root,
            shards: usage.shards,
            entries: usage.entries,
            size_bytes: usage.size_bytes,
        })
    }
}

impl fmt::Debug for DiskIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiskIndex")
            .field("storage", &self.storage)
            .field("document_extension", &self.codec.document_extension())
            .finish_non_exhaustive()
    }
}
