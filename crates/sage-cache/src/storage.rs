use crate::error::CacheError;
use crate::shard::{shard_path, ShardKey};
use std::path::{Path, PathBuf};

pub const DEFAULT_LANGUAGE: &str = "en";

/// The standard directory structure below a storage root.
///
/// Source documents live in `lang_<code>/` and derived data in `cache_<code>/`,
/// where `<code>` is the language this storage was created for. The language is
/// fixed at construction; there is no process-wide "current language".
#[derive(Clone, Debug)]
pub struct StandardStorage {
    root: PathBuf,
    language: String,
}

impl StandardStorage {
    /// Opens (creating if needed) the storage root and the language/cache directories.
    ///
    /// Fails if `root` exists but is not a directory, or cannot be created.
    pub fn new(root: impl AsRef<Path>, language: impl Into<String>) -> Result<Self, CacheError> {
        let root = root.as_ref().to_path_buf();
        let language = language.into();
        validate_language_code(&language)?;

        if root.exists() && !root.is_dir() {
            return Err(CacheError::RootNotDirectory { path: root });
        }
        std::fs::create_dir_all(&root).map_err(|source| CacheError::RootUnavailable {
            path: root.clone(),
            source,
        })?;

        let storage = Self { root, language };
        std::fs::create_dir_all(storage.language_dir())?;
        std::fs::create_dir_all(storage.cache_dir())?;

        tracing::debug!(
            target: "sage.cache",
            root = %storage.root.display(),
            language = %storage.language,
            "opened storage"
        );
        Ok(storage)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Directory holding the source fact documents, `<root>/lang_<code>`.
    pub fn language_dir(&self) -> PathBuf {
        self.root.join(format!("lang_{}", self.language))
    }

    /// Directory holding derived data, `<root>/cache_<code>`.
    pub fn cache_dir(&self) -> PathBuf {
        self.root.join(format!("cache_{}", self.language))
    }

    /// `cache_<code>/<category>/<subcategory>`.
    pub fn category_dir(&self, category: &str, subcategory: &str) -> PathBuf {
        self.cache_dir().join(category).join(subcategory)
    }

    /// Resolves a shard below `category_dir(category, subcategory)`.
    ///
    /// See [`shard_path`] for the directory/entry distinction made by `origin`.
    pub fn resolve_shard_path(
        &self,
        category: &str,
        subcategory: &str,
        key: &ShardKey,
        origin: Option<&str>,
    ) -> PathBuf {
        shard_path(&self.category_dir(category, subcategory), key, origin)
    }
}

/// Language codes are 2-8 ASCII letters or digits (`en`, `de`, `pt1`).
pub fn validate_language_code(code: &str) -> Result<(), CacheError> {
    let valid = (2..=8).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_alphanumeric());
    if valid {
        Ok(())
    } else {
        Err(CacheError::InvalidLanguageCode {
            code: code.to_string(),
        })
    }
}
