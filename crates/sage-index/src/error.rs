use sage_core::FactError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error(transparent)]
    Cache(#[from] sage_cache::CacheError),

    #[error("failed to decode fact document {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: FactError,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("document name of {path} is not valid UTF-8")]
    NonUtf8DocumentName { path: PathBuf },
}

impl IndexError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this failure is confined to a single document (as opposed to the
    /// index or the file system as a whole).
    pub fn is_document_failure(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::NonUtf8DocumentName { .. })
    }
}
