use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors produced by storage layout management and index file persistence.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("storage root {path} is not a directory")]
    RootNotDirectory { path: PathBuf },

    #[error("storage root {path} does not exist and cannot be created: {source}")]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid language code {code:?}: expected 2-8 ASCII letters or digits")]
    InvalidLanguageCode { code: String },
}
