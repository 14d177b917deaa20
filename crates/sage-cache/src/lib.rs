//! On-disk layout for Sage's derived fact index.
//!
//! ## On-disk layout
//!
//! Everything lives under a storage root handed to [`StandardStorage::new`]:
//! - `lang_<code>/`:
//!   - source fact documents for one language (the source of truth)
//! - `cache_<code>/<category>/<subcategory>/<shard-key>/<origin>`:
//!   - derived index entries, see [`StandardStorage::resolve_shard_path`]
//!
//! Index entries are written with [`atomic_write`], so a reader never observes a
//! partially written entry under its final name.

mod error;
mod shard;
mod storage;
mod usage;
mod util;

pub use error::{CacheError, Result};
pub use shard::{shard_path, ShardKey, MAX_VERBATIM_KEY_LEN};
pub use storage::{validate_language_code, StandardStorage, DEFAULT_LANGUAGE};
pub use usage::{index_usage, IndexUsage};
pub use util::{atomic_write, remove_dir_if_exists};
