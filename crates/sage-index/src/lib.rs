//! Word-sharded fact index.
//!
//! Source fact documents under `lang_<code>/` are the source of truth. Rebuilding the
//! cache decodes a document and writes, for every word of every fact, the set of facts
//! from that document containing the word to
//! `cache_<code>/database/index/<shard-key>/<document-name>`. Looking a word up reads
//! back every entry of its shard directory and unions them.
//!
//! The index is derived data: entries are only ever replaced wholesale, by rebuilding
//! the document they came from. There is no locking; a rebuild racing another rebuild
//! or a query is last-writer-wins per entry file.

mod error;
mod index;
mod language;
mod query;
mod report;

pub use error::IndexError;
pub use index::{DiskIndex, INDEX_CATEGORY, INDEX_SUBCATEGORY};
pub use language::{
    FactLookup, IndexedSynonyms, Language, NoSynonyms, PlainTagger, SynonymExpander,
    SynonymTable, Tagger, SYNONYM_VERB,
};
pub use report::{DocumentFailure, IndexStatus, RebuildReport};
