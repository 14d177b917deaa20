use crate::error::IndexError;
use crate::index::DiskIndex;
use crate::language::FactLookup;
use sage_core::{Fact, Word};
use std::collections::BTreeSet;

impl DiskIndex {
    /// Facts sharing at least one word with `pattern` after synonym expansion and
    /// re-tagging.
    ///
    /// `pattern` is consumed; the expanded pattern is only used to pick words.
    pub fn find_facts(&self, mut pattern: Fact) -> Result<BTreeSet<Fact>, IndexError> {
        tracing::info!(target: "sage.index", pattern = %pattern, "find by fact");

        self.language().synonyms().expand_synonyms(&mut pattern, self)?;
        self.language().tagger().retag(&mut pattern);

        let words = filter_useful_words(pattern.words());
        self.find_facts_by_words(&words)
    }
}

impl FactLookup for DiskIndex {
    fn find_facts_by_word(&self, word: &Word) -> Result<BTreeSet<Fact>, IndexError> {
        DiskIndex::find_facts_by_word(self, word)
    }
}

// Every word is kept: no usefulness policy (stop words, minimum length) is defined.
fn filter_useful_words(words: Vec<Word>) -> Vec<Word> {
    words
}
