use crate::error::IndexError;
use sage_core::{Fact, Word};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Verb marking an equivalence fact such as "kitty = cat".
pub const SYNONYM_VERB: &str = "=";

/// Word lookups available to language collaborators while a query is prepared.
pub trait FactLookup {
    fn find_facts_by_word(&self, word: &Word) -> Result<BTreeSet<Fact>, IndexError>;
}

/// Re-tags the words of a pattern fact before its words are extracted.
pub trait Tagger: Send + Sync {
    fn retag(&self, fact: &mut Fact);
}

/// Augments a pattern fact's words with known synonyms.
pub trait SynonymExpander: Send + Sync {
    fn expand_synonyms(&self, fact: &mut Fact, index: &dyn FactLookup) -> Result<(), IndexError>;
}

/// Re-normalizes every word and drops words that normalize to nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainTagger;

impl Tagger for PlainTagger {
    fn retag(&self, fact: &mut Fact) {
        for part in fact.parts_mut() {
            let words = part.words_mut();
            for word in words.iter_mut() {
                *word = Word::new(word.as_str());
            }
            words.retain(|word| !word.is_empty());
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoSynonyms;

impl SynonymExpander for NoSynonyms {
    fn expand_synonyms(&self, _fact: &mut Fact, _index: &dyn FactLookup) -> Result<(), IndexError> {
        Ok(())
    }
}

/// Fixed word -> synonyms table, typically loaded from configuration.
///
/// Each synonym is inserted right after the word it was found for. The table is
/// not symmetric: `kitty -> [cat]` does not imply `cat -> [kitty]`.
#[derive(Clone, Debug, Default)]
pub struct SynonymTable {
    synonyms: BTreeMap<Word, Vec<Word>>,
}

impl SynonymTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, word: Word, synonyms: impl IntoIterator<Item = Word>) {
        let entry = self.synonyms.entry(word).or_default();
        for synonym in synonyms {
            if !synonym.is_empty() && !entry.contains(&synonym) {
                entry.push(synonym);
            }
        }
    }

    pub fn get(&self, word: &Word) -> &[Word] {
        self.synonyms.get(word).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.synonyms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.synonyms.is_empty()
    }
}

impl FromIterator<(Word, Vec<Word>)> for SynonymTable {
    fn from_iter<I: IntoIterator<Item = (Word, Vec<Word>)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (word, synonyms) in iter {
            table.insert(word, synonyms);
        }
        table
    }
}

impl SynonymExpander for SynonymTable {
    fn expand_synonyms(&self, fact: &mut Fact, _index: &dyn FactLookup) -> Result<(), IndexError> {
        append_synonyms(fact, &self.synonyms);
        Ok(())
    }
}

/// Finds synonyms in the index itself: an equivalence fact `<a> = <b>` with
/// single-word sides makes `a` and `b` synonyms of each other.
#[derive(Clone, Copy, Debug, Default)]
pub struct IndexedSynonyms;

impl SynonymExpander for IndexedSynonyms {
    fn expand_synonyms(&self, fact: &mut Fact, index: &dyn FactLookup) -> Result<(), IndexError> {
        let mut synonyms: BTreeMap<Word, Vec<Word>> = BTreeMap::new();
        for word in fact.distinct_words() {
            if word.as_str() == SYNONYM_VERB {
                continue;
            }
            for candidate in index.find_facts_by_word(&word)? {
                let Some(other_side) = equivalent_side(&candidate, &word) else {
                    continue;
                };
                let entry = synonyms.entry(word.clone()).or_default();
                for synonym in other_side {
                    if *synonym != word && !entry.contains(synonym) {
                        entry.push(synonym.clone());
                    }
                }
            }
        }

        tracing::trace!(
            target: "sage.index",
            words = synonyms.len(),
            "expanded synonyms from index"
        );
        append_synonyms(fact, &synonyms);
        Ok(())
    }
}

fn equivalent_side<'a>(fact: &'a Fact, word: &Word) -> Option<&'a [Word]> {
    let verb = fact.part("verb")?.words();
    if verb.len() != 1 || verb[0].as_str() != SYNONYM_VERB {
        return None;
    }

    let subject = fact.part("subject")?.words();
    let object = fact.part("object")?.words();
    let word = std::slice::from_ref(word);
    if subject == word {
        Some(object)
    } else if object == word {
        Some(subject)
    } else {
        None
    }
}

fn append_synonyms(fact: &mut Fact, synonyms: &BTreeMap<Word, Vec<Word>>) {
    if synonyms.is_empty() {
        return;
    }

    for part in fact.parts_mut() {
        let words = part.words_mut();
        let original = std::mem::take(words);
        for word in &original {
            words.push(word.clone());
            let Some(extra) = synonyms.get(word) else {
                continue;
            };
            for synonym in extra {
                if !original.contains(synonym) && !words.contains(synonym) {
                    words.push(synonym.clone());
                }
            }
        }
    }
}

/// Language-specific collaborators used to prepare pattern-fact queries.
#[derive(Clone)]
pub struct Language {
    tagger: Arc<dyn Tagger>,
    synonyms: Arc<dyn SynonymExpander>,
}

impl Language {
    pub fn new(tagger: Arc<dyn Tagger>, synonyms: Arc<dyn SynonymExpander>) -> Self {
        Self { tagger, synonyms }
    }

    /// [`PlainTagger`] without synonym expansion.
    pub fn plain() -> Self {
        Self::new(Arc::new(PlainTagger), Arc::new(NoSynonyms))
    }

    pub fn with_synonyms(mut self, synonyms: Arc<dyn SynonymExpander>) -> Self {
        self.synonyms = synonyms;
        self
    }

    pub fn tagger(&self) -> &dyn Tagger {
        self.tagger.as_ref()
    }

    pub fn synonyms(&self) -> &dyn SynonymExpander {
        self.synonyms.as_ref()
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::plain()
    }
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language").finish_non_exhaustive()
    }
}
