use crate::word::Word;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// Part names that sort before all others, in this order.
///
/// Any other part name sorts after these, lexicographically.
pub const CANONICAL_PART_ORDER: [&str; 4] = ["subject", "verb", "object", "adverbs"];

/// Compares two part names by canonical tag order.
pub fn part_order(a: &str, b: &str) -> Ordering {
    part_rank(a).cmp(&part_rank(b)).then_with(|| a.cmp(b))
}

fn part_rank(name: &str) -> usize {
    CANONICAL_PART_ORDER
        .iter()
        .position(|known| *known == name)
        .unwrap_or(CANONICAL_PART_ORDER.len())
}

/// One named component of a fact, e.g. the `subject` "the cat".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FactPart {
    name: String,
    words: Vec<Word>,
}

impl FactPart {
    pub fn new(name: impl Into<String>, words: Vec<Word>) -> Self {
        Self {
            name: name.into(),
            words,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn words_mut(&mut self) -> &mut Vec<Word> {
        &mut self.words
    }

    pub fn text(&self) -> String {
        join_words(&self.words)
    }
}

/// A structured statement decoded from a fact document.
///
/// Identity is content based: equality, ordering and hashing only look at the parts,
/// never at [`Fact::origin`]. The same statement decoded from two documents (or read
/// back from two index entries) is one fact.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Fact {
    parts: Vec<FactPart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    origin: Option<PathBuf>,
}

impl Fact {
    /// Builds a fact, putting `parts` into canonical order.
    pub fn new(mut parts: Vec<FactPart>) -> Self {
        parts.sort_by(|a, b| part_order(&a.name, &b.name));
        Self {
            parts,
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<PathBuf>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// The document this fact was decoded from, if known.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    pub fn parts(&self) -> &[FactPart] {
        &self.parts
    }

    pub fn parts_mut(&mut self) -> impl Iterator<Item = &mut FactPart> {
        self.parts.iter_mut()
    }

    pub fn part(&self, name: &str) -> Option<&FactPart> {
        self.parts.iter().find(|part| part.name == name)
    }

    /// All words of all parts, in part order. Repeated words are kept.
    pub fn words(&self) -> Vec<Word> {
        self.parts
            .iter()
            .flat_map(|part| part.words.iter().cloned())
            .collect()
    }

    pub fn distinct_words(&self) -> BTreeSet<Word> {
        self.parts
            .iter()
            .flat_map(|part| part.words.iter().cloned())
            .collect()
    }

    /// Plain-text rendering, e.g. `the cat likes milk`.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            if part.words.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&join_words(&part.words));
        }
        out
    }
}

impl PartialEq for Fact {
    fn eq(&self, other: &Self) -> bool {
        self.parts == other.parts
    }
}

impl Eq for Fact {}

impl PartialOrd for Fact {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fact {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts.cmp(&other.parts)
    }
}

impl Hash for Fact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parts.hash(state);
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

fn join_words(words: &[Word]) -> String {
    let mut out = String::new();
    for (idx, word) in words.iter().enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        out.push_str(word.as_str());
    }
    out
}
