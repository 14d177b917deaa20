use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized token.
///
/// Normalization lower-cases the input, strips surrounding punctuation and drops
/// any whitespace. Two spellings that normalize to the same string are the same
/// word, both for fact identity and for shard lookup.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Word(String);

impl Word {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize(raw.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if nothing was left after normalization (e.g. `"?!"`).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Word {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Word {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<Word> for String {
    fn from(word: Word) -> Self {
        word.0
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Splits `text` on whitespace into normalized, non-empty words.
pub fn tokenize(text: &str) -> Vec<Word> {
    text.split_whitespace()
        .map(Word::new)
        .filter(|word| !word.is_empty())
        .collect()
}

fn normalize(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches(is_edge_punctuation);
    let mut out = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        if ch.is_whitespace() {
            continue;
        }
        out.extend(ch.to_lowercase());
    }
    out
}

fn is_edge_punctuation(ch: char) -> bool {
    matches!(
        ch,
        '.' | ',' | ';' | ':' | '!' | '?' | '"' | '\'' | '(' | ')' | '[' | ']' | '{' | '}'
    )
}
