use sage_core::Word;
use std::fmt;
use std::path::{Path, PathBuf};

/// Longest word (in bytes) used verbatim as a shard key.
pub const MAX_VERBATIM_KEY_LEN: usize = 64;

const HASHED_KEY_PREFIX: char = '_';
const HASHED_KEY_HEX_LEN: usize = 32;

/// Stable partition identifier for a [`Word`].
///
/// Plain words (Unicode alphanumerics plus `_`/`-`, starting with an alphanumeric,
/// at most [`MAX_VERBATIM_KEY_LEN`] bytes) are their own key, so `index/cat/` holds
/// the facts mentioning "cat". Anything else (punctuation, path separators, very
/// long tokens, Windows device names) maps to `_` followed by a BLAKE3 hex prefix
/// of the word. Verbatim keys never start with `_`, so the two forms cannot collide.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShardKey(String);

impl ShardKey {
    pub fn for_word(word: &Word) -> Self {
        let word = word.as_str();
        if is_verbatim_key(word) {
            return Self(word.to_string());
        }

        let hash = blake3::hash(word.as_bytes());
        let hex = hash.to_hex();
        let mut key = String::with_capacity(1 + HASHED_KEY_HEX_LEN);
        key.push(HASHED_KEY_PREFIX);
        key.push_str(&hex.as_str()[..HASHED_KEY_HEX_LEN]);
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_hashed(&self) -> bool {
        self.0.starts_with(HASHED_KEY_PREFIX)
    }
}

impl fmt::Display for ShardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_verbatim_key(word: &str) -> bool {
    if word.is_empty() || word.len() > MAX_VERBATIM_KEY_LEN {
        return false;
    }
    let mut chars = word.chars();
    let starts_alphanumeric = chars.next().is_some_and(char::is_alphanumeric);
    starts_alphanumeric
        && chars.all(|ch| ch.is_alphanumeric() || ch == '_' || ch == '-')
        && !is_reserved_device_name(word)
}

/// `con`, `prn`, `aux`, `nul`, `com1`-`com9` and `lpt1`-`lpt9` cannot name a
/// directory on Windows.
fn is_reserved_device_name(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    match lower.as_str() {
        "con" | "prn" | "aux" | "nul" => true,
        _ => match lower.as_bytes() {
            [b'c', b'o', b'm', digit] | [b'l', b'p', b't', digit] => {
                (b'1'..=b'9').contains(digit)
            }
            _ => false,
        },
    }
}

/// Path of a shard under `index_root`.
///
/// Without `origin` this is the shard's directory, which aggregates the entries of
/// every origin document. With `origin` (a bare file name) it is the single entry
/// holding that document's facts.
pub fn shard_path(index_root: &Path, key: &ShardKey, origin: Option<&str>) -> PathBuf {
    let dir = index_root.join(key.as_str());
    match origin {
        Some(origin) => dir.join(origin),
        None => dir,
    }
}
