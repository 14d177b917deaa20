mod rebuild;

use sage_cache::StandardStorage;
use sage_core::{tokenize, Fact, FactPart, Word, XmlFactCodec};
use sage_index::{DiskIndex, Language};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use tempfile::TempDir;

pub(crate) const FAMILY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<fact>
  <subject>the cat</subject>
  <verb>likes</verb>
  <object>milk</object>
</fact>
<fact>
  <verb>likes</verb>
  <subject>the dog</subject>
  <object>bones</object>
</fact>
"#;

pub(crate) const PETS: &str = r#"<facts>
  <fact><subject>a hamster</subject><verb>likes</verb><object>seeds</object></fact>
</facts>
"#;

pub(crate) struct Fixture {
    // Keeps the storage root alive for the duration of the test.
    _tmp: TempDir,
    pub(crate) index: DiskIndex,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Self::with_language(Language::plain())
    }

    pub(crate) fn with_language(language: Language) -> Self {
        init_tracing();
        let tmp = tempfile::tempdir().unwrap();
        let storage = StandardStorage::new(tmp.path().join("sage"), "en").unwrap();
        let index = DiskIndex::new(storage, Arc::new(XmlFactCodec), language);
        Self { _tmp: tmp, index }
    }

    pub(crate) fn language_dir(&self) -> PathBuf {
        self.index.storage().language_dir()
    }

    /// Writes a source document relative to the language directory.
    pub(crate) fn write_document(&self, rel: &str, text: &str) -> PathBuf {
        let path = self.language_dir().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, text).unwrap();
        path
    }

    pub(crate) fn entry_path(&self, shard: &str, origin: &str) -> PathBuf {
        self.index.index_root().join(shard).join(origin)
    }

    /// Every file below the index root with its bytes.
    pub(crate) fn snapshot(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        let mut files = BTreeMap::new();
        collect_files(&self.index.index_root(), &mut files);
        files
    }

    pub(crate) fn find(&self, word: &str) -> Vec<String> {
        texts(&self.index.find_facts_by_word(&Word::new(word)).unwrap())
    }
}

fn collect_files(dir: &Path, out: &mut BTreeMap<PathBuf, Vec<u8>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect_files(&path, out);
        } else {
            let bytes = std::fs::read(&path).unwrap();
            out.insert(path, bytes);
        }
    }
}

pub(crate) fn texts(facts: &BTreeSet<Fact>) -> Vec<String> {
    facts.iter().map(Fact::text).collect()
}

pub(crate) fn words(raw: &[&str]) -> Vec<Word> {
    raw.iter().map(|word| Word::new(word)).collect()
}

pub(crate) fn fact(subject: &str, verb: &str, object: &str) -> Fact {
    Fact::new(vec![
        FactPart::new("subject", tokenize(subject)),
        FactPart::new("verb", tokenize(verb)),
        FactPart::new("object", tokenize(object)),
    ])
}

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
