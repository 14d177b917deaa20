use super::{Fixture, FAMILY, PETS};
use sage_cache::CacheError;
use sage_core::{FactError, Word};
use sage_index::{IndexError, RebuildReport};
use std::collections::BTreeSet;

fn shard_names(fx: &Fixture) -> BTreeSet<String> {
    std::fs::read_dir(fx.index.index_root())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect()
}

#[test]
fn every_word_gets_an_entry_for_the_document() {
    let fx = Fixture::new();
    fx.write_document("family.xml", FAMILY);
    fx.index.update_cache().unwrap();

    let expected: BTreeSet<String> = ["the", "cat", "likes", "milk", "dog", "bones"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(shard_names(&fx), expected);
    for shard in &expected {
        assert!(fx.entry_path(shard, "family.xml").is_file(), "{shard}");
    }
}

#[test]
fn entry_holds_the_facts_containing_its_word() {
    let fx = Fixture::new();
    fx.write_document("family.xml", FAMILY);
    fx.index.update_cache().unwrap();

    let cat = std::fs::read_to_string(fx.entry_path("cat", "family.xml")).unwrap();
    assert_eq!(
        cat,
        "<fact>\n  <subject>the cat</subject>\n  <verb>likes</verb>\n  <object>milk</object>\n</fact>\n"
    );

    let likes = std::fs::read_to_string(fx.entry_path("likes", "family.xml")).unwrap();
    assert_eq!(likes.matches("<fact>").count(), 2);
    assert!(likes.find("the cat").unwrap() < likes.find("the dog").unwrap());
}

#[test]
fn every_decoded_fact_is_found_by_each_of_its_words() {
    let fx = Fixture::new();
    fx.write_document("family.xml", FAMILY);
    fx.write_document("pets.xml", PETS);
    fx.index.update_cache().unwrap();

    for (fact_text, words) in [
        ("the cat likes milk", ["the", "cat", "likes", "milk"]),
        ("the dog likes bones", ["the", "dog", "likes", "bones"]),
        ("a hamster likes seeds", ["a", "hamster", "likes", "seeds"]),
    ] {
        for word in words {
            assert!(
                fx.find(word).iter().any(|text| text == fact_text),
                "{fact_text} not found by {word}"
            );
        }
    }
}

#[test]
fn rebuilding_twice_leaves_identical_entries() {
    let fx = Fixture::new();
    fx.write_document("family.xml", FAMILY);
    fx.write_document("pets.xml", PETS);

    fx.index.update_cache().unwrap();
    let first = fx.snapshot();
    fx.index.update_cache().unwrap();
    assert_eq!(fx.snapshot(), first);
}

#[test]
fn rebuild_replaces_entries_of_an_edited_document() {
    let fx = Fixture::new();
    fx.write_document("family.xml", FAMILY);
    fx.index.update_cache().unwrap();
    assert_eq!(fx.find("milk"), ["the cat likes milk"]);

    fx.write_document(
        "family.xml",
        "<fact><subject>the cat</subject><verb>likes</verb><object>cream</object></fact>",
    );
    fx.index.update_cache_path("family.xml").unwrap();

    let cat = std::fs::read_to_string(fx.entry_path("cat", "family.xml")).unwrap();
    assert!(cat.contains("cream"));
    assert!(!cat.contains("milk"));
    assert_eq!(fx.find("cat"), ["the cat likes cream"]);
    assert_eq!(fx.find("cream"), ["the cat likes cream"]);
}

#[test]
fn directory_rebuild_does_not_descend_into_subdirectories() {
    let fx = Fixture::new();
    fx.write_document("family.xml", FAMILY);
    fx.write_document(
        "nested/deep.xml",
        "<fact><subject>the owl</subject><verb>hoots</verb></fact>",
    );

    let report = fx.index.update_cache().unwrap();
    assert_eq!(report.documents, [fx.language_dir().join("family.xml")]);
    assert!(fx.find("owl").is_empty());

    // Naming the nested directory rebuilds its documents.
    fx.index.update_cache_path("nested").unwrap();
    assert_eq!(fx.find("owl"), ["the owl hoots"]);
}

#[test]
fn relative_and_absolute_targets_are_equivalent() {
    let relative = Fixture::new();
    relative.write_document("family.xml", FAMILY);
    let report = relative.index.update_cache_path("family.xml").unwrap();
    assert_eq!(report.documents, [relative.language_dir().join("family.xml")]);

    let absolute = Fixture::new();
    let path = absolute.write_document("family.xml", FAMILY);
    absolute.index.update_cache_path(&path).unwrap();

    assert_eq!(relative.find("likes"), absolute.find("likes"));
}

#[test]
fn files_without_the_document_extension_are_skipped() {
    let fx = Fixture::new();
    fx.write_document("family.xml", FAMILY);
    fx.write_document("README.txt", "not a fact document");
    fx.write_document("family.xml.bak", "<fact><subject>stale</subject></fact>");

    let report = fx.index.update_cache().unwrap();
    assert!(report.is_clean());
    assert_eq!(report.documents.len(), 1);
    assert!(fx.find("stale").is_empty());
}

#[test]
fn malformed_document_in_a_directory_is_reported_and_siblings_indexed() {
    let fx = Fixture::new();
    let broken = fx.write_document("broken.xml", "<fact><subject>cat</fact>");
    fx.write_document("family.xml", FAMILY);

    let report = fx.index.update_cache().unwrap();
    assert!(!report.is_clean());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, broken);
    assert!(report.failures[0].error.contains("broken.xml"));
    assert_eq!(report.documents, [fx.language_dir().join("family.xml")]);
    assert_eq!(fx.find("cat"), ["the cat likes milk"]);
}

#[test]
fn document_that_is_not_utf8_is_reported_and_siblings_indexed() {
    let fx = Fixture::new();
    // Sorts before family.xml, so the rebuild has to keep going past it.
    let latin1 = fx.language_dir().join("latin1.xml");
    std::fs::write(&latin1, b"<fact><subject>caf\xE9</subject></fact>").unwrap();
    fx.write_document("family.xml", FAMILY);

    let report = fx.index.update_cache().unwrap();
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, latin1);
    assert_eq!(report.documents, [fx.language_dir().join("family.xml")]);
    assert_eq!(fx.find("cat"), ["the cat likes milk"]);

    let err = fx.index.update_cache_path("latin1.xml").unwrap_err();
    assert!(
        matches!(
            &err,
            IndexError::Decode {
                source: FactError::Encoding(_),
                ..
            }
        ),
        "{err}"
    );
}

#[test]
fn single_target_without_the_document_extension_is_skipped() {
    let fx = Fixture::new();
    fx.write_document("family.txt", FAMILY);

    let report = fx.index.update_cache_path("family.txt").unwrap();
    assert_eq!(report, RebuildReport::default());
    assert!(fx.snapshot().is_empty());
    assert!(fx.find("cat").is_empty());
}

#[test]
fn malformed_single_document_is_an_error() {
    let fx = Fixture::new();
    let broken = fx.write_document("broken.xml", "cat likes milk");

    let err = fx.index.update_cache_path("broken.xml").unwrap_err();
    assert!(
        matches!(&err, IndexError::Decode { path, .. } if *path == broken),
        "{err}"
    );
    assert!(fx.snapshot().is_empty());
}

#[test]
fn missing_target_is_an_empty_rebuild() {
    let fx = Fixture::new();
    let report = fx.index.update_cache_path("missing.xml").unwrap();
    assert_eq!(report, RebuildReport::default());
    assert!(fx.snapshot().is_empty());
}

#[test]
fn report_counts_documents_facts_and_entries() {
    let fx = Fixture::new();
    fx.write_document("family.xml", FAMILY);

    let report = fx.index.update_cache().unwrap();
    assert_eq!(report.documents.len(), 1);
    assert_eq!(report.facts, 2);
    assert_eq!(report.entries_written, 6);
    assert!(report.is_clean());

    fx.write_document("pets.xml", PETS);
    let report = fx.index.update_cache().unwrap();
    assert_eq!(report.documents.len(), 2);
    assert_eq!(report.facts, 3);
    // a, hamster, likes, seeds
    assert_eq!(report.entries_written, 10);
}

#[test]
fn documents_sharing_a_word_keep_separate_entries() {
    let fx = Fixture::new();
    fx.write_document("family.xml", FAMILY);
    fx.write_document("pets.xml", PETS);
    fx.index.update_cache().unwrap();

    let family = std::fs::read_to_string(fx.entry_path("likes", "family.xml")).unwrap();
    let pets = std::fs::read_to_string(fx.entry_path("likes", "pets.xml")).unwrap();
    assert!(!family.contains("hamster"));
    assert!(pets.contains("hamster"));
    assert!(!pets.contains("the cat"));

    // Rebuilding one document leaves the other's entries alone.
    fx.write_document(
        "pets.xml",
        "<fact><subject>a hamster</subject><verb>likes</verb><object>nuts</object></fact>",
    );
    fx.index.update_cache_path("pets.xml").unwrap();
    assert_eq!(
        std::fs::read_to_string(fx.entry_path("likes", "family.xml")).unwrap(),
        family
    );
    assert_eq!(fx.find("nuts"), ["a hamster likes nuts"]);
}

#[test]
fn unsafe_words_land_in_hashed_shards() {
    let fx = Fixture::new();
    fx.write_document(
        "paths.xml",
        "<fact><subject>../etc</subject><verb>is</verb><object>a/path</object></fact>",
    );
    fx.index.update_cache().unwrap();

    for shard in shard_names(&fx) {
        assert!(!shard.contains('/') && !shard.contains(".."), "{shard}");
    }
    let found = fx
        .index
        .find_facts_by_word(&Word::new("a/path"))
        .unwrap();
    assert_eq!(found.len(), 1);
}

#[test]
fn write_failure_aborts_the_rebuild() {
    let fx = Fixture::new();
    fx.write_document("family.xml", FAMILY);
    let cache = fx.index.storage().cache_dir();
    std::fs::write(cache.join("database"), b"blocking file").unwrap();

    let err = fx.index.update_cache().unwrap_err();
    assert!(
        matches!(err, IndexError::Cache(CacheError::Io(_))),
        "{err:?}"
    );
}
