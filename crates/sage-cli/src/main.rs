use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use sage_cache::StandardStorage;
use sage_config::SageConfig;
use sage_core::{tokenize, Fact, FactCodec, Word, XmlFactCodec};
use sage_index::{
    DiskIndex, IndexStatus, IndexedSynonyms, Language, RebuildReport, SynonymTable,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "sage", version, about = "Sage fact index (rebuild, query, cache)")]
struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Storage root (overrides SAGE_DATA_DIR and `storage.root`)
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// Language code selecting `lang_<code>/` and `cache_<code>/`
    #[arg(long, global = true)]
    lang: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild index entries for the language directory or one target in it
    Update(UpdateArgs),
    /// Facts containing any of the given words
    Find(FindArgs),
    /// Facts sharing a word with a pattern fact, after synonym expansion
    Query(QueryArgs),
    /// Inspect or clear the index
    Cache(CacheArgs),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Update(_) => "update",
            Command::Find(_) => "find",
            Command::Query(_) => "query",
            Command::Cache(args) => match args.command {
                CacheCommand::Status => "cache status",
                CacheCommand::Clean => "cache clean",
            },
        }
    }
}

#[derive(Args)]
struct UpdateArgs {
    /// Document or directory, relative to the language directory unless absolute
    path: Option<PathBuf>,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct FindArgs {
    #[arg(required = true)]
    words: Vec<String>,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct QueryArgs {
    /// A single `<fact>` element
    fact: String,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CacheArgs {
    #[command(subcommand)]
    command: CacheCommand,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum CacheCommand {
    Status,
    Clean,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let config = match &cli.config {
        Some(path) => SageConfig::load_from_path(path)?,
        None => SageConfig::default(),
    };
    sage_config::init_tracing(&config.logging);

    let index = open_index(&cli, &config)?;
    tracing::info!(
        target: "sage.cli",
        command = cli.command.name(),
        root = %index.storage().root().display(),
        language = index.storage().language(),
        "running command"
    );

    match cli.command {
        Command::Update(args) => {
            let report = match &args.path {
                Some(path) => index.update_cache_path(path)?,
                None => index.update_cache()?,
            };
            print_output(&report, args.json)?;
            if !report.is_clean() {
                tracing::warn!(
                    target: "sage.cli",
                    failures = report.failures.len(),
                    "update finished with document failures"
                );
            }
            Ok(if report.is_clean() { 0 } else { 1 })
        }
        Command::Find(args) => {
            let words: Vec<Word> = args.words.iter().flat_map(|raw| tokenize(raw)).collect();
            let facts = index.find_facts_by_words(&words)?;
            print_facts(&facts, args.json)?;
            Ok(0)
        }
        Command::Query(args) => {
            let pattern = parse_pattern(&args.fact)?;
            let facts = index.find_facts(pattern)?;
            print_facts(&facts, args.json)?;
            Ok(0)
        }
        Command::Cache(args) => {
            match args.command {
                CacheCommand::Status => {
                    let status = index.status()?;
                    print_output(&status, args.json)?;
                }
                CacheCommand::Clean => {
                    index.clear()?;
                    if !args.json {
                        println!("index: cleaned {}", index.index_root().display());
                    } else {
                        print_output(&serde_json::json!({ "ok": true }), true)?;
                    }
                }
            }
            Ok(0)
        }
    }
}

fn open_index(cli: &Cli, config: &SageConfig) -> Result<DiskIndex> {
    let root = match &cli.root {
        Some(root) => root.clone(),
        None => config.storage.data_root()?,
    };
    let language = cli.lang.as_deref().unwrap_or(&config.storage.language);
    let storage = StandardStorage::new(&root, language)
        .with_context(|| format!("failed to open storage at {}", root.display()))?;

    Ok(DiskIndex::new(
        storage,
        Arc::new(XmlFactCodec),
        query_language(config),
    ))
}

fn query_language(config: &SageConfig) -> Language {
    if config.query.synonyms_from_index {
        return Language::plain().with_synonyms(Arc::new(IndexedSynonyms));
    }
    if config.synonyms.is_empty() {
        return Language::plain();
    }

    let table: SynonymTable = config
        .synonyms
        .iter()
        .map(|(word, synonyms)| {
            let synonyms: Vec<Word> = synonyms.iter().map(Word::new).collect();
            (Word::new(word), synonyms)
        })
        .collect();
    Language::plain().with_synonyms(Arc::new(table))
}

fn parse_pattern(text: &str) -> Result<Fact> {
    let codec = XmlFactCodec;
    let canonical = codec.canonicalize(text).context("invalid pattern fact")?;
    let mut facts = codec
        .decode(&canonical, None)
        .context("invalid pattern fact")?;
    if facts.len() != 1 {
        bail!(
            "expected exactly one <fact> element in the pattern, found {}",
            facts.len()
        );
    }
    Ok(facts.remove(0))
}

#[derive(Serialize)]
struct FactsEnvelope<'a> {
    count: usize,
    facts: Vec<FactOutput<'a>>,
}

#[derive(Serialize)]
struct FactOutput<'a> {
    text: String,
    #[serde(flatten)]
    fact: &'a Fact,
}

fn print_facts(facts: &BTreeSet<Fact>, json: bool) -> Result<()> {
    if json {
        let envelope = FactsEnvelope {
            count: facts.len(),
            facts: facts
                .iter()
                .map(|fact| FactOutput {
                    text: fact.text(),
                    fact,
                })
                .collect(),
        };
        let out = serde_json::to_string_pretty(&envelope)?;
        println!("{out}");
        return Ok(());
    }

    for fact in facts {
        println!("{fact}");
    }
    Ok(())
}

fn print_output<T: Serialize + 'static>(value: &T, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(value)?;
        println!("{out}");
        return Ok(());
    }

    // Human output for key types. Everything else falls back to pretty JSON.
    let any = value as &dyn std::any::Any;
    if let Some(report) = any.downcast_ref::<RebuildReport>() {
        println!(
            "updated: {} documents, {} facts, {} entries",
            report.documents.len(),
            report.facts,
            report.entries_written
        );
        for failure in &report.failures {
            println!("failed: {}", failure.error);
        }
    } else if let Some(status) = any.downcast_ref::<IndexStatus>() {
        println!("index:");
        println!("  dir: {}", status.index_root.display());
        println!("  shards: {}", status.shards);
        println!("  entries: {}", status.entries);
        println!("  bytes: {}", status.size_bytes);
    } else {
        let out = serde_json::to_string_pretty(value)?;
        println!("{out}");
    }
    Ok(())
}
