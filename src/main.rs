//! threadfin CLI binary.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use env_logger::Builder;
use log::{LevelFilter, info};

use threadfin::autocomplete::SuggestionTrie;
use threadfin::error::Result;
use threadfin::search::{EngineConfig, SearchEngine, SearchFilters};
use threadfin::store::{Document, DocumentStore, MemoryStore};

#[derive(Parser)]
#[command(name = "threadfin", version, about = "Search engine for forum posts")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the index and autocomplete vocabulary from a document dump
    Index(IndexArgs),
    /// Query a built index
    Search(SearchArgs),
    /// Prefix completions from the autocomplete vocabulary
    Suggest(SuggestArgs),
}

#[derive(Args)]
struct IndexArgs {
    /// JSON file holding an array of documents
    #[arg(long)]
    docs: PathBuf,

    /// Directory to write index.json and trie.json into
    #[arg(long, default_value = "data")]
    out: PathBuf,
}

#[derive(Args)]
struct SearchArgs {
    /// Directory holding index.json
    #[arg(long, default_value = "data")]
    index_dir: PathBuf,

    /// JSON file holding the document metadata
    #[arg(long)]
    docs: PathBuf,

    /// The query text
    query: String,

    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Results per page
    #[arg(long, default_value_t = 10)]
    page_size: usize,

    /// Restrict results to one community
    #[arg(long)]
    subreddit: Option<String>,

    /// Restrict results to one author
    #[arg(long)]
    author: Option<String>,
}

#[derive(Args)]
struct SuggestArgs {
    /// Directory holding trie.json
    #[arg(long, default_value = "data")]
    index_dir: PathBuf,

    /// The prefix to complete
    prefix: String,

    /// Maximum number of suggestions
    #[arg(long, default_value_t = 10)]
    limit: usize,
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    Builder::new()
        .filter_level(log_level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Index(args) => run_index(args),
        Command::Search(args) => run_search(args),
        Command::Suggest(args) => run_suggest(args),
    }
}

fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

fn build_engine(docs: Vec<Document>) -> Result<(SearchEngine, Arc<MemoryStore>)> {
    let store = Arc::new(MemoryStore::new());
    for doc in docs {
        store.insert(doc)?;
    }
    let engine = SearchEngine::new(store.clone(), EngineConfig::default())?;
    Ok((engine, store))
}

fn run_index(args: IndexArgs) -> Result<()> {
    let docs = load_documents(&args.docs)?;
    info!("indexing {} documents", docs.len());

    let (engine, store) = build_engine(docs)?;
    for id in store.ids() {
        if let Some(doc) = store.get(&id) {
            engine.index_document(&doc.id, &doc.title, &doc.content);
        }
    }

    engine.save_index_to(&args.out.join("index.json"))?;

    let mut trie = SuggestionTrie::new();
    for (term, document_frequency) in engine.vocabulary() {
        trie.add_term(&term, document_frequency as u64);
    }
    trie.save(&args.out.join("trie.json"))?;

    info!(
        "wrote {} documents, {} vocabulary terms to {}",
        engine.indexed_documents(),
        trie.len(),
        args.out.display()
    );
    Ok(())
}

fn run_search(args: SearchArgs) -> Result<()> {
    let docs = load_documents(&args.docs)?;
    let (engine, _store) = build_engine(docs)?;
    engine.load_index_from(&args.index_dir.join("index.json"))?;

    let filters = SearchFilters {
        subreddit: args.subreddit,
        author: args.author,
    };
    let results = engine.process_query(&args.query, args.page, args.page_size, &filters)?;

    println!(
        "{} results for {:?} (page {}/{}, {} ms)",
        results.total_count,
        results.query,
        results.page,
        results.total_count.div_ceil(results.page_size.max(1)).max(1),
        results.query_time_ms
    );
    for hit in &results.results {
        println!();
        println!("  [{:.4}] {} ({})", hit.score, hit.title, hit.doc_id);
        println!("  r/{} by {}", hit.subreddit, hit.author);
        println!("  {}", hit.snippet);
    }
    Ok(())
}

fn run_suggest(args: SuggestArgs) -> Result<()> {
    let trie = SuggestionTrie::load(&args.index_dir.join("trie.json"))?;

    for suggestion in trie.suggestions(&args.prefix, args.limit) {
        println!(
            "{}\t(freq {}, queries {})",
            suggestion.term, suggestion.frequency, suggestion.query_count
        );
    }
    Ok(())
}
