//! askweb CLI - search the web and answer with cited sources
//!
//! # Commands
//!
//! ```bash
//! # Search, scrape, index and answer
//! askweb ask -q "What is new in the latest Rust release?" -d 30
//!
//! # Chunk a document and show results
//! askweb chunk --size 200 --overlap 20 input.txt
//!
//! # Index local files and search them, without an answer model
//! askweb local "who scored" notes.txt report.txt
//! ```

use std::fs;
use std::time::Duration;

use anyhow::{Context, Result};
use askweb_lib::{
    chunk::{Chunker, Document, FixedSizeChunker, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE},
    config::{Config, QueryOptions, DEFAULT_CONCURRENCY, DEFAULT_MODEL},
    embed::{BgeEmbedder, Embedder},
    generate::OpenAiGenerator,
    index::EmbeddingIndex,
    pipeline::{ask, Collaborators, Pipeline},
    retrieve::DEFAULT_TOP_N,
    store::{MemoryStore, Similarity},
    web::{GoogleSearch, HttpExtractor},
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "askweb")]
#[command(about = "Search the web for a query and summarize the results with citations")]
#[command(version)]
struct Cli {
    /// Logging level (overridden by RUST_LOG)
    #[arg(short, long, global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Search the web, index the results and answer with references
    Ask(AskArgs),

    /// Chunk a document and show the fragments
    Chunk {
        /// Input file to chunk
        input: String,

        /// Chunk size in characters
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        size: usize,

        /// Characters shared by consecutive chunks
        #[arg(long, default_value_t = DEFAULT_CHUNK_OVERLAP)]
        overlap: usize,
    },

    /// Index local text files and search them (no answer model)
    Local {
        /// Query to search for
        query: String,

        /// Files to index; each path is its own source
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Number of results to return
        #[arg(short, long, default_value_t = DEFAULT_TOP_N)]
        k: usize,

        #[command(flatten)]
        index: IndexArgs,
    },
}

#[derive(Args)]
struct AskArgs {
    /// Query to search
    #[arg(short, long)]
    query: String,

    /// Restrict search results to the last N days (0 = no restriction)
    #[arg(short, long)]
    date_restrict: Option<u32>,

    /// Restrict search results to a specific site
    #[arg(short = 's', long)]
    target_site: Option<String>,

    /// Model name to use for inference
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    model_name: String,

    /// Number of chunks handed to the model
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top_n: usize,

    #[command(flatten)]
    index: IndexArgs,

    /// Search API key
    #[arg(long, env = "SEARCH_API_KEY", hide_env_values = true)]
    search_api_key: Option<String>,

    /// Search engine (project) id
    #[arg(long, env = "SEARCH_PROJECT_KEY", hide_env_values = true)]
    search_project_key: Option<String>,

    /// API key for the answer model
    #[arg(long, env = "LLM_API_KEY", hide_env_values = true)]
    llm_api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "LLM_BASE_URL")]
    llm_base_url: Option<String>,
}

#[derive(Args)]
struct IndexArgs {
    /// Chunk size in characters
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Characters shared by consecutive chunks
    #[arg(long, default_value_t = DEFAULT_CHUNK_OVERLAP)]
    chunk_overlap: usize,

    /// Documents fetched and embedded in parallel
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Seconds allowed to chunk and embed one document
    #[arg(long, default_value_t = 30)]
    document_timeout: u64,

    /// Similarity used for ranking: cosine, dot or euclidean
    #[arg(long, default_value_t = Similarity::Cosine)]
    similarity: Similarity,
}

impl IndexArgs {
    fn options(&self, top_n: usize) -> QueryOptions {
        QueryOptions {
            top_n,
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            concurrency: self.concurrency,
            document_timeout: Duration::from_secs(self.document_timeout),
            ..QueryOptions::default()
        }
    }

    fn index<E: Embedder>(&self, embedder: E) -> EmbeddingIndex<E> {
        EmbeddingIndex::new(embedder, MemoryStore::with_similarity(self.similarity))
    }
}

fn load_embedder() -> Result<BgeEmbedder> {
    info!("loading BGE model (first run downloads ~130MB)");
    Ok(BgeEmbedder::new()?)
}

async fn run_ask(args: AskArgs) -> Result<()> {
    let config = Config::new(
        args.search_api_key,
        args.search_project_key,
        args.llm_api_key,
        args.llm_base_url,
    )?;
    let options = QueryOptions {
        date_restrict: args.date_restrict,
        target_site: args.target_site,
        model_name: args.model_name,
        ..args.index.options(args.top_n)
    };
    options.validate()?;

    let search = GoogleSearch::new(&config)?;
    let extractor = HttpExtractor::new(options.concurrency)?;
    let generator = OpenAiGenerator::new(&config, options.model_name.clone())?;
    let index = args.index.index(load_embedder()?);

    let outcome = ask(
        &args.query,
        &options,
        index,
        Collaborators {
            search: &search,
            extractor: &extractor,
            generator: &generator,
        },
    )
    .await?;

    for skipped in &outcome.report.skipped {
        warn!(source = %skipped.source_id, reason = %skipped.reason, "source skipped");
    }
    info!("finished inference, generating output");
    print!("{}", outcome.answer);
    Ok(())
}

fn run_chunk(input: &str, size: usize, overlap: usize) -> Result<()> {
    let chunker = FixedSizeChunker::new(size, overlap)?;
    let text = fs::read_to_string(input).with_context(|| format!("failed to read {input}"))?;
    let chunks = chunker.chunk(&Document::new(input, text));

    println!(
        "Chunked '{}' into {} chunks using {} strategy:\n",
        input,
        chunks.len(),
        chunker.name()
    );
    for chunk in &chunks {
        println!(
            "--- Chunk {} (offset {}, {} chars) ---",
            chunk.index + 1,
            chunk.offset,
            chunk.content.chars().count()
        );
        // Show preview (first 200 chars)
        let preview: String = chunk.content.chars().take(200).collect();
        let ellipsis = if chunk.content.chars().count() > 200 { "..." } else { "" };
        println!("{preview}{ellipsis}\n");
    }
    Ok(())
}

async fn run_local(query: &str, inputs: &[String], k: usize, args: &IndexArgs) -> Result<()> {
    let options = args.options(k);
    let mut pipeline = Pipeline::new(args.index(load_embedder()?), &options)?;

    let mut documents = Vec::with_capacity(inputs.len());
    for input in inputs {
        let text = fs::read_to_string(input).with_context(|| format!("failed to read {input}"))?;
        documents.push(Document::new(input.as_str(), text));
    }

    let report = pipeline.ingest(documents).await?;
    for skipped in &report.skipped {
        warn!(source = %skipped.source_id, reason = %skipped.reason, "source skipped");
    }
    println!(
        "Indexed {} chunks from {} files\n",
        report.chunks(),
        report.ingested.len()
    );

    let results = pipeline.retrieve(query)?;
    println!("=== Results for '{query}' ===\n");
    for (i, result) in results.iter().enumerate() {
        println!(
            "[{}] {} #{} (score: {:.4})",
            i + 1,
            result.chunk.source_id,
            result.chunk.index,
            result.score
        );
        println!("---");
        let preview: String = result.chunk.content.chars().take(300).collect();
        let ellipsis = if result.chunk.content.chars().count() > 300 { "..." } else { "" };
        println!("{preview}{ellipsis}\n");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Ask(args) => run_ask(args).await?,
        Commands::Chunk {
            input,
            size,
            overlap,
        } => run_chunk(&input, size, overlap)?,
        Commands::Local {
            query,
            inputs,
            k,
            index,
        } => run_local(&query, &inputs, k, &index).await?,
    }

    Ok(())
}
