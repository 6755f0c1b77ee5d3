// ============================================================================
// memgraph - CLI for extracting, storing and querying chat memory
// ============================================================================
// Usage:
//   memgraph extract messages.json          Triplets + graph for a chat log
//   memgraph summary messages.json          Per-author / predicate / subject stats
//   memgraph ingest messages.json           Extract and persist into memory
//   memgraph add --author Ali --text "..."  Ingest a single message
//   memgraph query --predicate like         Filter stored triplets
//   memgraph ask "Ayşe ne dedi?"            Answer a question from memory
//   memgraph update <id> --object Axum      Patch a stored triplet
//   memgraph delete <id>                    Remove a stored triplet
//   memgraph stats                          Summarize stored memory
//   memgraph graph                          Stored memory as graph edges
//   memgraph backfill-ids                   Assign ids to legacy records
//   memgraph export                         Dump stored triplets as JSON
// ============================================================================

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use memgraph_core::{
    aggregate, ingest, migrate, qa, query, AuthoredTriplet, BackendKind, ChatMessage, Filter,
    MemgraphConfig, MemoryStore, QueryResponse, TripletExtractor, TripletGraph, TripletPatch,
};
use tracing::debug;

/// Chat memory graph tool
#[derive(Parser)]
#[command(name = "memgraph", version, about = "Extract, store and query chat memory triplets")]
struct Cli {
    /// Path to the memory file (default: ~/.memgraph/memory.json)
    #[arg(long, global = true)]
    memory_path: Option<PathBuf>,

    /// Storage backend: json or redb (default: inferred from the file extension)
    #[arg(long, global = true)]
    backend: Option<BackendKind>,

    /// Translator rule file replacing the built-in keyword table
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract triplets and graph edges from a JSON array of messages
    Extract {
        /// File with [{"sender", "text", "timestamp"}, ...]
        messages: PathBuf,
    },

    /// Summarize the triplets in a JSON array of messages
    Summary {
        messages: PathBuf,

        /// Number of most common subjects to report
        #[arg(long)]
        top: Option<usize>,
    },

    /// Extract triplets from messages and store them
    Ingest { messages: PathBuf },

    /// Store the triplets from a single message
    Add {
        #[arg(long)]
        author: String,

        #[arg(long)]
        text: String,

        /// ISO-8601 timestamp (default: now)
        #[arg(long)]
        timestamp: Option<String>,
    },

    /// List stored triplets matching every given field (case-insensitive)
    Query {
        #[arg(long)]
        author: Option<String>,

        #[arg(long)]
        subject: Option<String>,

        #[arg(long)]
        predicate: Option<String>,

        #[arg(long)]
        object: Option<String>,

        /// Print {total_triplets, results} JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Answer a natural-language question from stored memory
    Ask {
        question: String,

        /// Also print the translated filter
        #[arg(long)]
        explain: bool,
    },

    /// Overwrite fields of a stored triplet
    Update {
        id: String,

        #[arg(long)]
        subject: Option<String>,

        #[arg(long)]
        predicate: Option<String>,

        #[arg(long)]
        object: Option<String>,

        #[arg(long)]
        timestamp: Option<String>,
    },

    /// Delete a stored triplet
    Delete { id: String },

    /// Show stored memory statistics
    Stats {
        #[arg(long)]
        top: Option<usize>,
    },

    /// Show stored memory as directed graph edges
    Graph {
        #[arg(long)]
        json: bool,
    },

    /// Assign ids to stored triplets that lack one
    BackfillIds,

    /// Export all stored triplets as JSON
    Export,
}

fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("memgraph_core=info".parse()?)
                .add_directive("memgraph_cli=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let mut config = MemgraphConfig::load()?;
    if let Some(path) = cli.memory_path {
        config = config.with_memory_path(path);
    }
    if let Some(backend) = cli.backend {
        config = config.with_backend(backend);
    }
    if let Some(rules) = cli.rules {
        config = config.with_rules_path(rules);
    }
    debug!("Using {} memory at {}", config.backend_kind(), config.memory_path.display());

    match cli.command {
        Commands::Extract { messages } => cmd_extract(&messages),
        Commands::Summary { messages, top } => {
            cmd_summary(&messages, top.unwrap_or(config.top_subjects))
        }
        Commands::Ingest { messages } => cmd_ingest(&config.open_store()?, &read_messages(&messages)?),
        Commands::Add {
            author,
            text,
            timestamp,
        } => {
            let message = match timestamp {
                Some(ts) => ChatMessage::new(author, text, ts),
                None => ChatMessage::now(author, text),
            };
            cmd_ingest(&config.open_store()?, &[message])
        }
        Commands::Query {
            author,
            subject,
            predicate,
            object,
            json,
        } => {
            let filter = Filter {
                author,
                subject,
                predicate,
                object,
                return_shape: None,
            };
            cmd_query(&config.open_store()?, &filter, json)
        }
        Commands::Ask { question, explain } => cmd_ask(&config, &question, explain),
        Commands::Update {
            id,
            subject,
            predicate,
            object,
            timestamp,
        } => {
            let patch = TripletPatch {
                subject,
                predicate,
                object,
                timestamp,
            };
            cmd_update(&config.open_store()?, &id, &patch)
        }
        Commands::Delete { id } => cmd_delete(&config.open_store()?, &id),
        Commands::Stats { top } => cmd_stats(&config.open_store()?, top.unwrap_or(config.top_subjects)),
        Commands::Graph { json } => cmd_graph(&config.open_store()?, json),
        Commands::BackfillIds => cmd_backfill(&config.open_store()?),
        Commands::Export => cmd_export(&config.open_store()?),
    }
}

fn read_messages(path: &Path) -> Result<Vec<ChatMessage>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    ingest::parse_messages(&json).with_context(|| format!("Invalid message file {}", path.display()))
}

fn load_flat(store: &MemoryStore) -> Result<Vec<AuthoredTriplet>> {
    Ok(store.load_or_empty()?.flatten())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_triplets(triplets: &[AuthoredTriplet]) {
    if triplets.is_empty() {
        println!("No triplets found.");
        return;
    }

    println!(
        "{:<36}  {:<12}  {:<16}  {:<12}  {}",
        "ID", "AUTHOR", "SUBJECT", "PREDICATE", "OBJECT"
    );
    println!("{}", "-".repeat(96));

    for t in triplets {
        println!(
            "{:<36}  {:<12}  {:<16}  {:<12}  {}",
            t.id().unwrap_or("-"),
            t.author,
            t.record.subject,
            t.record.predicate,
            t.record.object
        );
    }

    println!("\nTotal: {} triplets", triplets.len());
}

fn cmd_extract(messages: &Path) -> Result<()> {
    let response = ingest::extract(&TripletExtractor::new(), &read_messages(messages)?);
    print_json(&response)
}

fn cmd_summary(messages: &Path, top: usize) -> Result<()> {
    let summary = ingest::summary(&TripletExtractor::new(), &read_messages(messages)?, top);
    print_json(&summary)
}

fn cmd_ingest(store: &MemoryStore, messages: &[ChatMessage]) -> Result<()> {
    let stored = ingest::ingest(&TripletExtractor::new(), store, messages)?;
    print_triplets(&stored);
    println!("Memory: {}", store.describe());
    Ok(())
}

fn cmd_query(store: &MemoryStore, filter: &Filter, json: bool) -> Result<()> {
    let results = query::filter_triplets(&load_flat(store)?, filter);
    if json {
        return print_json(&QueryResponse::new(results));
    }
    print_triplets(&results);
    Ok(())
}

fn cmd_ask(config: &MemgraphConfig, question: &str, explain: bool) -> Result<()> {
    let translator = config.translator()?;
    let store = config.open_store()?;
    let answer = qa::answer(&load_flat(&store)?, &translator, question);

    if explain {
        println!("Filter: {}", serde_json::to_string(&answer.filter)?);
        println!("Matches: {}\n", answer.matches.len());
    }
    println!("{}", answer.text);
    Ok(())
}

fn cmd_update(store: &MemoryStore, id: &str, patch: &TripletPatch) -> Result<()> {
    if patch.is_empty() {
        debug!("Empty patch for {}", id);
    }
    if !store.update_by_id(id, patch)? {
        bail!("Triplet not found: {}", id);
    }
    println!("Updated {}", id);
    Ok(())
}

fn cmd_delete(store: &MemoryStore, id: &str) -> Result<()> {
    if !store.delete_by_id(id)? {
        bail!("Triplet not found: {}", id);
    }
    println!("Deleted {}", id);
    Ok(())
}

fn cmd_stats(store: &MemoryStore, top: usize) -> Result<()> {
    let triplets = load_flat(store)?;
    let summary = aggregate::summarize(&triplets, top);

    println!("=== Memgraph Memory Stats ===");
    println!("Memory: {}", store.describe());
    println!();
    println!("Triplets: {} total", summary.total_triplets);
    for (author, list) in &summary.by_user {
        println!("  {:12} {}", author, list.len());
    }
    println!("Predicates:");
    for (predicate, count) in &summary.predicate_counts {
        println!("  {:12} {}", predicate, count);
    }
    println!("Top subjects: {}", summary.common_subjects.join(", "));

    Ok(())
}

fn cmd_graph(store: &MemoryStore, json: bool) -> Result<()> {
    let graph = TripletGraph::from_triplets(&load_flat(store)?);
    let edges = graph.edges();
    if json {
        return print_json(&edges);
    }

    for edge in &edges {
        println!("{} -[{}]-> {}", edge.from, edge.relation, edge.to);
    }
    println!("\n{} nodes, {} edges", graph.node_count(), graph.edge_count());
    Ok(())
}

fn cmd_backfill(store: &MemoryStore) -> Result<()> {
    let assigned = migrate::backfill_store(store)?;
    println!("Assigned {} new ids ({})", assigned, store.describe());
    Ok(())
}

fn cmd_export(store: &MemoryStore) -> Result<()> {
    print_json(&load_flat(store)?)
}
