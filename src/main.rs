use clap::{ArgAction, Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use votechain::event::{parse_candidates, Event};
use votechain::export::{export_csv, export_file_name};
use votechain::storage::{ChainStore, EventStore, JsonFileStore};
use votechain::tamper::{tamper, TamperEdit};
use votechain::validate::validate;

#[derive(Parser)]
#[command(
    name = "votechain",
    version,
    about = "Append-only, hash-linked vote ledger"
)]
struct Cli {
    /// Event store file
    #[arg(long, env = "VOTECHAIN_STORE", default_value = "events.json")]
    store: PathBuf,

    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an event with a fixed candidate list
    CreateEvent {
        #[arg(long)]
        name: String,
        /// Comma-separated candidates
        #[arg(long)]
        candidates: String,
    },
    /// List events
    Events,
    /// Delete an event
    DeleteEvent { event_id: String },
    /// Cast a vote
    Vote {
        event_id: String,
        #[arg(long)]
        voter: String,
        #[arg(long)]
        candidate: String,
    },
    /// Set or clear a candidate description
    Describe {
        event_id: String,
        #[arg(long)]
        candidate: String,
        /// Empty text clears the description
        #[arg(long, default_value = "")]
        text: String,
    },
    /// Print every block with validity and results
    Chain { event_id: String },
    /// Check chain integrity (exit code 2 when broken)
    Verify { event_id: String },
    /// Show vote counts and winners
    Results { event_id: String },
    /// Rewrite one block without relinking the rest of the chain
    Tamper {
        event_id: String,
        index: usize,
        #[arg(long)]
        candidate: Option<String>,
        #[arg(long)]
        voter: Option<String>,
    },
    /// Export vote blocks as CSV
    Export {
        event_id: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::CreateEvent { name, candidates } => {
            cmd_create_event(&cli.store, &name, &candidates)
        }
        Commands::Events => cmd_events(&cli.store),
        Commands::DeleteEvent { event_id } => cmd_delete_event(&cli.store, &event_id),
        Commands::Vote {
            event_id,
            voter,
            candidate,
        } => cmd_vote(&cli.store, &event_id, &voter, &candidate),
        Commands::Describe {
            event_id,
            candidate,
            text,
        } => cmd_describe(&cli.store, &event_id, &candidate, &text),
        Commands::Chain { event_id } => cmd_chain(&cli.store, &event_id),
        Commands::Verify { event_id } => cmd_verify(&cli.store, &event_id),
        Commands::Results { event_id } => cmd_results(&cli.store, &event_id),
        Commands::Tamper {
            event_id,
            index,
            candidate,
            voter,
        } => cmd_tamper(&cli.store, &event_id, index, candidate, voter),
        Commands::Export { event_id, out } => cmd_export(&cli.store, &event_id, out.as_deref()),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "votechain=warn",
        1 => "votechain=debug",
        _ => "votechain=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

/// Commands return `Ok(false)` when they ran but found a broken chain.
type CmdResult = Result<bool, Box<dyn std::error::Error>>;

fn cmd_create_event(path: &Path, name: &str, candidates: &str) -> CmdResult {
    let mut store = JsonFileStore::open(path)?;
    let event = Event::new(name, parse_candidates(candidates))?;
    let summary = format!("Created {} '{}' [{}]", event.event_id, event.name, event.candidates.join(", "));
    store.insert(event)?;
    println!("{}", summary);
    Ok(true)
}

fn cmd_events(path: &Path) -> CmdResult {
    let store = JsonFileStore::open(path)?;
    let events = store.list()?;
    if events.is_empty() {
        println!("(no events)");
    }
    for event in &events {
        let status = if event.validate().valid { "valid" } else { "INVALID" };
        println!(
            "{}  {}  votes={}  {}",
            event.event_id,
            event.name,
            event.blockchain.votes().count(),
            status,
        );
    }
    Ok(true)
}

fn cmd_delete_event(path: &Path, event_id: &str) -> CmdResult {
    let mut store = JsonFileStore::open(path)?;
    store.delete(event_id)?;
    println!("Deleted event '{}'", event_id);
    Ok(true)
}

fn cmd_vote(path: &Path, event_id: &str, voter: &str, candidate: &str) -> CmdResult {
    let mut store = JsonFileStore::open(path)?;
    let mut event = store.get(event_id)?;
    let block = event.cast_vote(voter, candidate)?;
    store.save(event_id, &event.blockchain)?;
    println!("[{}] block {} recorded", short(&block.hash), block.index);
    Ok(true)
}

fn cmd_describe(path: &Path, event_id: &str, candidate: &str, text: &str) -> CmdResult {
    let mut store = JsonFileStore::open(path)?;
    let mut event = store.get(event_id)?;
    event.set_description(candidate, text)?;
    store.update(event)?;
    println!("Updated description for '{}'", candidate);
    Ok(true)
}

fn cmd_chain(path: &Path, event_id: &str) -> CmdResult {
    let store = JsonFileStore::open(path)?;
    let event = store.get(event_id)?;
    println!("{} — {}", event.event_id, event.name);
    for block in event.blockchain.blocks() {
        println!(
            "#{:<4} {}  {:<16} {:<16} prev={}  hash={}",
            block.index,
            block.timestamp,
            block.voter_id,
            block.candidate,
            short(&block.previous_hash),
            short(&block.hash),
        );
    }
    let report = event.validate();
    println!("\nChain: {}\n", report);
    print!("{}", event.summary());
    Ok(report.valid)
}

fn cmd_verify(path: &Path, event_id: &str) -> CmdResult {
    let store = JsonFileStore::open(path)?;
    let chain = store.load(event_id)?;
    let report = validate(&chain);
    println!("{}", report);
    if let Some(head) = chain.head_hash() {
        println!("head: {}", head);
    }
    Ok(report.valid)
}

fn cmd_results(path: &Path, event_id: &str) -> CmdResult {
    let store = JsonFileStore::open(path)?;
    let event = store.get(event_id)?;
    print!("{}", event.summary());
    Ok(true)
}

fn cmd_tamper(
    path: &Path,
    event_id: &str,
    index: usize,
    candidate: Option<String>,
    voter: Option<String>,
) -> CmdResult {
    let mut store = JsonFileStore::open(path)?;
    let mut chain = store.load(event_id)?;
    let edit = TamperEdit {
        candidate,
        voter_id: voter,
    };
    let block = tamper(&mut chain, index, &edit)?;
    store.save(event_id, &chain)?;
    println!(
        "Block {} rewritten: voter={} candidate={} hash={}",
        block.index,
        block.voter_id,
        block.candidate,
        short(&block.hash),
    );
    println!("Chain: {}", validate(&chain));
    Ok(true)
}

fn cmd_export(path: &Path, event_id: &str, out: Option<&Path>) -> CmdResult {
    let store = JsonFileStore::open(path)?;
    let event = store.get(event_id)?;
    match out {
        Some(out) => {
            export_csv(&event, File::create(out)?)?;
            println!("Wrote {}", out.display());
        }
        None => {
            tracing::debug!(file = %export_file_name(&event), "exporting to stdout");
            export_csv(&event, std::io::stdout().lock())?;
        }
    }
    Ok(true)
}

fn short(hash: &str) -> &str {
    hash.get(..8).unwrap_or(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_event_fails_when_store_write_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("events.json");
        std::fs::write(&path, b"{not json").unwrap();

        assert!(cmd_create_event(&path, "Board", "Alice,Bob").is_err());
        assert_eq!(std::fs::read(&path).unwrap(), b"{not json");
    }

    #[test]
    fn create_event_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("events.json");
        assert!(cmd_create_event(&path, "Board", "Alice,Bob").unwrap());
        let events = JsonFileStore::open(&path).unwrap().list().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].candidates, vec!["Alice", "Bob"]);
    }
}
