use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use eyes_of_azrael::config::AppConfig;
use eyes_of_azrael::core::mythology::{MythologyError, MAX_COMPARED, MIN_COMPARED};
use eyes_of_azrael::core::storage::{self, SurrealStorage};

/// Command-line arguments for azrael
#[derive(Parser, Debug)]
#[command(name = "azrael")]
#[command(about = "Compare mythological entities and match them against cross-cultural archetypes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Compare 2-4 entities side by side
    Compare {
        /// Entity ids, probed across every collection
        #[arg(required = true, num_args = MIN_COMPARED..=MAX_COMPARED)]
        ids: Vec<String>,
    },
    /// Entities matching an archetype, best first
    Archetype { id: String },
    /// Parallels of an entity from other mythologies
    Parallels { id: String },
    /// Cross-cultural meanings of a symbol
    Symbol { key: String },
    /// Load a JSON snapshot into the store
    Import { path: PathBuf },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = eyes_of_azrael::core::logging::init();
    log::info!("{} v{} starting", eyes_of_azrael::NAME, eyes_of_azrael::VERSION);

    match run(cli.command, AppConfig::load()).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: AppConfig) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        // symbol lookups never touch the store
        Command::Symbol { key } => {
            let engine = config.build_engine(Arc::new(storage::MemoryStore::new()))?;
            match engine.analyze_symbol(&key) {
                Some(analysis) => print_json(&analysis)?,
                None => {
                    eprintln!("Unknown symbol: {key}");
                    return Ok(ExitCode::from(1));
                }
            }
        }
        Command::Import { path } => {
            let json = std::fs::read_to_string(&path)?;
            let snapshot = storage::parse_snapshot(&json)?;
            let imported = open_store(&config).await?.import(snapshot).await?;
            print_json(&serde_json::json!({ "imported": imported }))?;
        }
        Command::Compare { ids } => {
            let engine = config.build_engine(open_store(&config).await?)?;
            match engine.compare_entities(&ids).await {
                Ok(comparison) => print_json(&comparison)?,
                Err(e) => return user_failure(e),
            }
        }
        Command::Archetype { id } => {
            let engine = config.build_engine(open_store(&config).await?)?;
            match engine.find_entities_by_archetype(&id).await {
                Ok(found) => print_json(&found)?,
                Err(e) => return user_failure(e),
            }
        }
        Command::Parallels { id } => {
            let engine = config.build_engine(open_store(&config).await?)?;
            print_json(&engine.find_parallel_entities(&id).await?)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn open_store(config: &AppConfig) -> Result<Arc<SurrealStorage>, storage::StorageError> {
    Ok(Arc::new(
        SurrealStorage::open(config.database_path(), config.storage.clone()).await?,
    ))
}

/// Report a user-facing engine error with exit code 1; anything else propagates.
fn user_failure(e: MythologyError) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if e.is_user_error() {
        eprintln!("{e}");
        Ok(ExitCode::from(1))
    } else {
        Err(e.into())
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
