//! hashkv CLI
//!
//! Opens a data directory, runs one command against it, and closes it.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use hashkv::{Config, HashIndex, HashKvError};
use tracing_subscriber::{fmt, EnvFilter};

/// hashkv CLI
#[derive(Parser, Debug)]
#[command(name = "hashkv-cli")]
#[command(about = "CLI for the hashkv storage engine")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./hashkv_data")]
    dir: String,

    /// Segment size in bytes before rolling over to a new file
    #[arg(short, long, default_value = "32768")]
    max_segment_size: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Put {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Delete {
        /// The key to delete
        key: String,
    },

    /// Show segment and key counts
    Stats,
}

fn main() -> ExitCode {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,hashkv=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .directory(&args.dir)
        .max_segment_size(args.max_segment_size)
        .build();

    let engine = match HashIndex::open(config) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = run(&engine, args.command);

    if let Err(e) = engine.close() {
        tracing::error!("Failed to close engine: {}", e);
        return ExitCode::FAILURE;
    }

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(HashKvError::KeyNotFound) => {
            println!("(not found)");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(engine: &HashIndex, command: Commands) -> hashkv::Result<()> {
    match command {
        Commands::Get { key } => {
            let value = engine.get(key.as_bytes())?;
            println!("{}", String::from_utf8_lossy(&value));
        }
        Commands::Put { key, value } => {
            engine.put(key.as_bytes(), value.as_bytes())?;
            println!("OK");
        }
        Commands::Delete { key } => {
            engine.delete(key.as_bytes())?;
            println!("OK");
        }
        Commands::Stats => {
            println!("directory: {}", engine.dir().display());
            println!("segments:  {}", engine.segment_count());
            println!("keys:      {}", engine.len());
        }
    }
    Ok(())
}
