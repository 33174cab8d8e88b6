use std::path::PathBuf;

use casegen::Result;
use casegen::commands::{delete, ingest, query, status};
use casegen::config::{Config, get_config_dir, init_config, show_config};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "casegen")]
#[command(about = "Retrieval-backed test case generation over project artifacts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write or inspect the configuration file
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Ingest artifacts (files or directories) into the vector store
    Ingest {
        /// Files or directories to ingest
        paths: Vec<PathBuf>,
        /// Window size in whitespace tokens
        #[arg(long)]
        chunk_size: Option<usize>,
        /// Tokens shared between adjacent windows
        #[arg(long)]
        overlap: Option<usize>,
    },
    /// Run a similarity query and print the ranked chunks
    Query {
        /// Query text
        text: String,
        /// Number of results to return
        #[arg(long)]
        top_k: Option<usize>,
        /// Restrict results to one document type, e.g. "pdf" or "jira"
        #[arg(long)]
        doc_type: Option<String>,
    },
    /// Delete chunks by id
    Delete {
        /// Chunk ids to delete
        ids: Vec<String>,
    },
    /// Show vector store location and row count
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                init_config()?;
            }
        }
        Commands::Ingest {
            paths,
            chunk_size,
            overlap,
        } => {
            let config = Config::load(get_config_dir()?)?;
            let summary = ingest(&config, &paths, chunk_size, overlap).await?;
            println!(
                "Ingested {} chunks from {} artifacts ({} failed).",
                summary.chunks_upserted, summary.artifacts_processed, summary.artifacts_failed
            );
        }
        Commands::Query {
            text,
            top_k,
            doc_type,
        } => {
            let config = Config::load(get_config_dir()?)?;
            query(&config, &text, top_k, doc_type).await?;
        }
        Commands::Delete { ids } => {
            let config = Config::load(get_config_dir()?)?;
            delete(&config, &ids).await?;
        }
        Commands::Status => {
            let config = Config::load(get_config_dir()?)?;
            status(&config).await?;
        }
    }

    Ok(())
}
