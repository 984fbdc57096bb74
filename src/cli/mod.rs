//! CLI module for Lectio.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Lectio - ask questions about your lecture video library.
///
/// Builds a searchable corpus from video transcript files and answers
/// questions with retrieval-augmented generation.
#[derive(Parser, Debug)]
#[command(name = "lectio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the corpus snapshot from transcript chunk files
    Ingest {
        /// Directory of per-video transcript JSON files (defaults to the
        /// configured transcripts directory)
        #[arg(short, long)]
        dir: Option<String>,
    },

    /// Ask a single question and get an answer with sources
    Ask {
        /// The question to ask
        question: String,

        /// Chat model to use for answer generation
        #[arg(short, long)]
        model: Option<String>,

        /// Number of context chunks to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Retrieve the most relevant transcript chunks without generation
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Start an interactive question-answering session
    Chat {
        /// Chat model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List indexed videos in the corpus snapshot
    List,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
