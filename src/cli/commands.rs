//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - ask: ask a single question
//! - chat: ask questions read from stdin within one session
//! - schema: print the tool's parameter schema

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Powerdrill - ask questions about your datasets
#[derive(Parser, Debug)]
#[command(name = "powerdrill")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a single question
    Ask {
        /// Question to ask about the dataset
        question: String,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Ask questions read line by line from stdin, sharing one session
    Chat {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Print the tool's JSON parameter schema
    Schema,
}

/// Where a question goes; unset values fall back to the config file
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Powerdrill user id (owner of the session)
    #[arg(short, long)]
    pub user_id: Option<String>,

    /// Dataset to query
    #[arg(short, long)]
    pub dataset_id: Option<String>,

    /// Comma-separated datasource ids to narrow the search
    #[arg(short = 's', long)]
    pub datasource_id: Option<String>,

    /// Append citations to the answer
    #[arg(long)]
    pub with_citation: bool,

    /// API base URL
    #[arg(long)]
    pub base_url: Option<String>,
}
