//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "lawbot",
    version,
    about = "Legal question answering over Vietnamese road-traffic statutes",
    long_about = "Lawbot answers natural-language questions about Vietnamese road-traffic law by \
                  combining semantic and keyword retrieval over statute passages, cross-encoder \
                  reranking, and grounded answer synthesis with citations."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/lawbot/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a single question and print the answer with sources
    Ask {
        /// Question text
        question: String,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive chat session carrying conversation history
    Chat,

    /// Check data, config and model availability
    Status,

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

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
