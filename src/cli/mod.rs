//! CLI module for gensearch.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// gensearch - word-capped LLM passthrough and document question answering
///
/// Serves `/generate` and `/ask` over HTTP, and exposes the same operations
/// from the command line.
#[derive(Parser, Debug)]
#[command(name = "gensearch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "GENSEARCH_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index the source document (if needed) and start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long, env = "GENSEARCH_HOST")]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,
    },

    /// Index the source document into the vector store
    Ingest {
        /// Drop and rebuild the collection even if it is already populated
        #[arg(long)]
        reset: bool,
    },

    /// Send a prompt to the LLM and print the word-capped answer
    Generate {
        /// The prompt to send
        prompt: String,
    },

    /// Ask a question about the indexed document
    Ask {
        /// The question to ask
        question: String,

        /// LLM model to use for the answer
        #[arg(short, long)]
        model: Option<String>,

        /// Number of chunks to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Print the retrieved chunks after the answer
        #[arg(long)]
        sources: bool,
    },

    /// Check configuration and connectivity
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration (secrets omitted)
    Show,

    /// Show configuration file path
    Path,

    /// Write a configuration file with the default values
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ingest_reset() {
        let cli = Cli::try_parse_from(["gensearch", "-v", "ingest", "--reset"]).unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(matches!(cli.command, Commands::Ingest { reset: true }));
    }

    #[test]
    fn test_parse_ask_options() {
        let cli = Cli::try_parse_from(["gensearch", "ask", "Who lives at house 21?", "-k", "3"])
            .unwrap();
        match cli.command {
            Commands::Ask {
                question, top_k, ..
            } => {
                assert_eq!(question, "Who lives at house 21?");
                assert_eq!(top_k, Some(3));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_config_init() {
        let cli = Cli::try_parse_from(["gensearch", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Init { force: true }
            }
        ));
    }
}
