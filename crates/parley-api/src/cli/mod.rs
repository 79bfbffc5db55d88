//! CLI command definitions for the `parley` binary.
//!
//! Uses clap derive macros for argument parsing. `serve` runs the REST API;
//! the other commands read stored chats without needing any model keys.

pub mod chat;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Chat backend with depth-tiered answers, web search and prompt tuning.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug, -vvv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (default from config).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (default from config).
        #[arg(long)]
        host: Option<String>,
    },

    /// List stored chats, newest first.
    Chats {
        /// Maximum number of chats to show.
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Print the messages of a chat.
    History {
        /// Chat id as returned by `POST /chat`.
        chat_id: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
