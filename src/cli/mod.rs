//! CLI module for the tech-support agent
//!
//! Provides command-line interface parsing and handling for the
//! `techsupport-agent` binary. Uses clap for argument parsing and owo-colors
//! for colored terminal output.

/// Subcommand handlers.
pub mod commands;
/// The `init` subcommand.
pub mod init;
/// Terminal output helpers.
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tech-support assistant with calculator, file, web search and past-ticket tools
#[derive(Parser, Debug)]
#[command(
    name = "techsupport-agent",
    version,
    about = "Tech-support assistant backed by a tool-calling LLM",
    long_about = "Ask tech-support questions of an LLM agent that can do math, work with files,\n\
                  search the web and look up similar past support tickets in Weaviate.",
    after_help = "EXAMPLES:\n    \
                  techsupport-agent ask \"What is 15 + 27?\"\n    \
                  techsupport-agent tools list\n    \
                  techsupport-agent tools run MathTool --args '{\"expression\": \"sqrt(16)\"}'\n    \
                  techsupport-agent tickets search \"printer keeps jamming\"\n    \
                  techsupport-agent init"
)]
pub struct Cli {
    /// Path to the configuration file (defaults to ./techsupport.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask the support agent a question
    Ask {
        /// The question or request
        message: String,

        /// Print every tool call the agent made
        #[arg(long)]
        show_tools: bool,
    },

    /// Inspect and run tools directly
    #[command(subcommand)]
    Tools(ToolCommands),

    /// Search past support tickets
    #[command(subcommand)]
    Tickets(TicketCommands),

    /// Show configuration information
    Config {
        /// Only validate the configuration
        #[arg(long)]
        validate: bool,
    },

    /// Write a starter techsupport.toml and .env.example
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

/// Tool subcommands
#[derive(Subcommand, Debug)]
pub enum ToolCommands {
    /// List all registered tools
    List,

    /// Show a tool's description and parameter schema
    Show {
        /// Name of the tool, e.g. MathTool
        name: String,
    },

    /// Run a tool with JSON arguments
    Run {
        /// Name of the tool, e.g. MathTool
        name: String,

        /// Arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },
}

/// Ticket search subcommands
#[derive(Subcommand, Debug)]
pub enum TicketCommands {
    /// Find the past ticket closest to a description of the problem
    Search {
        /// Description of the problem
        query: String,

        /// Number of candidates to retrieve
        #[arg(short, default_value_t = 1)]
        k: usize,
    },

    /// Check the vector store connection, schema and search
    Check,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
