//! CLI module for memroute
//!
//! Provides command-line interface parsing and handling for the memroute binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod chat;
pub mod init;
pub mod output;

use crate::config::{MemrouteConfig, ProviderKind};
use clap::{Parser, Subcommand};
use output::Output;
use std::path::PathBuf;

/// Thread used when no `--session` is given
pub const DEFAULT_SESSION: &str = "default";

/// memroute - keyword-routed conversational memory
///
/// Routes every message through a controller to either a short-term memory
/// responder or a long-term memory responder.
#[derive(Parser, Debug)]
#[command(
    name = "memroute",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "memroute - keyword-routed short/long-term conversational memory",
    long_about = "Routes each message to a short-term memory (STM) or long-term memory (LTM)\n\
                  responder. Messages containing \"remember\" or \"recall\" take the LTM branch.\n\n\
                  Run without arguments to start an interactive chat.",
    after_help = "EXAMPLES:\n    \
                  memroute init                        # Write a default memroute.toml\n    \
                  memroute chat --session work         # Chat on the 'work' thread\n    \
                  memroute ask \"remember I like tea\"   # Single turn\n    \
                  memroute --config my.toml config     # Show a custom configuration"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "memroute.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive conversation
    ///
    /// Type `:state`, `:facts`, `:reset` or `:forget` for memory commands,
    /// `quit` or `exit` to leave.
    Chat {
        /// Conversation thread to use
        #[arg(short, long, default_value = DEFAULT_SESSION)]
        session: String,

        /// User whose long-term facts are read and written
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Run a single turn and print the route and reply
    Ask {
        /// Message to send
        message: String,

        /// Conversation thread to use
        #[arg(short, long, default_value = DEFAULT_SESSION)]
        session: String,

        /// User whose long-term facts are read and written
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Write a default memroute.toml
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files without prompting
        #[arg(short, long)]
        force: bool,

        /// LLM provider to configure (openai or ollama)
        #[arg(long, default_value = "openai")]
        provider: ProviderKind,
    },

    /// Show configuration information
    Config {
        /// Validate the configuration, including required environment variables
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Output helper honoring `--no-color`
    pub fn output(&self) -> Output {
        if self.no_color {
            Output::no_color()
        } else {
            Output::new()
        }
    }
}

/// Print the effective configuration, optionally running full validation.
///
/// Returns whether validation passed (always `true` without `--validate`).
pub fn show_config(
    config: &MemrouteConfig,
    path: &std::path::Path,
    validate: bool,
    output: &Output,
) -> bool {
    output.header("Configuration");
    output.kv(
        "File",
        &if path.exists() {
            path.display().to_string()
        } else {
            format!("{} (not found, using defaults)", path.display())
        },
    );

    output.header("LLM");
    output.kv("Provider", &config.llm.provider.to_string());
    output.kv("Model", &config.llm.model);
    output.kv("Temperature", &config.llm.temperature.to_string());
    match config.llm.provider {
        ProviderKind::OpenAI => {
            output.kv("API base", &config.llm.api_base);
            output.kv("API key env", &config.llm.api_key_env);
        }
        ProviderKind::Ollama => output.kv("Ollama URL", &config.llm.ollama_url),
    }

    output.header("Memory");
    output.kv(
        "Fact namespace",
        &format!("{}/{}", config.memory.namespace, config.memory.user_id),
    );
    output.kv("Recursion limit", &config.memory.recursion_limit.to_string());

    output.header("Logging");
    output.kv("Level", &config.logging.level);
    output.kv("JSON", &config.logging.json.to_string());

    if !validate {
        return true;
    }

    output.newline();
    match config.validate() {
        Ok(()) => {
            output.success("Configuration is valid");
            true
        }
        Err(e) => {
            output.error(&e.to_string());
            false
        }
    }
}
