//! CLI command definitions.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP gateway
    Serve {
        /// Address to listen on, e.g. 0.0.0.0:3002
        #[arg(short, long)]
        bind: Option<String>,

        /// Path to a YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Search the catalog from the command line
    Search {
        /// Search text
        query: String,

        /// Catalog language
        #[arg(short, long, default_value = "en")]
        lang: String,

        /// Comma-separated fields to match against
        #[arg(short, long)]
        fields: Option<String>,

        /// Maximum number of results
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// List supported catalog languages
    Languages,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Key
        key: String,

        /// Value
        value: String,
    },
}
