//! CLI parse: clap types for Quill. No behavior; definitions only.

use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Quill CLI - resumable SEO article generation
#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Generate SEO articles from a keyword list, resumably and with bounded concurrency")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, value_parser = PossibleValuesParser::new(["text", "json"]))]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, value_parser = PossibleValuesParser::new(["stdout", "stderr", "file"]))]
    pub log_output: Option<String>,

    /// Log file path (used with --log-output file)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate articles for every keyword in the input file
    Generate {
        /// Keywords CSV (keyword,category); defaults to the configured path
        #[arg(long)]
        keywords: Option<PathBuf>,
        /// Category map CSV (category,query); defaults to the configured path
        #[arg(long)]
        categories: Option<PathBuf>,
        /// Regenerate keywords that already succeeded
        #[arg(long)]
        force: bool,
        /// Skip writing CSV artifacts after the batch
        #[arg(long)]
        no_export: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = PossibleValuesParser::new(["text", "json"]))]
        format: String,
    },
    /// Retry every keyword that is pending or failed in the record store
    Regenerate {
        /// Category map CSV (category,query); defaults to the configured path
        #[arg(long)]
        categories: Option<PathBuf>,
        /// Skip writing CSV artifacts after the batch
        #[arg(long)]
        no_export: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = PossibleValuesParser::new(["text", "json"]))]
        format: String,
    },
    /// Write CSV artifacts for every succeeded record
    Export {
        /// Output directory; defaults to the configured path
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show stored generation records
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = PossibleValuesParser::new(["text", "json"]))]
        format: String,
        /// Only show records that still need work (pending or failed)
        #[arg(long)]
        failed: bool,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration with credentials masked
    Show,
}
