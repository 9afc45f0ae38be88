use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::application::data::{LogLevel, OutputFormat};

/// Turn a pasted directory tree into real directories and files.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(long, short, default_value = "warn", value_enum, global = true)]
    pub log_level: LogLevel,

    /// Directory holding the optional `sprout.yaml`
    #[clap(long, short, default_value = ".", global = true)]
    pub root: PathBuf,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Parse structure text and print what it describes
    Parse {
        /// File with the structure text, `-` for stdin
        input: PathBuf,
        /// Output format, defaults to the configured style
        #[clap(long, short, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Create the described directories and empty files below a target
    Apply(ApplyArgs),
    /// List the directories and files directly inside a directory
    Ls {
        path: PathBuf,
        #[clap(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    /// File with the structure text, `-` for stdin
    pub input: PathBuf,

    /// Existing directory to create the structure in
    #[clap(long, short)]
    pub target: PathBuf,

    /// Leave out a node and everything below it, e.g. `app/tests`
    #[clap(long, value_name = "PATH")]
    pub exclude: Vec<String>,

    /// Switch a node between file and directory before applying
    #[clap(long, value_name = "PATH")]
    pub retype: Vec<String>,

    /// Print the plan without touching the filesystem
    #[clap(long)]
    pub dry_run: bool,

    /// Print results as JSON
    #[clap(long)]
    pub json: bool,

    /// Filesystem calls in flight at once
    #[clap(long)]
    pub concurrency: Option<NonZeroUsize>,

    /// Timeout for each filesystem call, in milliseconds
    #[clap(long)]
    pub timeout_ms: Option<u64>,
}
