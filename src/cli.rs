//! CLI argument parsing for topdown

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use topdown::graph::{ExportFormat, SortKey};
use topdown::ingest::{ImportConfig, DEFAULT_DELIMITER, DEFAULT_HEADER_MARKER};
use topdown::OutputFormat;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    /// Human-readable text (default)
    Human,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    Pretty,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Human => OutputFormat::Human,
            OutputArg::Json => OutputFormat::Json,
            OutputArg::Pretty => OutputFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    /// Inclusive time, largest first
    Total,
    /// Exclusive time, largest first
    #[value(name = "self")]
    SelfTime,
    /// Function name, A to Z
    Name,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Total => SortKey::Total,
            SortArg::SelfTime => SortKey::SelfTime,
            SortArg::Name => SortKey::Name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportArg {
    Json,
    Jsonl,
    Csv,
}

impl From<ExportArg> for ExportFormat {
    fn from(arg: ExportArg) -> Self {
        match arg {
            ExportArg::Json => ExportFormat::Json,
            ExportArg::Jsonl => ExportFormat::JsonL,
            ExportArg::Csv => ExportFormat::Csv,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "topdown")]
#[command(version = topdown::version::LONG_VERSION)]
#[command(about = "Rebuild and browse the call tree of a top-down profiling export", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "human", global = true)]
    pub output: OutputArg,

    /// Log debug detail (skipped rows, coerced fields) to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a top-down CSV export into a graph database
    Import {
        /// Exported profile (semicolon-delimited)
        input: PathBuf,

        /// Database file (default: input path with a .db extension)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Delete existing nodes, edges and index rows before importing
        #[arg(long)]
        fresh: bool,

        /// Prefix of the column-header line
        #[arg(long, value_name = "MARKER", default_value = DEFAULT_HEADER_MARKER)]
        header: String,

        /// Field delimiter
        #[arg(long, value_name = "CHAR", default_value_t = DEFAULT_DELIMITER)]
        delimiter: char,
    },

    /// List functions sorted by total time, self time or name
    List {
        #[arg(long)]
        db: PathBuf,

        #[arg(long, value_enum, default_value = "total")]
        sort: SortArg,

        /// Maximum number of rows
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show one node with its parent and immediate children
    Show {
        #[arg(long)]
        db: PathBuf,

        /// Node ID (16 hex characters)
        #[arg(long)]
        id: String,
    },

    /// List the immediate children of a node
    Children {
        #[arg(long)]
        db: PathBuf,

        #[arg(long)]
        id: String,
    },

    /// List top-level frames
    Roots {
        #[arg(long)]
        db: PathBuf,
    },

    /// Find nodes whose name or signature contains a pattern
    Find {
        #[arg(long)]
        db: PathBuf,

        #[arg(long)]
        name: String,

        /// Also list each match's immediate children
        #[arg(long)]
        children: bool,
    },

    /// Show database statistics
    Status {
        #[arg(long)]
        db: PathBuf,
    },

    /// Check graph invariants
    Verify {
        #[arg(long)]
        db: PathBuf,
    },

    /// Rebuild the children index from nodes and edges
    Reindex {
        #[arg(long)]
        db: PathBuf,
    },

    /// Export every node with its parent
    Export {
        #[arg(long)]
        db: PathBuf,

        #[arg(long, value_enum, default_value = "json")]
        format: ExportArg,

        /// Write to a file instead of stdout
        #[arg(long = "file", short = 'o', value_name = "PATH")]
        file: Option<PathBuf>,

        /// Compact JSON
        #[arg(long)]
        minify: bool,
    },
}

/// Build the import settings from `import` flags.
pub fn import_config(header: String, delimiter: char, fresh: bool) -> ImportConfig {
    ImportConfig {
        header_marker: header,
        delimiter,
        fresh,
    }
}
