//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

/// Declarative component-tree builder: nested declarations, typed attributes, ordered attachment
#[derive(Parser, Debug)]
#[command(name = "flowtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (default: global flowtree.toml)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Extra catalog file merged over the built-in catalog (repeatable)
    #[arg(long = "catalog", global = true, value_hint = ValueHint::FilePath)]
    pub catalogs: Vec<PathBuf>,

    /// Coerce string attribute values to the declared property type
    #[arg(long, global = true)]
    pub lenient: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a declaration file and print the component tree
    Build {
        /// Declaration file (.toml or .json)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Attach the declaration under a fresh component of this kind
        #[arg(long)]
        parent_kind: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Tree)]
        format: OutputFormat,
    },

    /// Build declaration files and report problems
    Check {
        /// Declaration files
        #[arg(required = true, num_args = 1.., value_hint = ValueHint::FilePath)]
        files: Vec<PathBuf>,
    },

    /// List component kinds, or the properties of one kind
    Kinds {
        /// Kind to describe
        kind: Option<String>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Print a config template
    Template,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented component tree
    Tree,
    /// Snapshot declaration as JSON
    Json,
}
