//! Command-line argument definitions.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use sift_query::SupportedLanguage;

/// Runs Tree-sitter queries and filters their matches with predicates.
#[derive(Parser, Debug)]
#[command(
    name = "sift",
    version,
    disable_help_subcommand = true,
    override_usage = "sift [CONFIG FLAGS] <COMMAND>",
    after_help = CONFIG_HELP
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

const CONFIG_HELP: &str = "\
Configuration flags (before the command):
  --config-path <PATH>          Configuration file, else $SIFT_CONFIG_PATH
  --log-filter <FILTER>         Log filter directive, for example sift_query=trace
  --log-format <FORMAT>         Log record format: compact or json
  --match-limit <N>             Maximum number of in-progress matches
  --defer-unknown-predicates    Report unknown operators when matches are evaluated";

#[derive(Subcommand, Debug)]
pub(crate) enum CliCommand {
    /// Prints the accepted matches of a query over a source file.
    Run(RunArgs),
    /// Prints the syntax tree of a source file as an S-expression.
    Tree {
        /// Grammar to parse with. Defaults to the one named by the file
        /// extension.
        #[arg(long, short)]
        language: Option<SupportedLanguage>,
        /// Source file.
        source: Utf8PathBuf,
    },
    /// Lists the bundled grammars and their file extensions.
    Languages,
}

#[derive(clap::Args, Debug)]
pub(crate) struct RunArgs {
    /// File holding the query text.
    #[arg(long, short)]
    pub(crate) query: Utf8PathBuf,
    /// Grammar to parse with. Defaults to the one named by the file
    /// extension.
    #[arg(long, short)]
    pub(crate) language: Option<SupportedLanguage>,
    /// Also print matches that failed a predicate.
    #[arg(long)]
    pub(crate) all: bool,
    /// Source file.
    pub(crate) source: Utf8PathBuf,
}
