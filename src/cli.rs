use crate::models::{MatchTolerance, MatchType};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pattern-hunter")]
#[command(version)]
#[command(about = "Extracts repeated content blocks from HTML by example.", long_about = None)]
pub struct Args {
    /// Show matcher decisions (repeat for per-node tracing).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find every element of a document shaped like an exemplar element.
    Match(MatchArgs),

    /// Run a correctness suite (definition.txt plus case files).
    Suite {
        /// Directory holding definition.txt.
        #[arg(long, default_value = "test")]
        dir: String,

        /// Save the suite results to a JSON file.
        #[arg(long)]
        report: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
pub struct MatchArgs {
    /// HTML snippet holding the exemplar element.
    #[arg(short, long)]
    pub element: String,

    /// HTML document to search.
    #[arg(long)]
    pub html: String,

    /// strict = compare tag and attributes, loose = compare tag only.
    #[arg(short = 't', long, default_value = "loose")]
    pub match_type: MatchType,

    /// Deepest level compared; the exemplar root is depth 0 (default: unbounded).
    #[arg(short = 'd', long)]
    pub max_depth: Option<usize>,

    /// Child-count tolerance (all, missing-child, redundant-child).
    #[arg(long, default_value = "all")]
    pub tolerance: MatchTolerance,

    /// Write the matched elements to this file, one per line.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Print matches as a JSON array of HTML strings instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Print the session settings before matching.
    #[arg(long)]
    pub settings: bool,
}
