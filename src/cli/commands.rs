//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - assign: assign or repair a client's publishing slot
//! - conflicts / fix-conflicts: inspect and repair schedule collisions
//! - generate: build a client's bulk content calendar
//! - run-weekly: the periodic production scheduling pass
//! - import-questions: replace a client's question bank from a file

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cadencer - a publishing-slot and content-calendar engine
#[derive(Parser, Debug)]
#[command(name = "cadencer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assign a publishing slot to a client (idempotent)
    Assign {
        /// Client ID to assign
        #[arg(long)]
        client: String,
    },

    /// List schedule conflicts without changing anything
    Conflicts,

    /// Detect and repair all schedule conflicts
    FixConflicts,

    /// Generate a client's bulk content calendar
    Generate {
        /// Client ID to generate for
        #[arg(long)]
        client: String,

        /// First candidate date (YYYY-MM-DD); defaults to the next
        /// publish day from today
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Horizon of the date sequence in years
        #[arg(long)]
        years: Option<u32>,

        /// Cap on new items per location this run
        #[arg(long)]
        max_per_location: Option<usize>,

        /// Plan and print without persisting
        #[arg(long)]
        preview: bool,
    },

    /// Run the weekly auto-schedule pass over all eligible clients
    RunWeekly {
        /// Schedule from this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Replace a client's question bank from a text file
    ImportQuestions {
        /// Client ID to import for
        #[arg(long)]
        client: String,

        /// File with one question template per line
        #[arg(long)]
        file: PathBuf,
    },
}
