//! CLI module for cadencer - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for slot assignment,
//! conflict handling, calendar generation, and the weekly run.

pub mod commands;

pub use commands::Cli;
