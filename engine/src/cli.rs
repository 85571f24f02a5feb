//! CLI interface for the analyst engine
//!
//! This module provides the command-line interface using clap's derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Conversational BI analyst
///
/// Answers natural-language business questions by routing each one to
/// either a SQL engine over financial records or a semantic search engine
/// over strategic documents.
#[derive(Parser, Debug)]
#[command(name = "analyst")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Answer a business question
    Ask {
        /// The question to answer
        question: String,
    },

    /// Provision the schema and load the synthetic demo dataset
    Seed,

    /// Run system diagnostics
    Doctor,
}
