//! CLI module - Command-line interface for Episodarr
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Episodarr - TV series library metadata refresher
#[derive(Parser)]
#[command(name = "episodarr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as background daemon with scheduler and series-added listener
    #[command(alias = "-d", alias = "--daemon")]
    Daemon,

    /// Refresh one series, or every series when no ID is given
    #[command(alias = "r")]
    Refresh {
        /// Local series ID
        #[arg(value_parser = clap::value_parser!(i32).range(1..))]
        id: Option<i32>,
    },

    /// Add a series by its TVmaze ID and run its initial refresh
    #[command(alias = "a")]
    Add {
        /// TVmaze show ID
        #[arg(value_parser = clap::value_parser!(i32).range(1..))]
        external_id: i32,
    },

    /// List all series, least recently synced first
    #[command(alias = "ls", alias = "l")]
    List,

    /// List episodes of a series
    #[command(alias = "e")]
    Episodes {
        /// Local series ID
        #[arg(value_parser = clap::value_parser!(i32).range(1..))]
        id: i32,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
