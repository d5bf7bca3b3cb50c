//! CLI module - Command-line interface for memberdesk
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// memberdesk - Membership administration service
#[derive(Parser)]
#[command(name = "memberdesk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API until interrupted
    #[command(alias = "daemon", alias = "-d")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Apply database migrations and exit
    Migrate,

    /// Inspect member applications
    Members {
        #[command(subcommand)]
        command: MembersCommands,
    },

    /// Administrative maintenance
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
}

#[derive(Subcommand)]
pub enum MembersCommands {
    /// List applications awaiting approval
    #[command(alias = "ls")]
    Pending,

    /// Show the identifier the next approval would receive
    NextId,
}

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Replace the admin account's API key
    RotateKey {
        /// Account to rotate
        #[arg(long, default_value = "admin")]
        username: String,
    },
}

pub use commands::*;
