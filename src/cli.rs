//! Command-line interface for strictly_rps.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly RPS - rock-paper-scissors chat bot
#[derive(Parser, Debug)]
#[command(name = "strictly_rps")]
#[command(about = "Rock-paper-scissors bot for Telegram chats", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the bot until SIGINT or SIGTERM
    Run {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Telegram bot token (defaults to STRICTLY_RPS_TOKEN)
        #[arg(long)]
        token: Option<String>,

        /// File storing known private chats
        #[arg(long)]
        chats_file: Option<PathBuf>,

        /// Seconds between private chat snapshots
        #[arg(long)]
        save_interval: Option<u64>,

        /// Seconds to wait for a move before ending the game
        #[arg(long)]
        move_timeout: Option<u64>,

        /// Seconds a group game stays open for joining
        #[arg(long)]
        recruit_timeout: Option<u64>,
    },

    /// Validate a config file and print the effective settings
    CheckConfig {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
