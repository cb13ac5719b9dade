//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// newsdesk: browse a remote news feed with short-lived in-memory caching
#[derive(Parser, Debug)]
#[command(name = "newsdesk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Browse article lists and details
    News(NewsArgs),

    /// Sign up, sign in, and inspect the current user
    Auth(AuthArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct NewsArgs {
    #[command(subcommand)]
    pub command: NewsCommands,
}

#[derive(Subcommand, Debug)]
pub enum NewsCommands {
    /// List articles, newest first
    List {
        /// Restrict to one category (science, technology, business,
        /// entertainment, general, sports)
        #[arg(long)]
        category: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one article with its related-articles strip
    Show {
        /// Article category
        category: String,

        /// Article id
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Poll the feed on an interval, printing new headlines
    Watch {
        /// Restrict to one category
        #[arg(long)]
        category: Option<String>,

        /// Seconds between polls (defaults to the configured interval)
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommands,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Register a new account
    Signup {
        username: String,

        /// Password (falls back to $NEWSDESK_PASSWORD)
        #[arg(long, env = "NEWSDESK_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Optional display nickname
        #[arg(long)]
        nickname: Option<String>,
    },

    /// Sign in and show the resulting profile
    Signin {
        username: String,

        /// Password (falls back to $NEWSDESK_PASSWORD)
        #[arg(long, env = "NEWSDESK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// End the current session
    Signout,

    /// Show the currently signed-in user
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
