pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::error::Result;

#[derive(Parser)]
#[command(name = "newsdesk")]
#[command(about = "News portal client with response caching and API-key rotation")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration file
    Init,

    /// Fetch top headlines
    Headlines {
        /// Country code (e.g. us, gb)
        #[arg(long)]
        country: Option<String>,

        /// Language code (e.g. en)
        #[arg(long)]
        lang: Option<String>,

        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },

    /// Fetch headlines for a topic
    Category {
        /// Category name (world, business, technology, ...)
        name: String,

        #[arg(long)]
        country: Option<String>,

        #[arg(long)]
        lang: Option<String>,

        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },

    /// Search articles by free text
    Search {
        /// Search query
        query: String,

        #[arg(long)]
        lang: Option<String>,

        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },

    /// List recent search terms
    Recent,

    /// Clear the recent search list
    ClearRecent,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        commands::init_logging(self.debug, self.verbose)?;

        match self.command {
            Commands::Init => commands::init(self.config),
            Commands::Headlines {
                country,
                lang,
                page,
            } => commands::headlines(country, lang, page, self.config).await,
            Commands::Category {
                name,
                country,
                lang,
                page,
            } => commands::category(name, country, lang, page, self.config).await,
            Commands::Search { query, lang, page } => {
                commands::search(query, lang, page, self.config).await
            }
            Commands::Recent => commands::recent(),
            Commands::ClearRecent => commands::clear_recent(),
        }
    }
}
