pub mod init;
pub mod migrate;
pub mod serve;
pub mod slugify;
pub mod types;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pebble-slug")]
#[command(version)]
#[command(about = "Slug generation and slug lookup for content types", long_about = None)]
pub struct Cli {
    #[arg(short, long, default_value = "pebble-slug.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    Init {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    Serve {
        #[arg(short = 'H', long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    Migrate,
    /// List content types that get slugs
    Types,
    /// Show the slug a text would get
    Slugify {
        text: String,
        /// Check uniqueness against this content type
        #[arg(long = "type")]
        content_type: Option<String>,
    },
}
