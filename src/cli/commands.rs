use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "slugnote")]
#[command(version, about = "Personal notes with author-only access")]
#[command(propagate_version = true)]
pub struct Cli {
    /// TOML config file (bind, database, session_ttl_hours)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// SQLite database file, overrides the config file
    #[arg(long, global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the web server
    Serve {
        /// Address to listen on, overrides the config file
        #[arg(long, value_name = "ADDR")]
        bind: Option<SocketAddr>,
    },

    /// Create a user account
    CreateUser {
        /// Login name
        username: String,

        /// Account password
        #[arg(long)]
        password: String,
    },

    /// Add a note on behalf of a user
    Add {
        /// Note title
        title: String,

        /// Owner of the note
        #[arg(long)]
        author: String,

        /// Note text
        #[arg(long)]
        text: String,

        /// URL slug; derived from the title when omitted
        #[arg(long)]
        slug: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List notes in creation order
    List {
        /// Only show notes written by this user
        #[arg(long)]
        author: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
