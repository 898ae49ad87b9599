// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// The binary is a thin layer over the library: `show` builds a Gist from
// an id, `user` runs fetch_by_user. Everything interesting lives in
// src/gist/.
// =============================================================================

use clap::{Parser, Subcommand};

// The whole CLI: global connection options plus one subcommand
#[derive(Parser, Debug)]
#[command(
    name = "gistapi",
    version,
    about = "Look up gists and their files from the command line"
)]
pub struct Cli {
    /// Base URL of the Gist service
    #[arg(long, env = "GISTAPI_BASE_URL", default_value = gistapi::DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Per-request timeout in seconds (at least 1)
    #[arg(
        long,
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..),
        global = true
    )]
    pub timeout: u64,

    /// Log every request (same as RUST_LOG=gistapi=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show one gist's metadata
    ///
    /// Example: gistapi show d4507e882a07ac6f9f92 --files
    Show {
        /// Gist id (e.g., d4507e882a07ac6f9f92)
        id: String,

        /// Also download and print every file
        #[arg(long)]
        files: bool,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List a user's public gists
    ///
    /// Example: gistapi user kennethreitz
    User {
        /// GitHub username
        username: String,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },
}
