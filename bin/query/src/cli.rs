//! For Command Line Interface for innertx_query

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Query a trace store by block hash.
///
/// The store directory is the one the node writes trace blobs into at
/// block commit. Output is JSON on stdout.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct AppArgs {
    /// Directory holding the trace store.
    #[arg(long, default_value = "data/traces")]
    pub db: PathBuf,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract and print the transfers of one block.
    Transfers {
        /// 0x-prefixed 32-byte block hash.
        block_hash: String,
    },
    /// Print one block's raw filtered step logs without extraction.
    Logs {
        /// 0x-prefixed 32-byte block hash.
        block_hash: String,
    },
}
