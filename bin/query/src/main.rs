use std::str::FromStr;

use anyhow::Result;
use clap::Parser;
use ethers::types::H256;
use log::debug;

use innertx_store::{DirDb, TraceStore};
use innertx_transfers::{block_transfers_by_hash, transfer_logs_by_hash};

pub mod cli;

use cli::{AppArgs, Command};

fn main() -> Result<()> {
    env_logger::init();
    let args = AppArgs::parse();

    let store = TraceStore::open(DirDb::open(&args.db)?)?;
    debug!("opened trace store at {}", args.db.display());

    match args.command {
        Command::Transfers { block_hash } => {
            let hash = H256::from_str(&block_hash)?;
            let block = block_transfers_by_hash(&store, hash)?;
            println!("{}", serde_json::to_string_pretty(&block)?);
        }
        Command::Logs { block_hash } => {
            let hash = H256::from_str(&block_hash)?;
            let traces = transfer_logs_by_hash(&store, hash)?;
            println!("{}", serde_json::to_string_pretty(&traces)?);
        }
    }
    Ok(())
}
