//! Store-backed queries: decode one block's trace blob and answer with
//! transfers or with the raw filtered logs.

use ethers::types::H256;

use innertx_store::{db::BlobDb, error::StoreError, store::TraceStore};
use innertx_types::{step::TxTrace, transfer::BlockTransfer};

use crate::extract::block_transfers;

/// Rebuilds call trees for every transaction in the block and extracts
/// their transfers.
pub fn block_transfers_by_hash<D: BlobDb>(
    store: &TraceStore<D>,
    block_hash: H256,
) -> Result<BlockTransfer, StoreError> {
    let traces = store.block_traces(block_hash)?;
    Ok(block_transfers(block_hash, &traces))
}

/// Returns the decoded traces without invoking the extractor.
pub fn transfer_logs_by_hash<D: BlobDb>(
    store: &TraceStore<D>,
    block_hash: H256,
) -> Result<Vec<TxTrace>, StoreError> {
    store.block_traces(block_hash)
}
