//! RLP-encoded trace blobs keyed by block hash.

use ethers::types::H256;
use log::debug;
use rlp::Rlp;

use innertx_types::{step::TxTrace, utils::hex_encode};

use crate::{db::BlobDb, error::StoreError, upgrade};

/// Key of the schema version sentinel: its value is the ASCII decimal
/// version number.
pub const VERSION_KEY: &[u8] = b"version_code";

/// Put/get access to per-block trace blobs, with schema upgrades applied
/// once at open, before any other consumer can observe the database.
#[derive(Debug)]
pub struct TraceStore<D: BlobDb> {
    db: D,
}

impl<D: BlobDb> TraceStore<D> {
    pub fn open(mut db: D) -> Result<Self, StoreError> {
        upgrade::run_upgrades(&mut db)?;
        Ok(Self { db })
    }

    /// Persists the traces of one block under its hash.
    pub fn put_block_traces(
        &mut self,
        block_hash: H256,
        traces: &[TxTrace],
    ) -> Result<(), StoreError> {
        let blob = rlp::encode_list::<TxTrace, TxTrace>(traces);
        debug!(
            "storing {} tx traces ({} bytes) under {}",
            traces.len(),
            blob.len(),
            hex_encode(block_hash)
        );
        self.db.put(block_hash.as_bytes(), &blob)
    }

    /// Decodes the traces of one block. Fails with [`StoreError::NotFound`]
    /// when no blob exists for the hash.
    pub fn block_traces(&self, block_hash: H256) -> Result<Vec<TxTrace>, StoreError> {
        let blob = self
            .db
            .get(block_hash.as_bytes())?
            .ok_or_else(|| StoreError::NotFound(hex_encode(block_hash)))?;
        let traces = Rlp::new(&blob).as_list()?;
        Ok(traces)
    }

    /// Current schema version (0 when the sentinel is absent).
    pub fn version(&self) -> Result<u64, StoreError> {
        upgrade::current_version(&self.db)
    }
}
