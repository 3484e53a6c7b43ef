//! Errors surfaced by the trace blob store.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error {0}")]
    Io(#[from] io::Error),
    #[error("RLP decode error {0}")]
    Decode(#[from] rlp::DecoderError),
    #[error("No trace blob stored under key {0}")]
    NotFound(String),
    #[error("Unrecognized schema version sentinel {0}")]
    Version(String),
}
