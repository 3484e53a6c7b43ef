pub mod extract;
pub mod query;
pub mod status;
pub mod tree;

pub use extract::{block_transfers, extract_transfers};
pub use query::{block_transfers_by_hash, transfer_logs_by_hash};
