//! Output records describing value movement caused by call-family opcodes.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Outcome of one transfer, as rendered on the JSON surface.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Success,
    Failed,
}

impl Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferStatus::Success => write!(f, "success"),
            TransferStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One value (or control) movement inside a transaction.
///
/// `to` and `amount` stay empty for the delegating call variants
/// (CALLCODE, DELEGATECALL, STATICCALL) which move no value of their own.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferTx {
    /// Lowercase opcode name, e.g. "call" or "create2".
    #[serde(rename = "type")]
    pub kind: String,
    pub status: TransferStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub err_msg: String,
    /// 0x-prefixed transaction hash.
    pub hash: String,
    pub from: String,
    pub to: String,
    pub depth: u64,
    /// Hex-encoded 256-bit big-endian value, leading zeros preserved.
    #[serde(rename = "value")]
    pub amount: String,
}

/// All transfers extracted from the traces of one block.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTransfer {
    /// 0x-prefixed block hash.
    pub hash: String,
    pub transfers: Vec<TransferTx>,
}
