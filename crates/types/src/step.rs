//! Filtered per-step records and the per-transaction trace envelope.
//!
//! These are the units the recorder emits and the blob store persists.
//! The RLP layout is part of the storage contract: a step encodes as
//! `[from, pc, op, gas, gasCost, depth, stack, errMsg]` and a trace as
//! `[hash, receiptStatus, txToAddr, logs]`. Records written before the
//! v1 schema lack the trailing `errMsg`; the decoder accepts both shapes.

use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};

use crate::opcode::OpCode;

/// On-chain outcome of a whole transaction: failed.
pub const RECEIPT_STATUS_FAILED: u64 = 0;
/// On-chain outcome of a whole transaction: successful.
pub const RECEIPT_STATUS_SUCCESS: u64 = 1;

/// Maximum number of stack words a record retains (topmost first dropped last).
pub const STACK_TAIL_LEN: usize = 4;

/// One filtered EVM step.
///
/// `stack` holds at most [`STACK_TAIL_LEN`] words in bottom-first order,
/// each a 32-byte big-endian hex string, so `stack[len - 1]` is the top of
/// the operand stack when the instruction executed.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    /// EIP-55 address of the contract that executed the instruction.
    pub from: String,
    pub pc: u64,
    pub op: OpCode,
    pub gas: u64,
    pub gas_cost: u64,
    /// Call depth, 1-based.
    pub depth: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stack: Vec<String>,
    /// Empty when the step completed without error.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub err_msg: String,
}

impl Encodable for StepRecord {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(8);
        s.append(&self.from);
        s.append(&self.pc);
        s.append(&self.op);
        s.append(&self.gas);
        s.append(&self.gas_cost);
        s.append(&self.depth);
        s.append_list::<String, String>(&self.stack);
        s.append(&self.err_msg);
    }
}

impl Decodable for StepRecord {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        // Pre-errMsg records are 7 items long.
        let err_msg = match rlp.item_count()? {
            7 => String::new(),
            8 => rlp.val_at(7)?,
            _ => return Err(DecoderError::RlpIncorrectListLen),
        };
        Ok(StepRecord {
            from: rlp.val_at(0)?,
            pc: rlp.val_at(1)?,
            op: rlp.val_at(2)?,
            gas: rlp.val_at(3)?,
            gas_cost: rlp.val_at(4)?,
            depth: rlp.val_at(5)?,
            stack: rlp.list_at(6)?,
            err_msg,
        })
    }
}

/// All filtered steps of one transaction, plus its on-chain outcome.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxTrace {
    /// 0x-prefixed transaction hash.
    pub hash: String,
    pub receipt_status: u64,
    #[serde(rename = "ToAddr")]
    pub tx_to_addr: String,
    pub logs: Vec<StepRecord>,
}

impl Encodable for TxTrace {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(4);
        s.append(&self.hash);
        s.append(&self.receipt_status);
        s.append(&self.tx_to_addr);
        s.append_list::<StepRecord, StepRecord>(&self.logs);
    }
}

impl Decodable for TxTrace {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        Ok(TxTrace {
            hash: rlp.val_at(0)?,
            receipt_status: rlp.val_at(1)?,
            tx_to_addr: rlp.val_at(2)?,
            logs: rlp.list_at(3)?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_step() -> StepRecord {
        StepRecord {
            from: "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".to_string(),
            pc: 42,
            op: OpCode::CALL,
            gas: 90_000,
            gas_cost: 700,
            depth: 1,
            stack: vec![
                "0000000000000000000000000000000000000000000000000000000000000005"
                    .to_string(),
            ],
            err_msg: String::new(),
        }
    }

    #[test]
    fn test_step_record_rlp_round_trip() {
        let step = sample_step();
        let encoded = rlp::encode(&step);
        let decoded: StepRecord = rlp::decode(&encoded).unwrap();
        assert_eq!(decoded, step);
    }

    #[test]
    fn test_step_record_decodes_seven_item_legacy_shape() {
        let step = sample_step();
        let mut s = RlpStream::new_list(7);
        s.append(&step.from);
        s.append(&step.pc);
        s.append(&step.op);
        s.append(&step.gas);
        s.append(&step.gas_cost);
        s.append(&step.depth);
        s.append_list::<String, String>(&step.stack);
        let decoded: StepRecord = rlp::decode(&s.out()).unwrap();
        assert_eq!(decoded, step);
        assert!(decoded.err_msg.is_empty());
    }

    #[test]
    fn test_step_record_rejects_other_list_lengths() {
        let mut s = RlpStream::new_list(2);
        s.append(&"0xabc".to_string());
        s.append(&1u64);
        let decoded: Result<StepRecord, _> = rlp::decode(&s.out());
        assert_eq!(decoded, Err(DecoderError::RlpIncorrectListLen));
    }

    #[test]
    fn test_tx_trace_rlp_round_trip() {
        let trace = TxTrace {
            hash: "0x0101010101010101010101010101010101010101010101010101010101010101"
                .to_string(),
            receipt_status: RECEIPT_STATUS_SUCCESS,
            tx_to_addr: "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".to_string(),
            logs: vec![sample_step(), sample_step()],
        };
        let encoded = rlp::encode(&trace);
        let decoded: TxTrace = rlp::decode(&encoded).unwrap();
        assert_eq!(decoded, trace);
    }

    #[test]
    fn test_step_record_json_field_names() {
        let mut step = sample_step();
        step.err_msg = "out of gas".to_string();
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["op"], "CALL");
        assert_eq!(json["gasCost"], 700);
        assert_eq!(json["errMsg"], "out of gas");
        assert!(json.get("err_msg").is_none());
    }

    #[test]
    fn test_json_omits_empty_stack_and_err_msg() {
        let mut step = sample_step();
        step.stack.clear();
        let json = serde_json::to_value(&step).unwrap();
        assert!(json.get("stack").is_none());
        assert!(json.get("errMsg").is_none());
    }

    #[test]
    fn test_tx_trace_json_to_addr_capitalization() {
        let trace = TxTrace {
            hash: "0xff".to_string(),
            receipt_status: RECEIPT_STATUS_FAILED,
            tx_to_addr: "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".to_string(),
            logs: vec![],
        };
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["receiptStatus"], 0);
        assert!(json.get("ToAddr").is_some());
    }
}
