//! End-to-end checks for the trace blob store: blob round-trips, legacy
//! blob acceptance and the one-shot v0 -> v1 schema upgrade.

use std::fs;

use ethers::types::H256;
use rlp::RlpStream;

use innertx_store::{DirDb, MemoryDb, StoreError, TraceStore, VERSION_KEY};
use innertx_types::{
    opcode::OpCode,
    step::{StepRecord, TxTrace, RECEIPT_STATUS_SUCCESS},
};

fn sample_trace() -> TxTrace {
    TxTrace {
        hash: format!("0x{}", "11".repeat(32)),
        receipt_status: RECEIPT_STATUS_SUCCESS,
        tx_to_addr: "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".to_string(),
        logs: vec![StepRecord {
            from: "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".to_string(),
            pc: 0,
            op: OpCode::CALL,
            gas: 21000,
            gas_cost: 700,
            depth: 1,
            stack: vec![
                "0000000000000000000000000000000000000000000000000000000000000001"
                    .to_string(),
            ],
            err_msg: String::new(),
        }],
    }
}

/// A blob written before the errMsg field existed: step lists have 7 items.
fn v0_blob(trace: &TxTrace) -> Vec<u8> {
    let mut logs = RlpStream::new_list(trace.logs.len());
    for log in &trace.logs {
        let mut step = RlpStream::new_list(7);
        step.append(&log.from);
        step.append(&log.pc);
        step.append(&log.op);
        step.append(&log.gas);
        step.append(&log.gas_cost);
        step.append(&log.depth);
        step.append_list::<String, String>(&log.stack);
        logs.append_raw(&step.out(), 1);
    }
    let mut encoded = RlpStream::new_list(4);
    encoded.append(&trace.hash);
    encoded.append(&trace.receipt_status);
    encoded.append(&trace.tx_to_addr);
    encoded.append_raw(&logs.out(), 1);
    let mut blob = RlpStream::new_list(1);
    blob.append_raw(&encoded.out(), 1);
    blob.out().to_vec()
}

#[test]
fn test_put_then_get_round_trips() {
    let mut store = TraceStore::open(MemoryDb::new()).unwrap();
    let block_hash = H256::repeat_byte(0xaa);
    let traces = vec![sample_trace(), sample_trace()];
    store.put_block_traces(block_hash, &traces).unwrap();
    assert_eq!(store.block_traces(block_hash).unwrap(), traces);
}

#[test]
fn test_missing_block_is_not_found() {
    let store = TraceStore::open(MemoryDb::new()).unwrap();
    let result = store.block_traces(H256::repeat_byte(0x01));
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[test]
fn test_malformed_blob_is_a_decode_error() {
    let mut db = MemoryDb::new();
    use innertx_store::BlobDb;
    db.put(H256::repeat_byte(2).as_bytes(), b"not rlp at all")
        .unwrap();
    let store = TraceStore::open(db).unwrap();
    let result = store.block_traces(H256::repeat_byte(2));
    assert!(matches!(result, Err(StoreError::Decode(_))));
}

#[test]
fn test_v1_blob_encoding_is_stable() {
    let traces = vec![sample_trace()];
    let blob = rlp::encode_list::<TxTrace, TxTrace>(&traces).to_vec();
    let decoded: Vec<TxTrace> = rlp::Rlp::new(&blob).as_list().unwrap();
    assert_eq!(rlp::encode_list::<TxTrace, TxTrace>(&decoded).to_vec(), blob);
}

#[test]
fn test_open_upgrades_v0_blobs_in_place() {
    use innertx_store::BlobDb;
    let block_hash = H256::repeat_byte(0xbb);
    let trace = sample_trace();

    let mut db = MemoryDb::new();
    db.put(block_hash.as_bytes(), &v0_blob(&trace)).unwrap();

    let store = TraceStore::open(db).unwrap();
    assert_eq!(store.version().unwrap(), 1);
    let decoded = store.block_traces(block_hash).unwrap();
    assert_eq!(decoded, vec![trace.clone()]);
    // The rewritten blob is now in the v1 shape.
    assert_eq!(
        rlp::encode_list::<TxTrace, TxTrace>(&decoded).to_vec(),
        rlp::encode_list::<TxTrace, TxTrace>(&[trace]).to_vec()
    );
}

#[test]
fn test_upgrade_is_idempotent_on_disk() {
    let dir = std::env::temp_dir().join("innertx_store_upgrade_idempotent");
    let _ = fs::remove_dir_all(&dir);
    let trace = sample_trace();
    let block_hash = H256::repeat_byte(0xcc);
    {
        use innertx_store::BlobDb;
        let mut db = DirDb::open(&dir).unwrap();
        db.put(block_hash.as_bytes(), &v0_blob(&trace)).unwrap();
    }

    TraceStore::open(DirDb::open(&dir).unwrap()).unwrap();
    let blob_path = dir.join(hex::encode(block_hash.as_bytes()));
    let after_first = fs::read(&blob_path).unwrap();
    let version_path = dir.join(hex::encode(VERSION_KEY));
    assert_eq!(fs::read(&version_path).unwrap(), b"1");

    TraceStore::open(DirDb::open(&dir).unwrap()).unwrap();
    let after_second = fs::read(&blob_path).unwrap();
    assert_eq!(after_first, after_second);
    assert_eq!(fs::read(&version_path).unwrap(), b"1");

    fs::remove_dir_all(&dir).unwrap();
}
