//! Walks the annotated call tree and emits one transfer per effective
//! call-family step.
//!
//! A call's outcome is confirmed from the step that follows it in the same
//! frame: the sub-call's return value sits on top of that step's stack.
//! CALL-family ops push 1 on success; CREATE-family ops push the deployed
//! address, so zero means failure.

use ethers::types::{H256, U256};

use innertx_types::{
    opcode::OpCode,
    step::{StepRecord, TxTrace, RECEIPT_STATUS_FAILED},
    transfer::{BlockTransfer, TransferStatus, TransferTx},
    utils::{checksum_address, hex_decode, hex_encode, parse_stack_word, word_to_address},
};

use crate::status::propagate_failures;
use crate::tree::{build_call_tree, CallNode, CallTree, ROOT};

/// Extracts every transfer performed inside one transaction, in pre-order
/// of the call tree with in-frame steps in their original order.
pub fn extract_transfers(trace: &TxTrace) -> Vec<TransferTx> {
    let mut tree = build_call_tree(&trace.logs);
    propagate_failures(&mut tree, &trace.logs);

    let mut transfers = Vec::new();
    visit(
        &mut tree,
        &trace.logs,
        &trace.hash,
        trace.receipt_status,
        ROOT,
        &mut transfers,
    );
    transfers
}

/// Extracts the transfers of a whole block's traces, in trace order.
pub fn block_transfers(block_hash: H256, traces: &[TxTrace]) -> BlockTransfer {
    let mut transfers = Vec::new();
    for trace in traces {
        transfers.extend(extract_transfers(trace));
    }
    BlockTransfer {
        hash: hex_encode(block_hash),
        transfers,
    }
}

fn visit(
    tree: &mut CallTree,
    steps: &[StepRecord],
    hash: &str,
    receipt_status: u64,
    index: usize,
    out: &mut Vec<TransferTx>,
) {
    // A failed parent fails this frame before its steps are read; this is
    // what carries failure past the immediate parent-and-siblings marking.
    if let Some(parent) = tree.nodes[index].parent {
        let parent_success = tree.nodes[parent].success;
        let parent_err = tree.nodes[parent].err_msg.clone();
        let node = &mut tree.nodes[index];
        if node.success && !parent_success {
            node.success = false;
            node.err_msg = parent_err;
        }
    }

    for position in 0..tree.nodes[index].logs.len() {
        let step = &steps[tree.nodes[index].logs[position]];
        let Some(handler) = handler_for(step.op) else {
            continue;
        };
        let node = &mut tree.nodes[index];
        let transfer = match handler {
            Handler::Call => handle_call(hash, receipt_status, position, steps, node),
            Handler::Create => handle_create(hash, receipt_status, position, steps, node),
            Handler::OtherCalls => {
                handle_other_calls(hash, receipt_status, position, steps, node)
            }
        };
        if let Some(transfer) = transfer {
            out.push(transfer);
        }
    }

    let children = tree.nodes[index].children.clone();
    for child in children {
        visit(tree, steps, hash, receipt_status, child, out);
    }
}

/// The closed call-family set dispatches to three handlers.
enum Handler {
    Call,
    Create,
    OtherCalls,
}

fn handler_for(op: OpCode) -> Option<Handler> {
    match op {
        OpCode::CALL => Some(Handler::Call),
        OpCode::CREATE | OpCode::CREATE2 => Some(Handler::Create),
        OpCode::CALLCODE | OpCode::DELEGATECALL | OpCode::STATICCALL => {
            Some(Handler::OtherCalls)
        }
        _ => None,
    }
}

/// How the next step's stack top reads when the dispatched op succeeded.
enum NextTopCheck {
    /// CALL variants push exactly 1 on success.
    One,
    /// CREATE variants push the deployed address; zero means failure.
    NonZero,
}

/// Where the status ladder settled for one dispatched step.
enum Outcome {
    NodeError,
    NoNextStep,
    NextCheckFailed { next_top: String },
    ReceiptFailed,
    Confirmed,
}

/// Runs the status ladder shared by every handler. Mutates the frame:
/// a failed next-step check poisons it for the steps that follow, and a
/// confirmed transfer re-affirms it.
fn settle(
    node: &mut CallNode,
    steps: &[StepRecord],
    position: usize,
    receipt_status: u64,
    check: NextTopCheck,
) -> Outcome {
    if !node.success {
        return Outcome::NodeError;
    }
    // Without a next step in this frame the outcome cannot be confirmed;
    // treat as failed.
    if position == node.logs.len() - 1 {
        return Outcome::NoNextStep;
    }

    let next = &steps[node.logs[position + 1]];
    let next_top = next.stack.last().cloned().unwrap_or_default();
    let word = parse_stack_word(&next_top);
    let confirmed = match check {
        NextTopCheck::One => word == U256::one(),
        NextTopCheck::NonZero => !word.is_zero(),
    };
    if !confirmed {
        node.success = false;
        node.err_msg = steps[node.logs[position]].err_msg.clone();
        return Outcome::NextCheckFailed { next_top };
    }

    if receipt_status == RECEIPT_STATUS_FAILED {
        return Outcome::ReceiptFailed;
    }
    node.success = true;
    Outcome::Confirmed
}

/// Applies a settled outcome to the transfer record. Reads the frame's
/// error message after [`settle`] has updated it.
fn apply_outcome(transfer: &mut TransferTx, outcome: &Outcome, node: &CallNode) {
    match outcome {
        Outcome::NodeError => {
            transfer.status = TransferStatus::Failed;
            transfer.err_msg = format!("node error:{}", node.err_msg);
        }
        Outcome::NoNextStep => {
            transfer.status = TransferStatus::Failed;
            transfer.err_msg = format!("no next op:{}", node.err_msg);
        }
        Outcome::NextCheckFailed { next_top } => {
            transfer.status = TransferStatus::Failed;
            transfer.err_msg = format!("next op zero:{}:{}", next_top, node.err_msg);
        }
        Outcome::ReceiptFailed => {
            transfer.status = TransferStatus::Failed;
            transfer.err_msg = "failed tx".to_string();
        }
        Outcome::Confirmed => {
            transfer.status = TransferStatus::Success;
        }
    }
}

fn transfer_scaffold(step: &StepRecord, hash: &str) -> TransferTx {
    TransferTx {
        kind: step.op.to_string().to_lowercase(),
        status: TransferStatus::Failed,
        err_msg: String::new(),
        hash: hash.to_string(),
        from: step.from.clone(),
        to: String::new(),
        depth: step.depth,
        amount: String::new(),
    }
}

/// Re-encodes a stored stack word as 0x-prefixed hex, preserving the full
/// 32-byte width the recorder wrote.
fn amount_hex(word: &str) -> String {
    hex_encode(hex_decode(word).unwrap_or_default())
}

fn address_from_word(word: &str) -> String {
    checksum_address(&word_to_address(&parse_stack_word(word)))
}

/// CALL moves value when its third-from-top stack word is non-zero; a
/// zero-value or short-stacked CALL emits nothing.
fn handle_call(
    hash: &str,
    receipt_status: u64,
    position: usize,
    steps: &[StepRecord],
    node: &mut CallNode,
) -> Option<TransferTx> {
    let step = &steps[node.logs[position]];
    if step.stack.len() <= 3 {
        return None;
    }
    let value = &step.stack[step.stack.len() - 3];
    if parse_stack_word(value).is_zero() {
        return None;
    }

    let mut transfer = transfer_scaffold(step, hash);
    transfer.amount = amount_hex(value);
    transfer.to = address_from_word(&step.stack[step.stack.len() - 2]);

    let outcome = settle(node, steps, position, receipt_status, NextTopCheck::One);
    apply_outcome(&mut transfer, &outcome, node);
    Some(transfer)
}

/// CREATE and CREATE2 transfer their endowment to the deployed contract,
/// whose address only exists on the stack of the following step.
fn handle_create(
    hash: &str,
    receipt_status: u64,
    position: usize,
    steps: &[StepRecord],
    node: &mut CallNode,
) -> Option<TransferTx> {
    let step = &steps[node.logs[position]];
    let mut transfer = transfer_scaffold(step, hash);

    let outcome = settle(node, steps, position, receipt_status, NextTopCheck::NonZero);
    if matches!(outcome, Outcome::ReceiptFailed | Outcome::Confirmed) {
        // Deployment confirmed: the next stack top is the new address and
        // the opening step's top is the endowment.
        let next = &steps[node.logs[position + 1]];
        if let Some(next_top) = next.stack.last() {
            transfer.to = address_from_word(next_top);
        }
        if let Some(endowment) = step.stack.last() {
            transfer.amount = amount_hex(endowment);
        }
    }
    apply_outcome(&mut transfer, &outcome, node);
    Some(transfer)
}

/// CALLCODE, DELEGATECALL and STATICCALL either delegate context or move
/// no value; only their outcome is reported.
fn handle_other_calls(
    hash: &str,
    receipt_status: u64,
    position: usize,
    steps: &[StepRecord],
    node: &mut CallNode,
) -> Option<TransferTx> {
    let step = &steps[node.logs[position]];
    let mut transfer = transfer_scaffold(step, hash);

    let outcome = settle(node, steps, position, receipt_status, NextTopCheck::One);
    apply_outcome(&mut transfer, &outcome, node);
    Some(transfer)
}
