//! Filtered step recorder.
//!
//! Steps are judged one step late: when step k+1 arrives, the buffered
//! step k is committed iff it carried an error, is a call-family op,
//! follows a call-family op at the same depth, or immediately precedes a
//! depth increase. The last rule keeps the step whose stack top confirms
//! a sub-call's outcome during transfer extraction.

use ethers::types::{H160, H256, U256};

use innertx_types::{
    opcode::OpCode,
    step::{StepRecord, TxTrace, STACK_TAIL_LEN},
    utils::{checksum_address, format_stack_word, hex_encode},
};

use crate::tracer::{StepScope, StepTracer};

/// A raw step held back until its successor shows whether it matters.
#[derive(Clone, Debug)]
struct PendingStep {
    contract: H160,
    pc: u64,
    op: OpCode,
    gas: u64,
    cost: u64,
    stack: Vec<U256>,
    depth: u64,
    err: Option<String>,
}

impl PendingStep {
    fn into_record(self) -> StepRecord {
        StepRecord {
            from: checksum_address(&self.contract),
            pc: self.pc,
            op: self.op,
            gas: self.gas,
            gas_cost: self.cost,
            depth: self.depth,
            stack: self.stack.iter().map(format_stack_word).collect(),
            err_msg: self.err.unwrap_or_default(),
        }
    }
}

/// Records the call-family subset of one transaction's steps.
///
/// One recorder observes one transaction at a time; concurrent
/// transactions need their own instances.
#[derive(Debug, Default)]
pub struct TransferRecorder {
    hash: H256,
    logs: Vec<StepRecord>,
    /// Whether the last processed-out step at each depth was call-family.
    cared_op_in_depth: Vec<bool>,
    last: Option<PendingStep>,
}

impl TransferRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots the committed steps into a [`TxTrace`]. Call after
    /// `capture_end`; the receipt status and top-level recipient come from
    /// the enclosing node, which learns them only once the receipt exists.
    pub fn take_trace(&mut self, receipt_status: u64, to_addr: Option<H160>) -> TxTrace {
        TxTrace {
            hash: hex_encode(self.hash),
            receipt_status,
            tx_to_addr: to_addr.map(|a| checksum_address(&a)).unwrap_or_default(),
            logs: std::mem::take(&mut self.logs),
        }
    }

    fn cared_at(&self, depth: u64) -> bool {
        self.cared_op_in_depth
            .get(depth as usize)
            .copied()
            .unwrap_or(false)
    }

    fn note_processed_out(&mut self, depth: u64, cared: bool) {
        let index = depth as usize;
        if self.cared_op_in_depth.len() <= index {
            self.cared_op_in_depth.resize(index + 1, false);
        }
        self.cared_op_in_depth[index] = cared;
    }

    /// Applies the keep policy to the buffered step, then buffers the new one.
    fn push_step(&mut self, step: PendingStep) {
        if let Some(last) = self.last.take() {
            let keep = last.err.is_some()
                || last.op.is_cared()
                || self.cared_at(last.depth)
                || last.depth < step.depth;
            self.note_processed_out(last.depth, last.op.is_cared());
            if keep {
                self.logs.push(last.into_record());
            }
        }
        self.last = Some(step);
    }

    fn project_stack(stack: &[U256]) -> Vec<U256> {
        let skip = stack.len().saturating_sub(STACK_TAIL_LEN);
        stack[skip..].to_vec()
    }
}

impl StepTracer for TransferRecorder {
    fn capture_tx(&mut self, hash: H256) {
        self.hash = hash;
        self.logs.clear();
        self.cared_op_in_depth.clear();
        self.last = None;
    }

    fn capture_state(
        &mut self,
        pc: u64,
        op: OpCode,
        gas: u64,
        cost: u64,
        scope: StepScope<'_>,
        depth: u64,
        err: Option<&str>,
    ) {
        self.push_step(PendingStep {
            contract: scope.contract,
            pc,
            op,
            gas,
            cost,
            stack: Self::project_stack(scope.stack),
            depth,
            err: err.map(str::to_string),
        });
    }

    fn capture_fault(
        &mut self,
        pc: u64,
        op: OpCode,
        gas: u64,
        cost: u64,
        scope: StepScope<'_>,
        depth: u64,
        err: Option<&str>,
    ) {
        // Faults without an error message carry no information.
        if err.is_none() {
            return;
        }
        self.push_step(PendingStep {
            contract: scope.contract,
            pc,
            op,
            gas,
            cost,
            stack: Vec::new(),
            depth,
            err: err.map(str::to_string),
        });
    }

    fn capture_end(&mut self) {
        // No successor exists, so the depth-increase rule cannot apply.
        if let Some(last) = self.last.take() {
            let keep = last.err.is_some() || last.op.is_cared() || self.cared_at(last.depth);
            if keep {
                self.logs.push(last.into_record());
            }
        }
    }

    fn finish_capture(&mut self) {
        self.logs.clear();
        self.cared_op_in_depth.clear();
        self.last = None;
    }
}
