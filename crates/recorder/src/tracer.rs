//! The hook interface an EVM drives while executing a transaction.
//!
//! The VM is an external collaborator; it sees nothing but this trait.
//! Hooks are infallible by contract: implementations must neither panic
//! nor return errors into the interpreter loop.

use ethers::types::{H160, H256, U256};

use innertx_types::opcode::OpCode;

/// Borrowed view of the execution scope at one step.
#[derive(Clone, Copy, Debug)]
pub struct StepScope<'a> {
    /// Address of the contract whose code is executing.
    pub contract: H160,
    /// Operand stack, bottom-first (`stack[len - 1]` is the top).
    pub stack: &'a [U256],
}

/// Per-transaction observer hooks, called in execution order.
///
/// Lifecycle: `capture_tx` brackets the start, then `capture_state` /
/// `capture_fault` fire once per instruction, then `capture_end` closes
/// the transaction. `finish_capture` unconditionally resets state, e.g.
/// when a transaction is abandoned mid-flight.
pub trait StepTracer {
    fn capture_tx(&mut self, hash: H256);

    #[allow(clippy::too_many_arguments)]
    fn capture_state(
        &mut self,
        pc: u64,
        op: OpCode,
        gas: u64,
        cost: u64,
        scope: StepScope<'_>,
        depth: u64,
        err: Option<&str>,
    );

    #[allow(clippy::too_many_arguments)]
    fn capture_fault(
        &mut self,
        pc: u64,
        op: OpCode,
        gas: u64,
        cost: u64,
        scope: StepScope<'_>,
        depth: u64,
        err: Option<&str>,
    );

    fn capture_end(&mut self);

    fn finish_capture(&mut self);
}
