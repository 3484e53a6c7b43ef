//! One-byte EVM instruction identifiers.
//!
//! The transfer pipeline only dispatches on the call-family subset, but
//! filtered traces retain arbitrary instructions, so every defined opcode
//! can be named for the JSON log view.

use std::fmt::Display;
use std::str::FromStr;

use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum OpCodeError {
    #[error("Unknown opcode name {0}")]
    UnknownName(String),
}

/// A single EVM instruction identifier.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct OpCode(pub u8);

impl OpCode {
    pub const STOP: OpCode = OpCode(0x00);
    pub const JUMPI: OpCode = OpCode(0x57);
    pub const PUSH1: OpCode = OpCode(0x60);
    pub const CREATE: OpCode = OpCode(0xf0);
    pub const CALL: OpCode = OpCode(0xf1);
    pub const CALLCODE: OpCode = OpCode(0xf2);
    pub const RETURN: OpCode = OpCode(0xf3);
    pub const DELEGATECALL: OpCode = OpCode(0xf4);
    pub const CREATE2: OpCode = OpCode(0xf5);
    pub const STATICCALL: OpCode = OpCode(0xfa);
    pub const REVERT: OpCode = OpCode(0xfd);
    pub const INVALID: OpCode = OpCode(0xfe);
    pub const SELFDESTRUCT: OpCode = OpCode(0xff);

    /// True for the call-family instructions the recorder and extractor
    /// dispatch on: CALL, CALLCODE, DELEGATECALL, STATICCALL, CREATE, CREATE2.
    pub fn is_cared(&self) -> bool {
        matches!(
            *self,
            OpCode::CALL
                | OpCode::CALLCODE
                | OpCode::DELEGATECALL
                | OpCode::STATICCALL
                | OpCode::CREATE
                | OpCode::CREATE2
        )
    }

    /// Canonical instruction name, if the byte is a defined opcode.
    pub fn name(&self) -> Option<&'static str> {
        OPCODE_NAMES[self.0 as usize]
    }

    /// Looks an instruction up by its canonical name.
    pub fn from_name(name: &str) -> Result<OpCode, OpCodeError> {
        OPCODE_NAMES
            .iter()
            .position(|entry| *entry == Some(name))
            .map(|byte| OpCode(byte as u8))
            .ok_or_else(|| OpCodeError::UnknownName(name.to_string()))
    }
}

impl Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "opcode 0x{:02x}", self.0),
        }
    }
}

impl FromStr for OpCode {
    type Err = OpCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(hex_byte) = s.strip_prefix("opcode 0x") {
            return u8::from_str_radix(hex_byte, 16)
                .map(OpCode)
                .map_err(|_| OpCodeError::UnknownName(s.to_string()));
        }
        OpCode::from_name(s)
    }
}

impl Serialize for OpCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OpCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        OpCode::from_str(&name).map_err(de::Error::custom)
    }
}

impl Encodable for OpCode {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.append(&self.0);
    }
}

impl Decodable for OpCode {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        Ok(OpCode(rlp.as_val()?))
    }
}

#[rustfmt::skip]
static OPCODE_NAMES: [Option<&str>; 256] = [
    // 0x00 range - arithmetic ops.
    Some("STOP"), Some("ADD"), Some("MUL"), Some("SUB"),
    Some("DIV"), Some("SDIV"), Some("MOD"), Some("SMOD"),
    Some("ADDMOD"), Some("MULMOD"), Some("EXP"), Some("SIGNEXTEND"),
    None, None, None, None,
    // 0x10 range - comparison and bitwise ops.
    Some("LT"), Some("GT"), Some("SLT"), Some("SGT"),
    Some("EQ"), Some("ISZERO"), Some("AND"), Some("OR"),
    Some("XOR"), Some("NOT"), Some("BYTE"), Some("SHL"),
    Some("SHR"), Some("SAR"), None, None,
    // 0x20 range - crypto.
    Some("KECCAK256"), None, None, None, None, None, None, None,
    None, None, None, None, None, None, None, None,
    // 0x30 range - environment.
    Some("ADDRESS"), Some("BALANCE"), Some("ORIGIN"), Some("CALLER"),
    Some("CALLVALUE"), Some("CALLDATALOAD"), Some("CALLDATASIZE"), Some("CALLDATACOPY"),
    Some("CODESIZE"), Some("CODECOPY"), Some("GASPRICE"), Some("EXTCODESIZE"),
    Some("EXTCODECOPY"), Some("RETURNDATASIZE"), Some("RETURNDATACOPY"), Some("EXTCODEHASH"),
    // 0x40 range - block information.
    Some("BLOCKHASH"), Some("COINBASE"), Some("TIMESTAMP"), Some("NUMBER"),
    Some("PREVRANDAO"), Some("GASLIMIT"), Some("CHAINID"), Some("SELFBALANCE"),
    Some("BASEFEE"), Some("BLOBHASH"), Some("BLOBBASEFEE"), None,
    None, None, None, None,
    // 0x50 range - stack, memory, storage and flow.
    Some("POP"), Some("MLOAD"), Some("MSTORE"), Some("MSTORE8"),
    Some("SLOAD"), Some("SSTORE"), Some("JUMP"), Some("JUMPI"),
    Some("PC"), Some("MSIZE"), Some("GAS"), Some("JUMPDEST"),
    Some("TLOAD"), Some("TSTORE"), Some("MCOPY"), Some("PUSH0"),
    // 0x60 range - pushes.
    Some("PUSH1"), Some("PUSH2"), Some("PUSH3"), Some("PUSH4"),
    Some("PUSH5"), Some("PUSH6"), Some("PUSH7"), Some("PUSH8"),
    Some("PUSH9"), Some("PUSH10"), Some("PUSH11"), Some("PUSH12"),
    Some("PUSH13"), Some("PUSH14"), Some("PUSH15"), Some("PUSH16"),
    Some("PUSH17"), Some("PUSH18"), Some("PUSH19"), Some("PUSH20"),
    Some("PUSH21"), Some("PUSH22"), Some("PUSH23"), Some("PUSH24"),
    Some("PUSH25"), Some("PUSH26"), Some("PUSH27"), Some("PUSH28"),
    Some("PUSH29"), Some("PUSH30"), Some("PUSH31"), Some("PUSH32"),
    // 0x80 range - dups.
    Some("DUP1"), Some("DUP2"), Some("DUP3"), Some("DUP4"),
    Some("DUP5"), Some("DUP6"), Some("DUP7"), Some("DUP8"),
    Some("DUP9"), Some("DUP10"), Some("DUP11"), Some("DUP12"),
    Some("DUP13"), Some("DUP14"), Some("DUP15"), Some("DUP16"),
    // 0x90 range - swaps.
    Some("SWAP1"), Some("SWAP2"), Some("SWAP3"), Some("SWAP4"),
    Some("SWAP5"), Some("SWAP6"), Some("SWAP7"), Some("SWAP8"),
    Some("SWAP9"), Some("SWAP10"), Some("SWAP11"), Some("SWAP12"),
    Some("SWAP13"), Some("SWAP14"), Some("SWAP15"), Some("SWAP16"),
    // 0xa0 range - logging.
    Some("LOG0"), Some("LOG1"), Some("LOG2"), Some("LOG3"),
    Some("LOG4"), None, None, None,
    None, None, None, None, None, None, None, None,
    // 0xb0 range.
    None, None, None, None, None, None, None, None,
    None, None, None, None, None, None, None, None,
    // 0xc0 range.
    None, None, None, None, None, None, None, None,
    None, None, None, None, None, None, None, None,
    // 0xd0 range.
    None, None, None, None, None, None, None, None,
    None, None, None, None, None, None, None, None,
    // 0xe0 range.
    None, None, None, None, None, None, None, None,
    None, None, None, None, None, None, None, None,
    // 0xf0 range - closures and system ops.
    Some("CREATE"), Some("CALL"), Some("CALLCODE"), Some("RETURN"),
    Some("DELEGATECALL"), Some("CREATE2"), None, None,
    None, None, Some("STATICCALL"), None,
    None, Some("REVERT"), Some("INVALID"), Some("SELFDESTRUCT"),
];
