//! Hex and stack-word helpers shared across the tracing pipeline.

use ethers::{
    types::{H160, U256},
    utils::to_checksum,
};
use hex::FromHexError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum UtilsError {
    #[error("Hex utils error {0}")]
    HexUtils(#[from] FromHexError),
}

/// Converts bytes to 0x-prefixed hex string.
pub fn hex_encode<T: AsRef<[u8]>>(bytes: T) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Converts hex string (optional 0x prefix, odd nibble counts allowed) to bytes.
pub fn hex_decode<T: AsRef<str>>(string: T) -> Result<Vec<u8>, UtilsError> {
    let s = string.as_ref().trim_start_matches("0x");
    if s.len() % 2 == 1 {
        let mut padded = String::with_capacity(s.len() + 1);
        padded.push('0');
        padded.push_str(s);
        return Ok(hex::decode(padded)?);
    }
    Ok(hex::decode(s)?)
}

/// Renders one 256-bit stack word as a 32-byte big-endian hex string (no prefix).
pub fn format_stack_word(word: &U256) -> String {
    format!("{word:064x}")
}

/// Parses a stored stack word. Malformed input reads as zero so that
/// downstream status checks fail rather than abort extraction.
pub fn parse_stack_word<T: AsRef<str>>(word: T) -> U256 {
    let s = word.as_ref().trim_start_matches("0x");
    if s.is_empty() {
        return U256::zero();
    }
    match U256::from_str_radix(s, 16) {
        Ok(value) => value,
        Err(_) => U256::zero(),
    }
}

/// Truncates a 256-bit word to its low 20 bytes, the EVM address convention.
pub fn word_to_address(word: &U256) -> H160 {
    let mut bytes = [0u8; 32];
    word.to_big_endian(&mut bytes);
    H160::from_slice(&bytes[12..])
}

/// Renders an address in EIP-55 mixed-case checksum form.
pub fn checksum_address(address: &H160) -> String {
    to_checksum(address, None)
}
