//! Small shared helpers for the etchash workspace.
//!
//! Kept deliberately tiny: the workspace has exactly one cross-cutting need,
//! formatting/parsing the 32-byte hashes that flow through logging and tests
//! as hex strings.

use hex::FromHexError;

/// Converts a byte slice to a lowercase hex string.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Parses a hex string into a fixed-size 32-byte array.
///
/// Accepts an optional `0x` prefix, matching how block explorers and test
/// vectors commonly present hashes.
pub fn hex_to_h256(s: &str) -> Result<[u8; 32], FromHexError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let mut out = [0u8; 32];
    hex::decode_to_slice(s, &mut out)?;
    Ok(out)
}
