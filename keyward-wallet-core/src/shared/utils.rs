//! Utility functions for the wallet core

/// Generate a unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Render bytes as `0x`-prefixed lower-case hex
pub fn to_prefixed_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode hex with or without a `0x` prefix
pub fn decode_prefixed_hex(input: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let trimmed = input.trim();
    let clean = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(clean)
}
