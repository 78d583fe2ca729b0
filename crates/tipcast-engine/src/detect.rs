//! New-block detection.

/// A tip hash we have not accepted yet counts as new; so does the very
/// first tip seen after a fresh start (`last_block_hash` absent).
pub fn is_new_block(tip_hash: &str, last_block_hash: Option<&str>) -> bool {
    last_block_hash != Some(tip_hash)
}
