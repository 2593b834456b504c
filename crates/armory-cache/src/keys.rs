//! Cache keys and content fingerprints.

use armory_core::{Endpoint, Language, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Number of hex characters shown in hash previews.
pub const HASH_PREVIEW_LEN: usize = 8;

/// Cache key for an endpoint in a language, e.g. `SKINS_en`.
pub fn cache_key(endpoint: Endpoint, language: Language) -> String {
    format!("{}_{}", endpoint.key_name(), language.code())
}

/// SHA-256 over the serialized form of a document, hex encoded.
///
/// Key order is whatever the document carries, so the same upstream bytes
/// always produce the same fingerprint.
pub fn fingerprint(data: &Value) -> Result<String> {
    let mut hasher = Sha256::new();
    serde_json::to_writer(&mut hasher, data)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Truncated hash for logs and stats, e.g. `3f2a9c1b...`.
pub fn hash_preview(hash: &str) -> String {
    let end = hash
        .char_indices()
        .nth(HASH_PREVIEW_LEN)
        .map(|(idx, _)| idx)
        .unwrap_or(hash.len());
    format!("{}...", &hash[..end])
}
