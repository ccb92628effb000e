use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};

use crate::error::AppResult;
use crate::models::productivity::ProductivityRecord;

/// Deterministic fingerprint of a computed record set.
///
/// The records are hashed in their serialized form, so identical analyses
/// always produce the same value regardless of when the report was generated.
pub fn records_fingerprint(records: &[ProductivityRecord]) -> AppResult<String> {
    let mut hasher = Sha256::new();
    for record in records {
        hasher.update(serde_json::to_vec(record)?);
        hasher.update(b"\n");
    }

    let digest = hasher.finalize();
    Ok(STANDARD_NO_PAD.encode(digest))
}
