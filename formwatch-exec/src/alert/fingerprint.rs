use sha2::{Digest, Sha256};

use crate::classify::DeviationKind;

/// Identity of "the same underlying problem": lowercase hex SHA-256 over the journey id, the
/// failing step id and the deviation kind, separated by ASCII unit separators.
pub fn fingerprint(journey_id: &str, step_id: &str, kind: DeviationKind) -> String {
    let mut hasher = Sha256::new();
    hasher.update(journey_id.as_bytes());
    hasher.update([0x1f]);
    hasher.update(step_id.as_bytes());
    hasher.update([0x1f]);
    hasher.update(kind.as_str().as_bytes());
    hex::encode(hasher.finalize())
}
