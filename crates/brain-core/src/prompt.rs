//! Prompt fingerprinting, so prompts can be tracked in logs without being logged.

use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint (lowercase hex) for a prompt string.
pub fn hash_prompt(prompt: &str) -> String {
    Sha256::digest(prompt.as_bytes())
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}
