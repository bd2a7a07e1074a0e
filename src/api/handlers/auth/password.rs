//! Credential hashing.
//!
//! Secrets are stored as Argon2id PHC strings (random 16-byte salt, default
//! parameters). Verification parses the stored string and lets the verifier
//! do the comparison; raw secrets are never compared directly.

use anyhow::{Result, anyhow};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use rand::{RngCore, rngs::OsRng};

/// Hash a secret into a PHC string for storage.
///
/// # Errors
///
/// Returns an error if salt encoding or hashing fails.
pub fn hash_secret(secret: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    OsRng.fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let phc = Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| anyhow!(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// Check a candidate secret against a stored PHC string.
///
/// Unparseable hashes verify as `false` rather than erroring, so a corrupt
/// record behaves like a wrong password.
#[must_use]
pub fn verify_secret(hash: &str, candidate: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hash = hash_secret("correct horse battery staple").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_secret(&hash, "correct horse battery staple"));
        assert!(!verify_secret(&hash, "correct horse battery stape"));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_secret("same-password").unwrap();
        let second = hash_secret("same-password").unwrap();
        assert_ne!(first, second);
        assert!(verify_secret(&first, "same-password"));
        assert!(verify_secret(&second, "same-password"));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_secret("not-a-phc-string", "anything"));
        assert!(!verify_secret("", "anything"));
    }
}
