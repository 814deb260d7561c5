//! Argon2id password hashing.
//!
//! Hashing parameters come from [`SecurityConfig`] so operators can trade
//! memory cost against CPU cost; the PHC output string embeds the per-call
//! salt and the parameters used, so old hashes keep verifying after a
//! parameter change.

use anyhow::Result;
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::config::SecurityConfig;

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses default params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored PHC string.
///
/// A malformed digest counts as a failed verification rather than an error,
/// so callers never branch on anything but the boolean.
#[must_use]
pub fn verify_password(password: &str, digest: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(digest) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_and_verifiable() {
        let a = hash_password("testPassword123", None).unwrap();
        let b = hash_password("testPassword123", None).unwrap();

        assert_ne!(a, "testPassword123");
        // Per-call random salt means two hashes of the same input differ
        assert_ne!(a, b);
        assert!(verify_password("testPassword123", &a));
        assert!(verify_password("testPassword123", &b));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let digest = hash_password("correct horse", None).unwrap();
        assert!(!verify_password("wrong horse", &digest));
    }

    #[test]
    fn malformed_digest_fails_closed() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn configured_params_still_verify() {
        let cfg = SecurityConfig::default();
        let digest = hash_password("s3cret", Some(&cfg)).unwrap();
        assert!(verify_password("s3cret", &digest));
    }
}
