//! Password hashing and verification using Argon2id.
//!
//! The digest is the only representation of a password this application ever
//! stores or compares; verification is delegated entirely to the argon2
//! primitive, which compares in constant time.

use argon2::{
    Argon2, PasswordHash, PasswordVerifier,
    password_hash::{PasswordHasher, SaltString},
};

/// Hash a password using Argon2id.
/// Returns the PHC-format hash string suitable for storage in the database.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(rand::thread_rng());
    let argon2 = Argon2::default();

    let digest = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();

    Ok(digest)
}

/// Verify a password against a stored digest.
///
/// Any failure (malformed digest or mismatching password) is a plain `false`;
/// callers distinguish "email not found" themselves, before this runs.
pub fn verify_password(password: &str, digest: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(digest) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let digest = hash_password("pw123").expect("hashing should succeed");
        assert!(verify_password("pw123", &digest));
    }

    #[test]
    fn wrong_password_fails_verification() {
        let digest = hash_password("pw123").expect("hashing should succeed");
        assert!(!verify_password("pw124", &digest));
    }

    #[test]
    fn digest_is_not_the_plaintext() {
        let digest = hash_password("pw123").expect("hashing should succeed");
        assert_ne!(digest, "pw123");
        assert!(digest.starts_with("$argon2"));
    }

    #[test]
    fn malformed_digest_fails_closed() {
        assert!(!verify_password("pw123", "not-a-phc-string"));
    }

    #[test]
    fn same_password_hashes_differently() {
        let a = hash_password("pw123").unwrap();
        let b = hash_password("pw123").unwrap();
        // Fresh salt per digest.
        assert_ne!(a, b);
    }
}
