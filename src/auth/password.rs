use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Hash a password using Argon2id (19MB memory, 2 iterations, parallelism 1).
/// The PHC string embeds salt and cost, so verification only needs the hash.
pub fn hash(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let params = Params::new(19 * 1024, 2, 1, None).map_err(|e| format!("Invalid params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| format!("Hashing failed: {e}"))
}

/// Verify a password against a stored hash. A malformed hash verifies as false.
pub fn verify(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is malformed: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hashed = hash("password123").unwrap();
        assert!(hashed.starts_with("$argon2id$"));
        assert!(verify("password123", &hashed));
        assert!(!verify("password124", &hashed));
    }

    #[test]
    fn hashes_are_salted() {
        assert_ne!(hash("password123").unwrap(), hash("password123").unwrap());
    }

    #[test]
    fn malformed_hash_is_a_mismatch() {
        assert!(!verify("password123", "not-a-phc-string"));
        assert!(!verify("password123", ""));
    }
}
