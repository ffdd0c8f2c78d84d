use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Well-formed digest with default argon2id parameters that no password matches.
/// Verifying against it costs the same as a real check.
pub const DECOY_DIGEST: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$1BmgIpyL+6q985iu8p8cyA$jtC436RXcJnCQ1fb3oYPq/bYD3YRLzWlze4Tzhv7QmY";

/// One-way salted hashing for login credentials.
///
/// Digests are PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so the
/// algorithm and cost travel with the stored value.
#[derive(Clone, Default)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|digest| digest.to_string())
            .map_err(|err| PasswordError::Hash(err.to_string()))
    }

    /// Returns `false` for mismatches and for digests that do not parse.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => self
                .argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),
}
