//! Credential hashing and stateless bearer tokens.

pub mod password;
pub mod token;

pub use password::{CredentialHasher, PasswordError, DECOY_DIGEST};
pub use token::{bearer_token, Claims, TokenError, TokenService, TOKEN_VALIDITY_HOURS};
