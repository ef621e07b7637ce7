/// Password-reset credentials
///
/// A reset credential is 32 random bytes, hex-encoded, handed to the user
/// out-of-band (via the mail seam) and never stored in the clear: only its
/// SHA-256 digest is persisted alongside a 15-minute expiry. Redeeming a
/// credential hashes the presented value and compares digests, so a
/// database leak does not expose usable reset links.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Reset credential validity window in minutes
pub const RESET_TOKEN_TTL_MINUTES: i64 = 15;

/// A freshly generated reset credential
#[derive(Debug, Clone)]
pub struct ResetToken {
    /// The raw token to deliver to the user (hex, 64 chars)
    pub token: String,

    /// SHA-256 digest of the raw token (hex) to persist
    pub token_hash: String,

    /// When the credential stops being redeemable
    pub expires_at: DateTime<Utc>,
}

/// Generates a new reset credential with the standard 15-minute expiry
pub fn generate_reset_token() -> ResetToken {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let token = hex::encode(bytes);

    ResetToken {
        token_hash: hash_reset_token(&token),
        expires_at: Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES),
        token,
    }
}

/// Hashes a presented reset credential for lookup
pub fn hash_reset_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(digest)
}

/// Checks whether a stored expiry is still in the future
pub fn is_reset_token_valid(expires_at: DateTime<Utc>) -> bool {
    Utc::now() < expires_at
}
