/// One-time passwords and password-reset tokens
///
/// Both secrets are handed to the user in plaintext (email) and persisted only
/// as SHA-256 digests. Lookups digest the presented value and compare digests.
///
/// # Formats
///
/// - **OTP**: 6 decimal digits, uniformly drawn from `100000..=999999`
/// - **Reset token**: 20 random bytes, hex-encoded (40 characters)
///
/// # Example
///
/// ```
/// use taskflow_shared::auth::token::{digest, generate_otp, generate_reset_token};
///
/// let otp = generate_otp();
/// assert_eq!(otp.len(), 6);
///
/// let token = generate_reset_token();
/// assert_eq!(token.len(), 40);
///
/// let stored = digest(&token);
/// assert_eq!(stored.len(), 64);
/// assert_eq!(stored, digest(&token));
/// ```

use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};

/// Smallest OTP value (inclusive)
pub const OTP_MIN: u32 = 100_000;

/// Largest OTP value (inclusive)
pub const OTP_MAX: u32 = 999_999;

/// Random bytes in a reset token before hex encoding
const RESET_TOKEN_BYTES: usize = 20;

/// Generates a 6-digit one-time password
pub fn generate_otp() -> String {
    let value = rand::thread_rng().gen_range(OTP_MIN..=OTP_MAX);
    value.to_string()
}

/// Generates a hex-encoded password-reset token
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hex-encoded SHA-256 digest of a secret (64 characters)
pub fn digest(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Constant-time string comparison
///
/// Runs over the full input regardless of where the first mismatch is.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes()
        .iter()
        .zip(b.as_bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
