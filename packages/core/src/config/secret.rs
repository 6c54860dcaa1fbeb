//! Session secret generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

/// Number of random bytes in a generated session secret.
pub const SESSION_SECRET_BYTES: usize = 32;

/// Generate a URL-safe session secret.
///
/// 32 bytes from the thread-local CSPRNG, base64url encoded without padding
/// (43 characters).
pub fn generate_session_secret() -> String {
    let mut bytes = [0u8; SESSION_SECRET_BYTES];
    // ThreadRng is a CSPRNG seeded from the OS.
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
