use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

/// Generate a boarding ticket token: 256 bits from the OS CSPRNG, encoded
/// as base64url without padding (43 characters). Tokens double as
/// unforgeable boarding credentials, so a general-purpose PRNG is not
/// acceptable here.
pub fn generate_ticket_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
