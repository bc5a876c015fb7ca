//! Text-safe transport encoding for handshake messages and sealed payloads.
//!
//! URL-safe base64 without padding. Decoding is strict: padding, standard
//! alphabet characters (`+`, `/`) and non-canonical trailing bits are all
//! rejected, so every byte string has exactly one accepted text form.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use pairlock_crypto::PakeError;

/// Encode bytes for transport.
pub fn encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode transport text.
///
/// # Errors
///
/// - `Encoding`: not canonical unpadded URL-safe base64
pub fn decode(text: &str) -> Result<Vec<u8>, PakeError> {
    URL_SAFE_NO_PAD
        .decode(text)
        .map_err(|_| PakeError::Encoding { reason: "invalid url-safe base64" })
}
