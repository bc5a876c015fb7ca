//! Key derivation from the handshake secret using HKDF

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::{PakeError, handshake::SharedSecret};

/// Length of a derived channel key in bytes.
pub const DERIVED_KEY_LEN: usize = 32;

/// Symmetric key for the secure channel. Zeroized on drop.
///
/// Never persisted and never logged; `Debug` output is redacted.
#[derive(Clone)]
pub struct DerivedKey([u8; DERIVED_KEY_LEN]);

impl DerivedKey {
    /// Wrap key bytes received across a boundary.
    ///
    /// # Errors
    ///
    /// - `Encoding`: `bytes` is not exactly [`DERIVED_KEY_LEN`] long
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PakeError> {
        let key: [u8; DERIVED_KEY_LEN] = bytes
            .try_into()
            .map_err(|_| PakeError::Encoding { reason: "key must be exactly 32 bytes" })?;
        Ok(Self(key))
    }

    /// 32-byte key for XChaCha20-Poly1305.
    pub fn as_bytes(&self) -> &[u8; DERIVED_KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Derive the channel key from a handshake secret.
///
/// HKDF-SHA256 with an empty salt and empty info, expanded to exactly
/// [`DERIVED_KEY_LEN`] bytes. The secret is already uniform; this step fixes
/// the key format independently of the group.
///
/// Deterministic: the same secret always yields the same key.
pub fn derive_key(secret: &SharedSecret) -> DerivedKey {
    let hkdf = Hkdf::<Sha256>::new(None, secret.as_bytes());

    let mut key = [0u8; DERIVED_KEY_LEN];
    let Ok(()) = hkdf.expand(&[], &mut key) else {
        unreachable!("32 bytes is a valid HKDF-SHA256 output length");
    };

    let derived = DerivedKey(key);
    key.zeroize();
    derived
}
