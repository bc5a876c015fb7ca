//! Secure channel over the derived key using `XChaCha20-Poly1305`
//!
//! Every sealed message carries its own random 24-byte nonce, so no state is
//! kept between calls. The 192-bit nonce space makes random collisions
//! negligible at the handful of messages this channel is meant for.
//!
//! Wire format of a [`SecureMessage`]:
//!
//! ```text
//! nonce (24 bytes) || ciphertext || Poly1305 tag (16 bytes)
//! ```

use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};
use rand::{CryptoRng, RngCore};

use crate::{PakeError, entropy, kdf::DerivedKey};

/// Size of the random nonce (24 bytes)
pub const NONCE_LEN: usize = 24;

/// Poly1305 tag size (16 bytes)
pub const TAG_LEN: usize = 16;

/// Authenticated cipher with 192-bit nonces.
///
/// # Contract
///
/// - `open` MUST verify the tag before releasing any plaintext
/// - Output of `seal` is `plaintext.len() + TAG_LEN` bytes
pub trait AeadCipher {
    /// Encrypt and authenticate `plaintext`.
    fn seal(key: &DerivedKey, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Vec<u8>;

    /// Verify and decrypt `ciphertext`.
    ///
    /// # Errors
    ///
    /// - `Authentication`: wrong key, wrong nonce or tampered ciphertext
    fn open(
        key: &DerivedKey,
        nonce: &[u8; NONCE_LEN],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, PakeError>;
}

/// `XChaCha20-Poly1305` backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XChaCha;

impl AeadCipher for XChaCha {
    fn seal(key: &DerivedKey, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Vec<u8> {
        let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

        let Ok(ciphertext) = cipher.encrypt(XNonce::from_slice(nonce), plaintext) else {
            unreachable!("XChaCha20-Poly1305 encryption cannot fail with valid inputs");
        };

        ciphertext
    }

    fn open(
        key: &DerivedKey,
        nonce: &[u8; NONCE_LEN],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, PakeError> {
        let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
        cipher.decrypt(XNonce::from_slice(nonce), ciphertext).map_err(|_| PakeError::Authentication)
    }
}

/// A sealed message: nonce plus ciphertext-and-tag.
///
/// Self-contained; the key is the only other input needed to open it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecureMessage {
    /// The 24-byte `XChaCha20` nonce
    pub nonce: [u8; NONCE_LEN],
    /// The ciphertext including 16-byte Poly1305 tag
    pub ciphertext: Vec<u8>,
}

impl SecureMessage {
    /// Parse `nonce || ciphertext+tag`.
    ///
    /// Only the nonce length is checked here. A payload too short to hold a
    /// tag fails authentication in [`open`].
    ///
    /// # Errors
    ///
    /// - `Encoding`: fewer than [`NONCE_LEN`] bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PakeError> {
        if bytes.len() < NONCE_LEN {
            return Err(PakeError::Encoding { reason: "sealed message shorter than its nonce" });
        }

        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_LEN);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(nonce_bytes);

        Ok(Self { nonce, ciphertext: ciphertext.to_vec() })
    }

    /// Serialize as `nonce || ciphertext+tag`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(NONCE_LEN + self.ciphertext.len());
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Plaintext length (ciphertext length minus authentication tag).
    pub fn plaintext_len(&self) -> usize {
        self.ciphertext.len().saturating_sub(TAG_LEN)
    }
}

/// Seal `plaintext` under `key` with a fresh random nonce.
///
/// # Errors
///
/// - `Internal`: randomness source unavailable
pub fn seal<R: RngCore + CryptoRng>(
    key: &DerivedKey,
    plaintext: &[u8],
    rng: &mut R,
) -> Result<SecureMessage, PakeError> {
    seal_with::<XChaCha, R>(key, plaintext, rng)
}

/// Open a message sealed by [`seal`].
///
/// # Errors
///
/// - `Authentication`: wrong key or tampered message
pub fn open(key: &DerivedKey, message: &SecureMessage) -> Result<Vec<u8>, PakeError> {
    open_with::<XChaCha>(key, message)
}

/// [`seal`] with an explicit cipher backend.
pub fn seal_with<A: AeadCipher, R: RngCore + CryptoRng>(
    key: &DerivedKey,
    plaintext: &[u8],
    rng: &mut R,
) -> Result<SecureMessage, PakeError> {
    let mut nonce = [0u8; NONCE_LEN];
    entropy::fill(rng, &mut nonce)?;

    let ciphertext = A::seal(key, &nonce, plaintext);
    Ok(SecureMessage { nonce, ciphertext })
}

/// [`open`] with an explicit cipher backend.
pub fn open_with<A: AeadCipher>(
    key: &DerivedKey,
    message: &SecureMessage,
) -> Result<Vec<u8>, PakeError> {
    A::open(key, &message.nonce, &message.ciphertext)
}
