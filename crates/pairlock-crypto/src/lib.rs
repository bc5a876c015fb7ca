//! Pairlock Cryptographic Core
//!
//! Password-authenticated key exchange and the secure channel built on its
//! output. Two parties who share a short password run a two-message
//! handshake, derive the same 32-byte key, and seal messages under it.
//! Neither the password nor anything that allows an offline guess crosses
//! the wire.
//!
//! All functions are pure apart from randomness, which the caller provides
//! as a [`rand::RngCore`] + [`rand::CryptoRng`] source. Tests use a seeded
//! RNG for deterministic runs.
//!
//! # Key Lifecycle
//!
//! ```text
//! password + context
//!        │
//!        ▼
//! MapToGroup → generator G
//!        │
//!        ▼
//! Handshake (MessageA → MessageB) → SharedSecret
//!        │
//!        ▼
//! HKDF → DerivedKey (32 bytes)
//!        │
//!        ▼
//! AEAD seal/open → SecureMessage
//! ```
//!
//! Ephemeral scalars, generators, shared secrets and derived keys are
//! zeroized when they are no longer needed, on success and error paths alike.
//!
//! # Security
//!
//! Password protection:
//! - The generator depends on the password; without it the DH output is
//!   unpredictable
//! - Each handshake attempt lets an active attacker test one password guess
//! - A mismatch is never signalled by the handshake itself
//!
//! Session binding:
//! - The shared secret hashes the generator, both messages and the DH point
//! - Peer elements that are invalid or the identity are rejected
//!
//! Channel:
//! - XChaCha20-Poly1305 with a fresh random 192-bit nonce per message
//! - Failed authentication tag -> reject message

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod channel;
mod entropy;
pub mod error;
pub mod group;
pub mod handshake;
pub mod kdf;

pub use channel::{AeadCipher, NONCE_LEN, SecureMessage, TAG_LEN, XChaCha, open, seal};
pub use error::{ErrorKind, PakeError};
pub use group::{PakeGroup, Ristretto255};
pub use handshake::{
    ContextInfo, Role, SHARED_SECRET_LEN, Session, SessionStatus, SharedSecret, exchange, start,
};
pub use kdf::{DERIVED_KEY_LEN, DerivedKey, derive_key};
