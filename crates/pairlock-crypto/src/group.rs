//! Group capability for the handshake.
//!
//! The handshake only needs a prime-order group with a password-derived
//! generator: sample a scalar, multiply, and move elements on and off the
//! wire. [`PakeGroup`] captures exactly that contract so the handshake does
//! not depend on a particular curve.
//!
//! # Contract
//!
//! Implementations MUST guarantee:
//!
//! - `scalar_mul` runs in constant time with respect to the scalar
//! - `decode` accepts only canonical encodings of group elements and rejects
//!   the identity element
//! - `derive_generator` is deterministic and never yields the identity for
//!   practical inputs

use curve25519_dalek::{
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
    traits::IsIdentity,
};
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha512};
use zeroize::Zeroize;

use crate::{PakeError, entropy};

/// Domain separation label for generator derivation
const GENERATOR_LABEL: &[u8] = b"pairlock-generator-v1";

/// Prime-order group with a password-derived generator.
pub trait PakeGroup {
    /// Secret exponent. Cleared with [`Zeroize`] when the session ends.
    type Scalar: Zeroize;

    /// Group element. Generators are password-derived, so these are cleared
    /// too.
    type Element: Zeroize;

    /// Length of an encoded element in bytes.
    const ELEMENT_LEN: usize;

    /// Human-readable group name.
    const NAME: &'static str;

    /// Map `(password, context)` to a generator.
    fn derive_generator(password: &[u8], context: &[u8]) -> Self::Element;

    /// Sample a uniformly random scalar.
    fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self::Scalar, PakeError>;

    /// `scalar · element`, constant time in `scalar`.
    fn scalar_mul(scalar: &Self::Scalar, element: &Self::Element) -> Self::Element;

    /// Canonical encoding, exactly [`Self::ELEMENT_LEN`] bytes.
    fn encode(element: &Self::Element) -> Vec<u8>;

    /// Decode and validate an element received from a peer.
    ///
    /// # Errors
    ///
    /// - `Encoding`: `bytes` is not [`Self::ELEMENT_LEN`] long
    /// - `InvalidMessage`: not a canonical encoding, or the identity
    fn decode(bytes: &[u8]) -> Result<Self::Element, PakeError>;

    /// Whether `element` is the identity.
    fn is_identity(element: &Self::Element) -> bool;
}

/// The ristretto255 group, backed by `curve25519-dalek`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ristretto255;

impl PakeGroup for Ristretto255 {
    type Scalar = Scalar;
    type Element = RistrettoPoint;

    const ELEMENT_LEN: usize = 32;
    const NAME: &'static str = "ristretto255";

    /// SHA-512 over length-prefixed password and context, mapped to the
    /// group with the Elligator-based uniform-bytes map.
    fn derive_generator(password: &[u8], context: &[u8]) -> RistrettoPoint {
        let mut hasher = Sha512::new();
        hasher.update(GENERATOR_LABEL);
        hasher.update((password.len() as u64).to_be_bytes());
        hasher.update(password);
        hasher.update((context.len() as u64).to_be_bytes());
        hasher.update(context);
        let mut digest = hasher.finalize();

        let mut uniform = [0u8; 64];
        uniform.copy_from_slice(&digest);
        digest.as_mut_slice().zeroize();
        let generator = RistrettoPoint::from_uniform_bytes(&uniform);
        uniform.zeroize();

        generator
    }

    fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Scalar, PakeError> {
        let mut wide = [0u8; 64];
        entropy::fill(rng, &mut wide)?;
        let scalar = Scalar::from_bytes_mod_order_wide(&wide);
        wide.zeroize();
        Ok(scalar)
    }

    fn scalar_mul(scalar: &Scalar, element: &RistrettoPoint) -> RistrettoPoint {
        scalar * element
    }

    fn encode(element: &RistrettoPoint) -> Vec<u8> {
        element.compress().to_bytes().to_vec()
    }

    fn decode(bytes: &[u8]) -> Result<RistrettoPoint, PakeError> {
        let Ok(compressed) = CompressedRistretto::from_slice(bytes) else {
            return Err(PakeError::Encoding { reason: "group element has wrong length" });
        };

        let point = compressed.decompress().ok_or(PakeError::InvalidMessage {
            reason: "not a canonical ristretto255 encoding",
        })?;

        if point.is_identity() {
            return Err(PakeError::InvalidMessage { reason: "identity element" });
        }

        Ok(point)
    }

    fn is_identity(element: &RistrettoPoint) -> bool {
        element.is_identity()
    }
}
