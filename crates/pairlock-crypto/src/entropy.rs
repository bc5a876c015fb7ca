//! Fallible reads from the caller's randomness source.

use rand::{CryptoRng, RngCore};

use crate::PakeError;

/// Fill `buffer` from `rng`, surfacing source failure as [`PakeError::Internal`].
pub(crate) fn fill<R: RngCore + CryptoRng>(
    rng: &mut R,
    buffer: &mut [u8],
) -> Result<(), PakeError> {
    rng.try_fill_bytes(buffer)
        .map_err(|e| PakeError::Internal(format!("randomness source unavailable: {e}")))
}

/// RNG whose source is permanently broken.
#[cfg(test)]
pub(crate) struct FailingRng;

#[cfg(test)]
impl RngCore for FailingRng {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn next_u64(&mut self) -> u64 {
        0
    }

    fn fill_bytes(&mut self, _dest: &mut [u8]) {}

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
        Err(rand::Error::new(std::io::Error::other("entropy pool closed")))
    }
}

#[cfg(test)]
impl CryptoRng for FailingRng {}
