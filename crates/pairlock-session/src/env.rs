//! Environment abstraction for deterministic testing.
//!
//! Decouples the registry and boundary from system resources (time,
//! randomness). Production uses the OS clock and RNG; tests drive a manual
//! clock and a seeded RNG.

use std::time::Duration;

use pairlock_crypto::PakeError;
use rand::{CryptoRng, RngCore, rngs::OsRng};

/// Abstract environment providing time and randomness.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `now()` never goes backwards
/// - `rng()` yields a cryptographically secure generator in production
pub trait Environment: Clone + Send + Sync + 'static {
    /// The specific instant type used by this environment.
    type Instant: Copy + Ord + Send + Sync + std::ops::Sub<Output = Duration>;

    /// Random generator handed to handshake and channel operations.
    type Rng: RngCore + CryptoRng;

    /// Current time (monotonic).
    fn now(&self) -> Self::Instant;

    /// A generator for one operation.
    ///
    /// Called once per operation; successive generators MUST NOT repeat
    /// output.
    fn rng(&self) -> Self::Rng;

    /// Generates a random `u128`.
    ///
    /// Used for session handles.
    fn random_u128(&self) -> Result<u128, PakeError> {
        let mut bytes = [0u8; 16];
        self.rng()
            .try_fill_bytes(&mut bytes)
            .map_err(|e| PakeError::Internal(format!("randomness source unavailable: {e}")))?;
        Ok(u128::from_be_bytes(bytes))
    }
}

/// Production environment using system time and the OS RNG.
///
/// # Security
///
/// The RNG is `OsRng`, backed by getrandom (e.g. `getrandom(2)` on Linux,
/// `BCryptGenRandom` on Windows). A failing OS RNG surfaces as
/// [`PakeError::Internal`] from the operation that needed it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = std::time::Instant;
    type Rng = OsRng;

    #[allow(clippy::disallowed_methods)]
    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn rng(&self) -> OsRng {
        OsRng
    }
}
