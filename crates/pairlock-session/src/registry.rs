//! Session registry for in-flight initiator handshakes.
//!
//! Between `start` and `finish` the initiator's ephemeral state has to live
//! somewhere. The registry maps an opaque random handle to that state so any
//! number of handshakes can be in flight at once.
//!
//! `take` removes the session before the caller finishes it, so a session
//! is never reachable by two calls at the same time and a second `finish`
//! on the same handle finds nothing. Sessions older than the configured TTL
//! are discarded (and their secrets zeroized) lazily on every insert, on
//! lookup, and by [`SessionRegistry::purge_expired`].

use std::{
    collections::HashMap,
    fmt,
    str::FromStr,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use pairlock_crypto::Session;

use crate::{ServiceError, env::Environment};

/// Opaque identifier for a registered session.
///
/// Rendered as 32 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle(u128);

impl SessionHandle {
    /// Handle with a specific value.
    pub fn from_u128(value: u128) -> Self {
        Self(value)
    }

    /// Raw handle value.
    pub fn as_u128(self) -> u128 {
        self.0
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl FromStr for SessionHandle {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let canonical =
            s.len() == 32 && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !canonical {
            return Err(ServiceError::MalformedHandle);
        }

        u128::from_str_radix(s, 16).map(Self).map_err(|_| ServiceError::MalformedHandle)
    }
}

/// Registry limits.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// How long a started session waits for `finish` before it is discarded
    pub session_ttl: Duration,
    /// Maximum number of in-flight sessions
    pub max_sessions: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { session_ttl: Duration::from_secs(300), max_sessions: 1024 }
    }
}

struct Entry<I> {
    session: Session,
    created_at: I,
}

/// Concurrency-safe map from [`SessionHandle`] to initiator session.
pub struct SessionRegistry<E: Environment> {
    env: E,
    config: RegistryConfig,
    sessions: Mutex<HashMap<SessionHandle, Entry<E::Instant>>>,
}

impl<E: Environment> SessionRegistry<E> {
    /// Create an empty registry.
    pub fn new(env: E, config: RegistryConfig) -> Self {
        Self { env, config, sessions: Mutex::new(HashMap::new()) }
    }

    /// Registry limits in effect.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register a started session and return its handle.
    ///
    /// Expired sessions are purged first.
    ///
    /// # Errors
    ///
    /// - `RegistryFull`: `max_sessions` live sessions already registered
    /// - `Pake(Internal)`: no randomness for the handle
    pub fn insert(&self, session: Session) -> Result<SessionHandle, ServiceError> {
        let now = self.env.now();
        let mut sessions = self.lock();

        let purged = purge(&mut sessions, now, self.config.session_ttl);
        if purged > 0 {
            tracing::debug!(purged, "purged expired sessions");
        }

        if sessions.len() >= self.config.max_sessions {
            tracing::warn!(limit = self.config.max_sessions, "session registry full");
            return Err(ServiceError::RegistryFull { limit: self.config.max_sessions });
        }

        let handle = loop {
            let candidate = SessionHandle(self.env.random_u128()?);
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };

        sessions.insert(handle, Entry { session, created_at: now });
        Ok(handle)
    }

    /// Remove and return the session for `handle`.
    ///
    /// The session leaves the registry whether or not the caller's next
    /// step succeeds.
    ///
    /// # Errors
    ///
    /// - `UnknownSession`: never issued, or already taken
    /// - `SessionExpired`: older than the TTL (discarded)
    pub fn take(&self, handle: SessionHandle) -> Result<Session, ServiceError> {
        let now = self.env.now();
        let entry = self.lock().remove(&handle).ok_or(ServiceError::UnknownSession(handle))?;

        if is_expired(entry.created_at, now, self.config.session_ttl) {
            tracing::debug!(%handle, "session expired before finish");
            return Err(ServiceError::SessionExpired(handle));
        }

        Ok(entry.session)
    }

    /// Drop every session older than the TTL. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.env.now();
        let purged = purge(&mut self.lock(), now, self.config.session_ttl);
        if purged > 0 {
            tracing::info!(purged, "purged expired sessions");
        }
        purged
    }

    /// Number of registered sessions, including ones not yet purged.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no sessions are registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Whether `handle` is currently registered.
    pub fn contains(&self, handle: SessionHandle) -> bool {
        self.lock().contains_key(&handle)
    }

    // The map is consistent after every statement, so a poisoned lock is
    // still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashMap<SessionHandle, Entry<E::Instant>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E: Environment> fmt::Debug for SessionRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("config", &self.config)
            .field("sessions", &self.len())
            .finish_non_exhaustive()
    }
}

fn is_expired<I>(created_at: I, now: I, ttl: Duration) -> bool
where
    I: Copy + std::ops::Sub<Output = Duration>,
{
    now - created_at >= ttl
}

fn purge<I>(sessions: &mut HashMap<SessionHandle, Entry<I>>, now: I, ttl: Duration) -> usize
where
    I: Copy + std::ops::Sub<Output = Duration>,
{
    let before = sessions.len();
    sessions.retain(|_, entry| !is_expired(entry.created_at, now, ttl));
    before - sessions.len()
}
