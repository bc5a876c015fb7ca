//! Boundary error types.
//!
//! Wraps protocol errors from [`pairlock_crypto`] and adds the failures that
//! only exist at the boundary: session bookkeeping and barcode rendering.
//! Every variant maps onto the shared five-kind [`ErrorKind`] taxonomy.

use pairlock_crypto::{ErrorKind, PakeError};
use thiserror::Error;

use crate::registry::SessionHandle;

/// Errors that can occur while serving a boundary operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Protocol failure from the handshake, KDF or channel.
    #[error(transparent)]
    Pake(#[from] PakeError),

    /// Handle does not name a live session.
    ///
    /// Either it was never issued, or its session was already finished.
    #[error("unknown session: {0}")]
    UnknownSession(SessionHandle),

    /// Session outlived the registry TTL and was discarded.
    #[error("session expired: {0}")]
    SessionExpired(SessionHandle),

    /// Handle text is not 32 lowercase hex characters.
    #[error("malformed session handle")]
    MalformedHandle,

    /// Registry holds its maximum number of in-flight sessions.
    #[error("session registry full ({limit} sessions)")]
    RegistryFull {
        /// Configured capacity
        limit: usize,
    },

    /// Text cannot be represented as a barcode (e.g. too long).
    #[error("barcode encoding failed: {0}")]
    Barcode(String),

    /// Barcode image could not be written.
    #[error("barcode rendering failed: {0}")]
    Render(String),
}

impl ServiceError {
    /// Taxonomy kind of this error.
    ///
    /// Session lookups that fail count as out-of-order handshake calls.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Pake(err) => err.kind(),
            Self::UnknownSession(_) | Self::SessionExpired(_) => ErrorKind::InvalidState,
            Self::MalformedHandle | Self::Barcode(_) => ErrorKind::Encoding,
            Self::RegistryFull { .. } | Self::Render(_) => ErrorKind::Internal,
        }
    }
}
