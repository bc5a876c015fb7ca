//! Typed requests and responses, one pair per boundary operation.
//!
//! Handshake messages and sealed payloads cross the boundary as URL-safe
//! base64 text (see [`crate::wire`]). Keys cross as raw bytes and are held in
//! zeroizing containers on both sides.

use std::fmt;

use pairlock_crypto::DerivedKey;
use zeroize::Zeroizing;

use crate::registry::SessionHandle;

/// Begin a handshake as the initiator.
#[derive(Clone)]
pub struct StartRequest {
    /// Shared password
    pub password: Zeroizing<String>,
    /// Optional context-binding bytes; `None` binds no context
    pub context: Option<Vec<u8>>,
}

impl StartRequest {
    /// Request with no context binding.
    pub fn new(password: impl Into<String>) -> Self {
        Self { password: Zeroizing::new(password.into()), context: None }
    }

    /// Bind `context` into the handshake.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<Vec<u8>>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Result of [`StartRequest`].
#[derive(Debug, Clone)]
pub struct StartResponse {
    /// MessageA for the responder
    pub message_a: String,
    /// Handle to pass to `finish`
    pub session: SessionHandle,
}

/// Answer MessageA as the responder.
#[derive(Clone)]
pub struct ExchangeRequest {
    /// Shared password
    pub password: Zeroizing<String>,
    /// Context-binding bytes; keys agree only if they match the initiator's
    pub context: Option<Vec<u8>>,
    /// MessageA from the initiator
    pub message_a: String,
}

impl ExchangeRequest {
    /// Request with no context binding.
    pub fn new(password: impl Into<String>, message_a: impl Into<String>) -> Self {
        Self {
            password: Zeroizing::new(password.into()),
            context: None,
            message_a: message_a.into(),
        }
    }

    /// Bind `context` into the handshake.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<Vec<u8>>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Result of [`ExchangeRequest`].
#[derive(Debug, Clone)]
pub struct ExchangeResponse {
    /// MessageB for the initiator
    pub message_b: String,
    /// Responder's channel key
    pub key: DerivedKey,
}

/// Complete a handshake as the initiator.
#[derive(Debug, Clone)]
pub struct FinishRequest {
    /// Handle from [`StartResponse`]
    pub session: SessionHandle,
    /// MessageB from the responder
    pub message_b: String,
}

/// Result of [`FinishRequest`].
#[derive(Debug, Clone)]
pub struct FinishResponse {
    /// Initiator's channel key
    pub key: DerivedKey,
}

/// Seal a text message.
#[derive(Clone)]
pub struct SealRequest {
    /// Channel key bytes; must be exactly 32 bytes
    pub key: Zeroizing<Vec<u8>>,
    /// Message to protect
    pub plaintext: String,
}

/// Result of [`SealRequest`].
#[derive(Debug, Clone)]
pub struct SealResponse {
    /// Sealed message, base64 text
    pub sealed: String,
}

/// Open a sealed text message.
#[derive(Clone)]
pub struct OpenRequest {
    /// Channel key bytes; must be exactly 32 bytes
    pub key: Zeroizing<Vec<u8>>,
    /// Sealed message, base64 text
    pub sealed: String,
}

/// Result of [`OpenRequest`].
#[derive(Clone)]
pub struct OpenResponse {
    /// Recovered message
    pub plaintext: String,
}

/// Render text as a QR code.
#[derive(Debug, Clone)]
pub struct BarcodeRequest {
    /// Text to encode
    pub text: String,
}

/// Result of [`BarcodeRequest`].
#[derive(Debug, Clone)]
pub struct BarcodeResponse {
    /// PNG image bytes
    pub png: Vec<u8>,
}

// Passwords, keys and plaintexts stay out of debug output.

impl fmt::Debug for StartRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StartRequest")
            .field("password", &"[REDACTED]")
            .field("context", &self.context)
            .finish()
    }
}

impl fmt::Debug for ExchangeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeRequest")
            .field("password", &"[REDACTED]")
            .field("context", &self.context)
            .field("message_a", &self.message_a)
            .finish()
    }
}

impl fmt::Debug for SealRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealRequest")
            .field("key", &"[REDACTED]")
            .field("plaintext_len", &self.plaintext.len())
            .finish()
    }
}

impl fmt::Debug for OpenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenRequest")
            .field("key", &"[REDACTED]")
            .field("sealed", &self.sealed)
            .finish()
    }
}

impl fmt::Debug for OpenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenResponse").field("plaintext_len", &self.plaintext.len()).finish()
    }
}
