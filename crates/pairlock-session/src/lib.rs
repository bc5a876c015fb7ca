//! Pairlock session layer.
//!
//! Glue between [`pairlock_crypto`] and a host: a registry that holds
//! initiator handshakes between `start` and `finish`, text-safe encoding of
//! wire messages, QR code rendering, and the boundary that turns every
//! failure into `None`.
//!
//! # Components
//!
//! - [`SessionRegistry`]: handle → session map with TTL and capacity limits
//! - [`PairingService`]: the six operations with typed errors
//! - [`HostApi`]: the same operations, failures collapsed to `None`
//! - [`Environment`]: time and randomness, swappable for tests
//!
//! # Flow
//!
//! ```text
//! Initiator                          Responder
//!   start(pw) ── message_a ───────▶  exchange(pw, message_a)
//!          ◀─────────── message_b ──   → key
//!   finish(handle, message_b)
//!     → key
//!   seal(key, text) ── sealed ─────▶ open(key, sealed)
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod api;
pub mod barcode;
pub mod env;
mod error;
mod host;
mod registry;
mod service;
pub mod wire;

pub use api::{
    BarcodeRequest, BarcodeResponse, ExchangeRequest, ExchangeResponse, FinishRequest,
    FinishResponse, OpenRequest, OpenResponse, SealRequest, SealResponse, StartRequest,
    StartResponse,
};
pub use barcode::BarcodeConfig;
pub use env::{Environment, SystemEnv};
pub use error::ServiceError;
pub use host::HostApi;
pub use registry::{RegistryConfig, SessionHandle, SessionRegistry};
pub use service::{PairingService, ServiceConfig};
