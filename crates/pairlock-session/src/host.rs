//! Host boundary: every failure collapses to `None`.
//!
//! A host embedding the pairing flow (a browser page, a mobile shell) gets a
//! success value or nothing. The failure kind is logged at `debug` level on
//! this side of the boundary and never returned, so a peer probing with bad
//! input learns nothing beyond "it didn't work".

use crate::{
    ServiceError,
    api::{
        BarcodeRequest, BarcodeResponse, ExchangeRequest, ExchangeResponse, FinishRequest,
        FinishResponse, OpenRequest, OpenResponse, SealRequest, SealResponse, StartRequest,
        StartResponse,
    },
    env::Environment,
    service::{PairingService, ServiceConfig},
};

/// Opaque-failure wrapper around [`PairingService`].
#[derive(Debug)]
pub struct HostApi<E: Environment> {
    service: PairingService<E>,
}

impl<E: Environment> HostApi<E> {
    /// Create a host boundary with its own session registry.
    pub fn new(env: E, config: ServiceConfig) -> Self {
        Self { service: PairingService::new(env, config) }
    }

    /// Wrap an existing service.
    pub fn from_service(service: PairingService<E>) -> Self {
        Self { service }
    }

    /// The wrapped service.
    pub fn service(&self) -> &PairingService<E> {
        &self.service
    }

    /// Begin a handshake as the initiator.
    pub fn start(&self, request: StartRequest) -> Option<StartResponse> {
        collapse("start", self.service.start(request))
    }

    /// Answer MessageA as the responder.
    pub fn exchange(&self, request: ExchangeRequest) -> Option<ExchangeResponse> {
        collapse("exchange", self.service.exchange(request))
    }

    /// Complete a handshake as the initiator.
    pub fn finish(&self, request: FinishRequest) -> Option<FinishResponse> {
        collapse("finish", self.service.finish(request))
    }

    /// Seal a text message.
    pub fn seal(&self, request: SealRequest) -> Option<SealResponse> {
        collapse("seal", self.service.seal(request))
    }

    /// Open a sealed text message.
    pub fn open(&self, request: OpenRequest) -> Option<OpenResponse> {
        collapse("open", self.service.open(request))
    }

    /// Render text as a QR code PNG.
    pub fn encode_barcode(&self, request: BarcodeRequest) -> Option<BarcodeResponse> {
        collapse("encode_barcode", self.service.encode_barcode(request))
    }
}

fn collapse<T>(operation: &'static str, result: Result<T, ServiceError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(operation, kind = ?err.kind(), error = %err, "operation failed");
            None
        },
    }
}
