//! Pairing service: the six boundary operations with typed errors.
//!
//! Validates boundary input (base64 text, key length, UTF-8) before it
//! reaches the protocol core, keeps initiator sessions in the
//! [`SessionRegistry`], and logs the outcome of each operation. Callers that
//! must not leak error detail across a trust boundary use [`crate::HostApi`]
//! instead, which collapses every failure to `None`.

use pairlock_crypto::{
    ContextInfo, DerivedKey, SecureMessage, derive_key, exchange, open, seal, start,
};

use crate::{
    ServiceError,
    api::{
        BarcodeRequest, BarcodeResponse, ExchangeRequest, ExchangeResponse, FinishRequest,
        FinishResponse, OpenRequest, OpenResponse, SealRequest, SealResponse, StartRequest,
        StartResponse,
    },
    barcode::{self, BarcodeConfig},
    env::Environment,
    registry::{RegistryConfig, SessionRegistry},
    wire,
};

/// Service configuration.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Session registry limits
    pub registry: RegistryConfig,
    /// QR code rendering options
    pub barcode: BarcodeConfig,
}

/// Runs handshake, channel and barcode operations for a host.
#[derive(Debug)]
pub struct PairingService<E: Environment> {
    env: E,
    registry: SessionRegistry<E>,
    barcode: BarcodeConfig,
}

impl<E: Environment> PairingService<E> {
    /// Create a service with an empty registry.
    pub fn new(env: E, config: ServiceConfig) -> Self {
        let registry = SessionRegistry::new(env.clone(), config.registry);
        Self { env, registry, barcode: config.barcode }
    }

    /// In-flight initiator sessions.
    pub fn registry(&self) -> &SessionRegistry<E> {
        &self.registry
    }

    /// Start a handshake and register the initiator session.
    pub fn start(&self, request: StartRequest) -> Result<StartResponse, ServiceError> {
        let context = context_info(request.context);
        let (message_a, session) =
            start(request.password.as_bytes(), context, &mut self.env.rng())?;
        let handle = self.registry.insert(session)?;

        tracing::debug!(session = %handle, "handshake started");
        Ok(StartResponse { message_a: wire::encode(&message_a), session: handle })
    }

    /// Answer MessageA and derive the responder's key.
    pub fn exchange(&self, request: ExchangeRequest) -> Result<ExchangeResponse, ServiceError> {
        let message_a = wire::decode(&request.message_a)?;
        let context = context_info(request.context);

        let (message_b, secret) =
            exchange(request.password.as_bytes(), context, &message_a, &mut self.env.rng())?;
        let key = derive_key(&secret);

        tracing::debug!("handshake exchanged");
        Ok(ExchangeResponse { message_b: wire::encode(&message_b), key })
    }

    /// Finish a registered handshake and derive the initiator's key.
    ///
    /// The session is consumed by this call whether or not it succeeds.
    pub fn finish(&self, request: FinishRequest) -> Result<FinishResponse, ServiceError> {
        let mut session = self.registry.take(request.session)?;
        let message_b = wire::decode(&request.message_b)?;

        let secret = session.finish(&message_b)?;
        let key = derive_key(&secret);

        tracing::debug!(session = %request.session, "handshake finished");
        Ok(FinishResponse { key })
    }

    /// Seal text under a channel key.
    pub fn seal(&self, request: SealRequest) -> Result<SealResponse, ServiceError> {
        let key = DerivedKey::from_slice(&request.key)?;
        let sealed = seal(&key, request.plaintext.as_bytes(), &mut self.env.rng())?;

        Ok(SealResponse { sealed: wire::encode(&sealed.to_bytes()) })
    }

    /// Open text sealed under a channel key.
    pub fn open(&self, request: OpenRequest) -> Result<OpenResponse, ServiceError> {
        let key = DerivedKey::from_slice(&request.key)?;
        let message = SecureMessage::from_bytes(&wire::decode(&request.sealed)?)?;

        let plaintext = open(&key, &message)?;
        let plaintext = String::from_utf8(plaintext).map_err(|_| {
            pairlock_crypto::PakeError::Encoding { reason: "plaintext is not valid UTF-8" }
        })?;

        Ok(OpenResponse { plaintext })
    }

    /// Render text as a QR code PNG.
    pub fn encode_barcode(&self, request: BarcodeRequest) -> Result<BarcodeResponse, ServiceError> {
        let png = barcode::encode_png(&request.text, &self.barcode)?;
        Ok(BarcodeResponse { png })
    }
}

fn context_info(context: Option<Vec<u8>>) -> ContextInfo {
    context.map_or_else(ContextInfo::empty, ContextInfo::from_bytes)
}

#[cfg(test)]
mod tests {
    use pairlock_crypto::ErrorKind;
    use zeroize::Zeroizing;

    use super::*;
    use crate::env::SystemEnv;

    fn service() -> PairingService<SystemEnv> {
        PairingService::new(SystemEnv::new(), ServiceConfig::default())
    }

    fn key_bytes(key: &DerivedKey) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(key.as_bytes().to_vec())
    }

    #[test]
    fn start_registers_session() {
        let service = service();
        let response = service.start(StartRequest::new("pw")).unwrap();

        assert!(service.registry().contains(response.session));
        assert_eq!(wire::decode(&response.message_a).unwrap().len(), 32);
    }

    #[test]
    fn finish_removes_session() {
        let service = service();
        let started = service.start(StartRequest::new("pw")).unwrap();
        let exchanged = service.exchange(ExchangeRequest::new("pw", started.message_a)).unwrap();

        service
            .finish(FinishRequest { session: started.session, message_b: exchanged.message_b })
            .unwrap();

        assert!(service.registry().is_empty());
    }

    #[test]
    fn finish_with_bad_encoding_still_consumes_session() {
        let service = service();
        let started = service.start(StartRequest::new("pw")).unwrap();

        let result = service
            .finish(FinishRequest { session: started.session, message_b: "***".into() });
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Encoding);
        assert!(!service.registry().contains(started.session));
    }

    #[test]
    fn exchange_rejects_bad_base64() {
        let result = service().exchange(ExchangeRequest::new("pw", "not base64!"));
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Encoding);
    }

    #[test]
    fn seal_rejects_short_key() {
        let result = service()
            .seal(SealRequest { key: Zeroizing::new(vec![0u8; 16]), plaintext: "hi".into() });
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Encoding);
    }

    #[test]
    fn open_rejects_invalid_utf8_plaintext() {
        let service = service();
        let key = DerivedKey::from_slice(&[3u8; 32]).unwrap();

        // Seal raw non-UTF-8 bytes directly through the core
        let sealed = seal(&key, &[0xFF, 0xFE], &mut rand::rngs::OsRng).unwrap();
        let result = service.open(OpenRequest {
            key: key_bytes(&key),
            sealed: wire::encode(&sealed.to_bytes()),
        });

        assert_eq!(result.unwrap_err().kind(), ErrorKind::Encoding);
    }

    #[test]
    fn seal_open_roundtrip() {
        let service = service();
        let key = DerivedKey::from_slice(&[9u8; 32]).unwrap();

        let sealed = service
            .seal(SealRequest { key: key_bytes(&key), plaintext: "héllo ✓".into() })
            .unwrap();
        let opened =
            service.open(OpenRequest { key: key_bytes(&key), sealed: sealed.sealed }).unwrap();

        assert_eq!(opened.plaintext, "héllo ✓");
    }

    #[test]
    fn barcode_is_png() {
        let response =
            service().encode_barcode(BarcodeRequest { text: "pair me".into() }).unwrap();
        assert!(response.png.starts_with(b"\x89PNG"));
    }
}
