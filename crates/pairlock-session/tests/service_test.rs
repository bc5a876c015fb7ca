//! Integration tests for the pairing boundary.
//!
//! Two independent services play initiator and responder, exchanging only
//! the text a real host would carry between them.

mod common;

use std::time::Duration;

use common::TestEnv;
use pairlock_crypto::{DerivedKey, ErrorKind};
use pairlock_session::{
    BarcodeRequest, ExchangeRequest, FinishRequest, HostApi, OpenRequest, PairingService,
    RegistryConfig, SealRequest, ServiceConfig, ServiceError, StartRequest, SystemEnv, wire,
};
use zeroize::Zeroizing;

fn service(seed: u64) -> (TestEnv, PairingService<TestEnv>) {
    let env = TestEnv::with_seed(seed);
    (env.clone(), PairingService::new(env, ServiceConfig::default()))
}

fn key_bytes(key: &DerivedKey) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(key.as_bytes().to_vec())
}

/// Run a full handshake between two services; returns (initiator, responder) keys.
fn pair<E: pairlock_session::Environment>(
    initiator: &PairingService<E>,
    responder: &PairingService<E>,
    initiator_password: &str,
    responder_password: &str,
    context: Option<Vec<u8>>,
) -> (DerivedKey, DerivedKey) {
    let mut start = StartRequest::new(initiator_password);
    start.context.clone_from(&context);
    let started = initiator.start(start).unwrap();

    let mut exchange = ExchangeRequest::new(responder_password, started.message_a);
    exchange.context = context;
    let exchanged = responder.exchange(exchange).unwrap();
    let finished = initiator
        .finish(FinishRequest { session: started.session, message_b: exchanged.message_b })
        .unwrap();

    (finished.key, exchanged.key)
}

#[test]
fn test_end_to_end_pairing() {
    let (_, alice) = service(1);
    let (_, bob) = service(1_000_000);

    let (alice_key, bob_key) = pair(&alice, &bob, "correct horse", "correct horse", None);
    assert_eq!(alice_key.as_bytes(), bob_key.as_bytes());

    let sealed = alice
        .seal(SealRequest { key: key_bytes(&alice_key), plaintext: "hello".into() })
        .unwrap();
    let opened =
        bob.open(OpenRequest { key: key_bytes(&bob_key), sealed: sealed.sealed }).unwrap();
    assert_eq!(opened.plaintext, "hello");

    // And back the other way
    let reply = bob
        .seal(SealRequest { key: key_bytes(&bob_key), plaintext: "hi alice".into() })
        .unwrap();
    let opened =
        alice.open(OpenRequest { key: key_bytes(&alice_key), sealed: reply.sealed }).unwrap();
    assert_eq!(opened.plaintext, "hi alice");
}

#[test]
fn test_password_mismatch_is_silent_until_open() {
    let (_, alice) = service(1);
    let (_, bob) = service(1_000_000);

    // Both sides complete without error
    let (alice_key, bob_key) = pair(&alice, &bob, "correct horse", "battery staple", None);
    assert_ne!(alice_key.as_bytes(), bob_key.as_bytes());

    let sealed = alice
        .seal(SealRequest { key: key_bytes(&alice_key), plaintext: "hello".into() })
        .unwrap();
    let err =
        bob.open(OpenRequest { key: key_bytes(&bob_key), sealed: sealed.sealed }).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
}

#[test]
fn test_context_mismatch_is_silent_until_open() {
    let (_, alice) = service(1);
    let (_, bob) = service(1_000_000);

    let started = alice.start(StartRequest::new("pw").with_context(b"room-1".to_vec())).unwrap();
    let exchanged = bob
        .exchange(ExchangeRequest::new("pw", started.message_a).with_context(b"room-2".to_vec()))
        .unwrap();
    let finished = alice
        .finish(FinishRequest { session: started.session, message_b: exchanged.message_b })
        .unwrap();
    assert_ne!(finished.key.as_bytes(), exchanged.key.as_bytes());

    let sealed = alice
        .seal(SealRequest { key: key_bytes(&finished.key), plaintext: "hello".into() })
        .unwrap();
    let err = bob
        .open(OpenRequest { key: key_bytes(&exchanged.key), sealed: sealed.sealed })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
}

#[test]
fn test_matching_context_agrees() {
    let (_, alice) = service(1);
    let (_, bob) = service(1_000_000);

    let (alice_key, bob_key) = pair(&alice, &bob, "pw", "pw", Some(b"room-1".to_vec()));
    assert_eq!(alice_key.as_bytes(), bob_key.as_bytes());
}

#[test]
fn test_seeded_transcript_matches_known_answer() {
    let (_, alice) = service(7);
    let (_, bob) = service(7_000_000);

    let started = alice.start(StartRequest::new("pw")).unwrap();
    let exchanged = bob.exchange(ExchangeRequest::new("pw", started.message_a.clone())).unwrap();

    assert_eq!(started.message_a, "oJDd5pnu928shYb4FZovPQcM_XhqRlUHlTeHfrQnahI");
    assert_eq!(exchanged.message_b, "JgoOIzPFbvqWSfBiq1Vq05vFVI7giQ64spIa0dxDC2o");
    assert_eq!(
        hex::encode(exchanged.key.as_bytes()),
        "b8463cab61ce454db8f061b42ba0737899772d11db8f275fb88ef04357e84395"
    );
}

#[test]
fn test_session_handle_is_single_use() {
    let (_, alice) = service(1);
    let (_, bob) = service(1_000_000);

    let started = alice.start(StartRequest::new("pw")).unwrap();
    let exchanged = bob.exchange(ExchangeRequest::new("pw", started.message_a)).unwrap();

    let request = FinishRequest { session: started.session, message_b: exchanged.message_b };
    alice.finish(request.clone()).unwrap();

    let err = alice.finish(request).unwrap_err();
    assert_eq!(err, ServiceError::UnknownSession(started.session));
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[test]
fn test_failed_finish_consumes_session() {
    let (_, alice) = service(1);
    let (_, bob) = service(1_000_000);

    let started = alice.start(StartRequest::new("pw")).unwrap();
    let exchanged = bob.exchange(ExchangeRequest::new("pw", started.message_a)).unwrap();

    // Truncated MessageB fails decoding into an element
    let mut truncated = exchanged.message_b.clone();
    truncated.truncate(10);
    let err = alice
        .finish(FinishRequest { session: started.session, message_b: truncated })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Encoding);

    let err = alice
        .finish(FinishRequest { session: started.session, message_b: exchanged.message_b })
        .unwrap_err();
    assert_eq!(err, ServiceError::UnknownSession(started.session));
}

#[test]
fn test_expired_session_cannot_finish() {
    let (env, alice) = service(1);
    let (_, bob) = service(1_000_000);

    let started = alice.start(StartRequest::new("pw")).unwrap();
    let exchanged = bob.exchange(ExchangeRequest::new("pw", started.message_a)).unwrap();

    env.advance(Duration::from_secs(301));

    let err = alice
        .finish(FinishRequest { session: started.session, message_b: exchanged.message_b })
        .unwrap_err();
    assert_eq!(err, ServiceError::SessionExpired(started.session));
}

#[test]
fn test_registry_capacity_is_enforced() {
    let env = TestEnv::with_seed(1);
    let config = ServiceConfig {
        registry: RegistryConfig { session_ttl: Duration::from_secs(60), max_sessions: 3 },
        ..ServiceConfig::default()
    };
    let alice = PairingService::new(env.clone(), config);

    for _ in 0..3 {
        alice.start(StartRequest::new("pw")).unwrap();
    }
    let err = alice.start(StartRequest::new("pw")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);

    // Expiry frees the slots again
    env.advance(Duration::from_secs(60));
    assert!(alice.start(StartRequest::new("pw")).is_ok());
    assert_eq!(alice.registry().len(), 1);
}

#[test]
fn test_malformed_inputs_are_encoding_errors() {
    let (_, svc) = service(1);
    let key = Zeroizing::new(vec![5u8; 32]);

    // Padded base64
    let err = svc.exchange(ExchangeRequest::new("pw", "AAAA==")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Encoding);

    // Wrong-length MessageA
    let err = svc.exchange(ExchangeRequest::new("pw", wire::encode(&[1u8; 16]))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Encoding);

    // Key of the wrong length
    for len in [0, 31, 33] {
        let err = svc
            .seal(SealRequest { key: Zeroizing::new(vec![5u8; len]), plaintext: "x".into() })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding, "key length {len}");
    }

    // Sealed payload shorter than a nonce
    let err = svc
        .open(OpenRequest { key: key.clone(), sealed: wire::encode(&[0u8; 23]) })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Encoding);

    // Nonce present but tag truncated
    let err = svc.open(OpenRequest { key, sealed: wire::encode(&[0u8; 30]) }).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
}

#[test]
fn test_host_collapses_failures_to_none() {
    let host = HostApi::new(TestEnv::with_seed(1), ServiceConfig::default());
    let peer = HostApi::new(TestEnv::with_seed(1_000_000), ServiceConfig::default());

    let started = host.start(StartRequest::new("pw")).unwrap();
    let exchanged = peer.exchange(ExchangeRequest::new("other", started.message_a)).unwrap();
    let finished = host
        .finish(FinishRequest { session: started.session, message_b: exchanged.message_b })
        .unwrap();

    let sealed = host
        .seal(SealRequest { key: key_bytes(&finished.key), plaintext: "hello".into() })
        .unwrap();

    // Wrong password shows up only as an opaque None
    let opened = peer.open(OpenRequest { key: key_bytes(&exchanged.key), sealed: sealed.sealed });
    assert!(opened.is_none());
    assert!(host.encode_barcode(BarcodeRequest { text: "pair".into() }).is_some());
}

#[test]
fn test_concurrent_handshakes() {
    let alice = PairingService::new(SystemEnv::new(), ServiceConfig::default());
    let bob = PairingService::new(SystemEnv::new(), ServiceConfig::default());

    std::thread::scope(|scope| {
        for worker in 0..8 {
            let (alice, bob) = (&alice, &bob);
            scope.spawn(move || {
                for round in 0..16 {
                    let password = format!("pw-{worker}-{round}");
                    let (a, b) = pair(alice, bob, &password, &password, None);
                    assert_eq!(a.as_bytes(), b.as_bytes());
                }
            });
        }
    });

    assert!(alice.registry().is_empty());
}
