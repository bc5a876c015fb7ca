//! Two-message PAKE handshake.
//!
//! Both sides derive the same generator `G` from the password and context,
//! then run Diffie-Hellman on top of it. An attacker who does not know the
//! password cannot compute `G` and so cannot predict the shared point.
//!
//! ```text
//! Initiator                                   Responder
//!   y ← random, Y = y·G
//!   MessageA = Y || context   ───────────▶
//!                                              x ← random, X = x·G
//!                                              Z = x·Y
//!                             ◀───────────    MessageB = X || context
//!   Z = y·X
//!
//! SharedSecret = SHA-256(label || G || len(A) || MessageA || X || Z)
//! ```
//!
//! # Security
//!
//! - A password mismatch is indistinguishable from a match until the derived
//!   keys are used: both sides finish successfully with different secrets
//! - A context mismatch behaves like a password mismatch: the generators
//!   differ, so both sides finish with different secrets
//! - Peer elements are decoded with validity and identity checks before use
//! - Transcript binding ties the secret to this exact pair of messages,
//!   including the context bytes MessageA carries
//! - Sessions are single use; secrets are cleared as soon as a session
//!   finishes or fails, and on drop

use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, Zeroizing};

use crate::{
    PakeError,
    group::{PakeGroup, Ristretto255},
};

/// Length of the raw shared secret in bytes.
pub const SHARED_SECRET_LEN: usize = 32;

/// Domain separation label for the transcript hash
const TRANSCRIPT_LABEL: &[u8] = b"pairlock-transcript-v1";

/// Context-binding bytes mixed into the generator.
///
/// Both parties must use the same context for the handshake to agree. The
/// context travels in the clear after the element in each message; the
/// receiver never trusts it and always uses its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextInfo {
    bytes: Vec<u8>,
}

impl ContextInfo {
    /// No context binding.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Raw context bytes chosen by the application.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: bytes.into() }
    }

    /// Context naming both parties plus optional associated data.
    ///
    /// Each field is prefixed with its big-endian `u32` length so distinct
    /// triples never encode to the same bytes.
    pub fn for_parties(initiator: &str, responder: &str, associated_data: &[u8]) -> Self {
        let mut bytes =
            Vec::with_capacity(12 + initiator.len() + responder.len() + associated_data.len());
        for field in [initiator.as_bytes(), responder.as_bytes(), associated_data] {
            bytes.extend_from_slice(&(field.len() as u32).to_be_bytes());
            bytes.extend_from_slice(field);
        }
        Self { bytes }
    }

    /// Encoded context bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether no context is bound.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Which side of the handshake a session plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Sends MessageA, completes with [`Session::finish`]
    Initiator,
    /// Answers MessageA with MessageB inside [`exchange`]
    Responder,
}

/// Lifecycle of a handshake session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Own message emitted, waiting for the peer's
    Started,
    /// Responder produced MessageB and the shared secret
    Exchanged,
    /// Initiator derived the shared secret
    Finished,
    /// A step failed; the session is unusable
    Failed,
}

impl SessionStatus {
    /// Whether secrets have been released and no further step is allowed.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Started)
    }
}

/// Raw handshake output. Zeroized on drop.
///
/// Feed this to [`crate::derive_key`] and let it go out of scope.
pub struct SharedSecret(pub(crate) [u8; SHARED_SECRET_LEN]);

impl SharedSecret {
    /// Secret bytes.
    pub fn as_bytes(&self) -> &[u8; SHARED_SECRET_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret([REDACTED])")
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// One side of a handshake.
///
/// Holds the ephemeral scalar and password-derived generator between the
/// two messages. Both are overwritten the moment the session leaves
/// [`SessionStatus::Started`] and again on drop.
pub struct Session<G: PakeGroup = Ristretto255> {
    role: Role,
    status: SessionStatus,
    scalar: Zeroizing<G::Scalar>,
    generator: Zeroizing<G::Element>,
    context: ContextInfo,
    /// Message this side put on the wire (element encoding || context)
    own_message: Vec<u8>,
}

impl<G: PakeGroup> Session<G> {
    /// Start a handshake as the initiator.
    ///
    /// Returns MessageA and the session needed to [`finish`](Self::finish).
    ///
    /// # Errors
    ///
    /// - `Internal`: randomness source unavailable
    pub fn start<R: RngCore + CryptoRng>(
        password: &[u8],
        context: ContextInfo,
        rng: &mut R,
    ) -> Result<(Vec<u8>, Self), PakeError> {
        Self::begin(Role::Initiator, password, context, rng)
    }

    /// Answer MessageA as the responder in a single call.
    ///
    /// Returns MessageB and the shared secret. The responder's ephemeral
    /// state never outlives this call.
    ///
    /// # Errors
    ///
    /// - `Encoding`: MessageA is shorter than a group element
    /// - `InvalidMessage`: invalid or identity element
    /// - `Internal`: randomness source unavailable
    pub fn exchange<R: RngCore + CryptoRng>(
        password: &[u8],
        context: ContextInfo,
        message_a: &[u8],
        rng: &mut R,
    ) -> Result<(Vec<u8>, SharedSecret), PakeError> {
        // Reject malformed input before touching the randomness source
        let mut peer = decode_element::<G>(message_a)?;
        peer.zeroize();

        let (message_b, mut session) = Self::begin(Role::Responder, password, context, rng)?;
        let secret = session.finish(message_a)?;

        Ok((message_b, secret))
    }

    fn begin<R: RngCore + CryptoRng>(
        role: Role,
        password: &[u8],
        context: ContextInfo,
        rng: &mut R,
    ) -> Result<(Vec<u8>, Self), PakeError> {
        let generator = Zeroizing::new(G::derive_generator(password, context.as_bytes()));
        let scalar = Zeroizing::new(G::random_scalar(rng)?);
        let public = G::scalar_mul(&scalar, &generator);

        let mut own_message = G::encode(&public);
        own_message.extend_from_slice(context.as_bytes());

        let session =
            Self { role, status: SessionStatus::Started, scalar, generator, context, own_message };

        Ok((session.own_message.clone(), session))
    }

    /// Complete the handshake with the peer's message.
    ///
    /// For an initiator the peer message is MessageB. Consumes the session's
    /// secrets whether or not it succeeds: a second call always fails.
    ///
    /// # Errors
    ///
    /// - `InvalidState`: session already finished or failed
    /// - `Encoding`: peer message shorter than a group element
    /// - `InvalidMessage`: invalid or identity element
    pub fn finish(&mut self, peer_message: &[u8]) -> Result<SharedSecret, PakeError> {
        if self.status != SessionStatus::Started {
            return Err(PakeError::InvalidState { operation: "finish", status: self.status });
        }

        let result = self.combine(peer_message);

        self.status = match (&result, self.role) {
            (Err(_), _) => SessionStatus::Failed,
            (Ok(_), Role::Initiator) => SessionStatus::Finished,
            (Ok(_), Role::Responder) => SessionStatus::Exchanged,
        };
        self.clear_secrets();

        result
    }

    fn combine(&self, peer_message: &[u8]) -> Result<SharedSecret, PakeError> {
        let peer = Zeroizing::new(decode_element::<G>(peer_message)?);

        let shared_point = Zeroizing::new(G::scalar_mul(&self.scalar, &peer));
        if G::is_identity(&shared_point) {
            return Err(PakeError::InvalidMessage { reason: "shared point is the identity" });
        }

        // MessageA always comes first; X is always the responder's element
        let (message_a, responder_message) = match self.role {
            Role::Initiator => (self.own_message.as_slice(), peer_message),
            Role::Responder => (peer_message, self.own_message.as_slice()),
        };
        let responder_element = &responder_message[..G::ELEMENT_LEN];

        let generator_bytes = Zeroizing::new(G::encode(&self.generator));
        let shared_bytes = Zeroizing::new(G::encode(&shared_point));

        Ok(transcript_secret(&generator_bytes, message_a, responder_element, &shared_bytes))
    }

    fn clear_secrets(&mut self) {
        self.scalar.zeroize();
        self.generator.zeroize();
    }

    /// Role this session plays.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Current lifecycle status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Context bound into this session.
    pub fn context(&self) -> &ContextInfo {
        &self.context
    }

    /// Message this side sent to its peer.
    pub fn own_message(&self) -> &[u8] {
        &self.own_message
    }
}

impl<G: PakeGroup> std::fmt::Debug for Session<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("group", &G::NAME)
            .field("role", &self.role)
            .field("status", &self.status)
            .field("context_len", &self.context.as_bytes().len())
            .finish_non_exhaustive()
    }
}

/// Start a ristretto255 handshake as the initiator.
///
/// See [`Session::start`].
pub fn start<R: RngCore + CryptoRng>(
    password: &[u8],
    context: ContextInfo,
    rng: &mut R,
) -> Result<(Vec<u8>, Session), PakeError> {
    Session::<Ristretto255>::start(password, context, rng)
}

/// Answer a ristretto255 MessageA as the responder.
///
/// See [`Session::exchange`].
pub fn exchange<R: RngCore + CryptoRng>(
    password: &[u8],
    context: ContextInfo,
    message_a: &[u8],
    rng: &mut R,
) -> Result<(Vec<u8>, SharedSecret), PakeError> {
    Session::<Ristretto255>::exchange(password, context, message_a, rng)
}

/// Decode the element at the front of a wire message.
///
/// Whatever follows the element is the sender's context. It is not compared
/// with ours; a different context already means a different generator.
fn decode_element<G: PakeGroup>(message: &[u8]) -> Result<G::Element, PakeError> {
    let Some(element) = message.get(..G::ELEMENT_LEN) else {
        return Err(PakeError::Encoding { reason: "message shorter than a group element" });
    };

    G::decode(element)
}

/// Hash the transcript into the shared secret.
///
/// Element encodings have a fixed length per group; only MessageA needs a
/// length prefix.
fn transcript_secret(
    generator: &[u8],
    message_a: &[u8],
    responder_element: &[u8],
    shared_point: &[u8],
) -> SharedSecret {
    let mut hasher = Sha256::new();
    hasher.update(TRANSCRIPT_LABEL);
    hasher.update(generator);
    hasher.update((message_a.len() as u64).to_be_bytes());
    hasher.update(message_a);
    hasher.update(responder_element);
    hasher.update(shared_point);
    let mut digest = hasher.finalize();

    let mut secret = [0u8; SHARED_SECRET_LEN];
    secret.copy_from_slice(&digest);
    digest.as_mut_slice().zeroize();
    SharedSecret(secret)
}
