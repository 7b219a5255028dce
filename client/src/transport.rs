//! Boundary contract for the underlying peer-to-peer connection.
//!
//! The real transport (WebRTC or otherwise) lives with the embedder, along
//! with the captured local media it streams; remote media goes straight to
//! the embedder's rendering layer and never passes through this crate. The
//! call state machine only needs the small surface below.

use gesture_call_protocol::HandshakePayload;

use crate::error::Result;

/// Events a transport session reports back to the call state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A local handshake payload is ready to be relayed to the peer.
    Signal(HandshakePayload),
    /// The data channel is usable in both directions.
    Connect,
    /// A message arrived on the data channel.
    Data(Vec<u8>),
    /// Unrecoverable transport failure; the call ends.
    Error(String),
    /// The connection closed.
    Close,
}

/// One live point-to-point session.
pub trait Transport {
    /// Feed a remote handshake payload into the session. The caller uses
    /// this to complete the handshake once an answer arrives.
    fn signal(&mut self, payload: HandshakePayload) -> Result<()>;

    /// Transmit bytes on the data channel. Must return an error, not
    /// silently drop, if called before [`TransportEvent::Connect`] was
    /// reported.
    fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Release all transport resources. Idempotent.
    fn destroy(&mut self);
}

/// Constructs transport sessions around the embedder's captured local media.
///
/// An embedder that failed to acquire a usable camera handle cannot offer a
/// working factory, which is what keeps the state machine from ever placing
/// or accepting a call without local media.
pub trait TransportFactory {
    /// The session type this factory produces.
    type Session: Transport;

    /// Construct a session. When `initiator` is true the session produces
    /// its handshake payload asynchronously via [`TransportEvent::Signal`];
    /// otherwise `remote_payload` must carry the caller's payload.
    fn create(
        &mut self,
        initiator: bool,
        remote_payload: Option<HandshakePayload>,
    ) -> Result<Self::Session>;
}
