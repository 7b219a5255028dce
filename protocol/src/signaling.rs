/*!
Signaling messages exchanged between clients and the relay server to
broker a call between exactly two endpoints.
*/

use serde::{Deserialize, Serialize};

use crate::{HandshakePayload, PeerId};

/// Messages travelling over the signaling socket, serialized as JSON text
/// frames. The same `enum` is used in both directions; the relay only ever
/// originates [`SignalMessage::IdentityAssigned`] and
/// [`SignalMessage::CallEnded`], clients only ever originate
/// [`SignalMessage::Invite`] and [`SignalMessage::Answer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalMessage {
    /// First message on every new connection: the identity the relay
    /// assigned to it. Delivered before anything else is forwarded to the
    /// connection.
    IdentityAssigned {
        /// The freshly assigned identity.
        id: PeerId,
    },

    /// Call invitation carrying the caller's handshake payload. The relay
    /// forwards it to `to` with `from` rewritten to the sender's registered
    /// identity, without touching the payload.
    Invite {
        /// Endpoint being called.
        to: PeerId,
        /// Calling endpoint; stamped by the relay on forwarding.
        from: PeerId,
        /// The caller's opaque handshake payload.
        payload: HandshakePayload,
    },

    /// Callee's accepting handshake payload, forwarded to `to` unmodified.
    Answer {
        /// The original caller.
        to: PeerId,
        /// The callee's opaque handshake payload.
        payload: HandshakePayload,
    },

    /// Broadcast by the relay to all remaining endpoints when some endpoint
    /// disconnects. Carries no payload; an idle client ignores it.
    CallEnded,
}
