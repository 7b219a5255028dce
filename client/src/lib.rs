/*!
Transport-agnostic call-session core for gesture-call.

The crate governs one endpoint's view of a two-party call: placing a call,
ringing on an incoming invitation, exchanging handshake payloads through the
signaling relay, and relaying gesture labels over the peer data channel once
the call is connected.

The actual peer connection (ICE, DTLS, media) is an external collaborator
hidden behind the [`Transport`]/[`TransportFactory`] traits, and all state
transitions live in the pure [`CallSession`] machine, so the whole lifecycle
is testable without a network or a camera.

# Example

Driving a caller up to the point where its invitation is ready for the relay:

```
use gesture_call_client::transport::{Transport, TransportEvent, TransportFactory};
use gesture_call_client::{CallClient, HandshakePayload, PeerId, SignalMessage};

struct NullTransport;

impl Transport for NullTransport {
    fn signal(&mut self, _payload: HandshakePayload) -> gesture_call_client::Result<()> {
        Ok(())
    }
    fn send(&mut self, _bytes: &[u8]) -> gesture_call_client::Result<()> {
        Ok(())
    }
    fn destroy(&mut self) {}
}

struct NullFactory;

impl TransportFactory for NullFactory {
    type Session = NullTransport;
    fn create(
        &mut self,
        _initiator: bool,
        _remote_payload: Option<HandshakePayload>,
    ) -> gesture_call_client::Result<NullTransport> {
        Ok(NullTransport)
    }
}

let mut client = CallClient::new(NullFactory);
client.handle_signal_message(SignalMessage::IdentityAssigned {
    id: PeerId::new("u1".to_owned()),
});
client.place_call(PeerId::new("u2".to_owned()));
// the transport produced its handshake payload
client.handle_transport_event(TransportEvent::Signal(HandshakePayload::new(
    "offer-1".to_owned(),
)));
let invite = client.next_outgoing().expect("invitation ready for the relay");
assert!(matches!(invite, SignalMessage::Invite { .. }));
```
*/

#![allow(clippy::module_name_repetitions)]
// clippy WARN level lints
#![warn(
    clippy::pedantic,
    clippy::dbg_macro,
    clippy::unwrap_used,
    clippy::map_err_ignore,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unreachable
)]

pub mod client;
pub mod constants;
mod error;
pub mod gesture;
pub mod session;
pub mod transport;

pub use client::{CallClient, ClientEvent};
pub use error::{Error, Result};
pub use gesture_call_protocol::{ChannelMessage, HandshakePayload, PeerId, SignalMessage};
pub use session::{CallEvent, CallPhase, CallSession, Effect, EndReason};
pub use transport::{Transport, TransportEvent, TransportFactory};
