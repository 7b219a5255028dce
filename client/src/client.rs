//! Stateful driver tying the pure state machine to a transport and the
//! signaling socket.
//!
//! The embedder owns both event loops: it flushes [`CallClient::next_outgoing`]
//! frames to the relay socket, feeds inbound frames and transport events back
//! in, runs the gesture sampling timer while [`CallClient::sampling_active`],
//! and presents [`ClientEvent`]s to the user.

use std::collections::VecDeque;

use anyhow::anyhow;
use gesture_call_protocol::{ChannelMessage, PeerId, SignalMessage};
use log::{debug, warn};

use crate::gesture::{classify, GestureTracker, Landmark};
use crate::session::{CallEvent, CallPhase, CallSession, Effect, EndReason};
use crate::transport::{Transport, TransportEvent, TransportFactory};

/// User-facing happenings, drained via [`CallClient::next_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// The relay assigned us this identity; share it with the other party
    /// out of band so they can call us.
    IdentityAssigned(PeerId),
    /// Someone is calling; accept or ignore.
    IncomingCall {
        /// The calling endpoint.
        from: PeerId,
    },
    /// The call is live.
    Connected,
    /// The call ended.
    Ended(EndReason),
    /// The peer's latest gesture label.
    RemoteGesture(String),
}

/// One endpoint of a gesture-relaying video call.
///
/// Owns the call session and, for the duration of a call attempt, the
/// transport session; the transport is torn down on every path into
/// [`CallPhase::Ended`].
pub struct CallClient<F: TransportFactory> {
    session: CallSession,
    factory: F,
    transport: Option<F::Session>,
    outbox: VecDeque<SignalMessage>,
    events: VecDeque<ClientEvent>,
    gestures: GestureTracker,
    sampling: bool,
}

impl<F: TransportFactory> CallClient<F> {
    /// New idle client. The factory wraps the embedder's captured local
    /// media; transports are only constructed once a call is placed or
    /// accepted.
    pub fn new(factory: F) -> Self {
        Self {
            session: CallSession::new(),
            factory,
            transport: None,
            outbox: VecDeque::new(),
            events: VecDeque::new(),
            gestures: GestureTracker::new(),
            sampling: false,
        }
    }

    /// Current call phase.
    #[must_use]
    pub fn phase(&self) -> CallPhase {
        self.session.phase()
    }

    /// Our relay-assigned identity, once delivered.
    #[must_use]
    pub fn local_id(&self) -> Option<&PeerId> {
        self.session.local_id()
    }

    /// Whether the embedder should be running the gesture sampling timer.
    #[must_use]
    pub const fn sampling_active(&self) -> bool {
        self.sampling
    }

    /// Next signaling frame to flush to the relay socket, if any.
    pub fn next_outgoing(&mut self) -> Option<SignalMessage> {
        self.outbox.pop_front()
    }

    /// Next user-facing event, if any.
    pub fn next_event(&mut self) -> Option<ClientEvent> {
        self.events.pop_front()
    }

    /// Local user calls the given endpoint.
    pub fn place_call(&mut self, to: PeerId) {
        self.dispatch(CallEvent::PlaceCall(to));
    }

    /// Local user accepts the pending invitation.
    pub fn accept(&mut self) {
        self.dispatch(CallEvent::AcceptCall);
    }

    /// Local user hangs up.
    pub fn hang_up(&mut self) {
        self.dispatch(CallEvent::HangUp);
    }

    /// Feed one frame received from the signaling socket.
    pub fn handle_signal_message(&mut self, message: SignalMessage) {
        match message {
            SignalMessage::IdentityAssigned { id } => {
                self.events.push_back(ClientEvent::IdentityAssigned(id.clone()));
                self.dispatch(CallEvent::IdentityAssigned(id));
            }
            SignalMessage::Invite { from, payload, .. } => {
                self.dispatch(CallEvent::InviteReceived { from, payload });
            }
            SignalMessage::Answer { payload, .. } => {
                self.dispatch(CallEvent::AnswerReceived(payload));
            }
            SignalMessage::CallEnded => self.dispatch(CallEvent::CallEndedNotice),
        }
    }

    /// Feed one event reported by the transport session.
    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Signal(payload) => self.dispatch(CallEvent::HandshakeReady(payload)),
            TransportEvent::Connect => self.dispatch(CallEvent::TransportConnected),
            TransportEvent::Data(bytes) => self.handle_channel_data(&bytes),
            TransportEvent::Error(reason) => self.dispatch(CallEvent::TransportFailed(reason)),
            TransportEvent::Close => self.dispatch(CallEvent::TransportClosed),
        }
    }

    /// One tick of the gesture sampling timer: classify the current landmark
    /// set and relay the label to the peer iff it changed since the last
    /// transmission.
    ///
    /// A failed send is logged and absorbed; gestures are a side channel and
    /// never bring the call down.
    pub fn gesture_tick(&mut self, landmarks: &[Landmark]) {
        if self.session.phase() != CallPhase::Connected {
            return;
        }
        let label = classify(landmarks);
        if let Some(message) = self.gestures.on_sample(label) {
            let bytes =
                serde_json::to_vec(&message).expect("channel messages always serialize");
            let result = match self.transport.as_mut() {
                Some(transport) => transport.send(&bytes),
                None => Err(anyhow!("no transport session")),
            };
            if let Err(err) = result {
                warn!("failed to relay gesture label: {:?}", err);
                // forget the failed transmission so the label is retried on
                // the next tick instead of being lost until it changes
                self.gestures.reset();
            }
        }
    }

    fn dispatch(&mut self, event: CallEvent) {
        let effects = self.session.apply(event);
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::CreateTransport {
                initiator,
                remote_payload,
            } => match self.factory.create(initiator, remote_payload) {
                Ok(transport) => self.transport = Some(transport),
                Err(err) => self.dispatch(CallEvent::TransportFailed(format!(
                    "failed to construct transport session: {err}"
                ))),
            },
            Effect::FeedTransport(payload) => {
                let result = match self.transport.as_mut() {
                    Some(transport) => transport.signal(payload),
                    None => Err(anyhow!("no transport session to signal")),
                };
                if let Err(err) = result {
                    self.dispatch(CallEvent::TransportFailed(format!(
                        "handshake failed: {err}"
                    )));
                }
            }
            Effect::SendInvite { to, payload } => match self.session.local_id().cloned() {
                Some(from) => self.outbox.push_back(SignalMessage::Invite { to, from, payload }),
                None => warn!("cannot send an invitation before identity assignment"),
            },
            Effect::SendAnswer { to, payload } => {
                self.outbox.push_back(SignalMessage::Answer { to, payload });
            }
            Effect::DestroyTransport => {
                // take() makes repeated teardown paths a no-op
                if let Some(mut transport) = self.transport.take() {
                    transport.destroy();
                }
            }
            Effect::StartGestureSampling => self.sampling = true,
            Effect::StopGestureSampling => {
                self.sampling = false;
                self.gestures.reset();
            }
            Effect::NotifyIncoming { from } => {
                self.events.push_back(ClientEvent::IncomingCall { from });
            }
            Effect::NotifyConnected => self.events.push_back(ClientEvent::Connected),
            Effect::NotifyEnded(reason) => self.events.push_back(ClientEvent::Ended(reason)),
        }
    }

    fn handle_channel_data(&mut self, bytes: &[u8]) {
        match serde_json::from_slice::<ChannelMessage>(bytes) {
            Ok(ChannelMessage::Gesture { label }) => {
                self.events.push_back(ClientEvent::RemoteGesture(label));
            }
            // Side-channel noise never escalates to a transport failure.
            Err(err) => debug!("ignoring malformed data channel frame: {}", err),
        }
    }
}
