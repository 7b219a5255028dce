//! Pure call-lifecycle state machine.
//!
//! Every transition is `(state, event) -> effect list`; no I/O happens here.
//! The [`crate::client::CallClient`] driver executes the effects against the
//! transport and the signaling socket.

use gesture_call_protocol::{HandshakePayload, PeerId};
use log::{debug, warn};

/// Lifecycle phase of one call attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CallPhase {
    /// No active or pending call.
    #[default]
    Idle,
    /// Caller side: waiting for the handshake to complete.
    Calling,
    /// Callee side: an invitation is pending the user's accept.
    Ringing,
    /// The transport reported a live connection.
    Connected,
    /// Terminal. All transport resources released.
    Ended,
}

/// Why a call reached [`CallPhase::Ended`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// The local user hung up.
    HungUp,
    /// The relay delivered a call-ended notice.
    RemoteEnded,
    /// The transport connection closed.
    ConnectionClosed,
    /// Transport construction or handshake failed.
    Failed(String),
}

/// Inputs driving the machine: local user intent, relay-delivered messages
/// and transport session events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEvent {
    /// The relay assigned our identity.
    IdentityAssigned(PeerId),
    /// Local user wants to call the given endpoint.
    PlaceCall(PeerId),
    /// Local user accepts the pending invitation.
    AcceptCall,
    /// Local user hangs up.
    HangUp,
    /// An invitation arrived from the relay.
    InviteReceived {
        /// The calling endpoint.
        from: PeerId,
        /// The caller's handshake payload.
        payload: HandshakePayload,
    },
    /// The callee's answer arrived from the relay.
    AnswerReceived(HandshakePayload),
    /// The relay broadcast that some endpoint disconnected.
    CallEndedNotice,
    /// The local transport produced its handshake payload.
    HandshakeReady(HandshakePayload),
    /// The transport reported a live connection.
    TransportConnected,
    /// The transport failed.
    TransportFailed(String),
    /// The transport connection closed.
    TransportClosed,
}

/// Side effects for the driver to execute, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Construct a transport session.
    CreateTransport {
        /// Whether this side initiates the handshake.
        initiator: bool,
        /// The remote payload, present on the accepting side.
        remote_payload: Option<HandshakePayload>,
    },
    /// Feed a remote payload into the existing transport session.
    FeedTransport(HandshakePayload),
    /// Send an invitation to the relay.
    SendInvite {
        /// The endpoint to call.
        to: PeerId,
        /// Our handshake payload.
        payload: HandshakePayload,
    },
    /// Send an answer to the relay.
    SendAnswer {
        /// The original caller.
        to: PeerId,
        /// Our handshake payload.
        payload: HandshakePayload,
    },
    /// Destroy the transport session, releasing its resources.
    DestroyTransport,
    /// Start the gesture sampling timer.
    StartGestureSampling,
    /// Cancel the gesture sampling timer.
    StopGestureSampling,
    /// Tell the user someone is calling.
    NotifyIncoming {
        /// The calling endpoint.
        from: PeerId,
    },
    /// Tell the user the call is live.
    NotifyConnected,
    /// Tell the user the call is over and why.
    NotifyEnded(EndReason),
}

/// One endpoint's view of a single call attempt. Exclusively owned by the
/// local client; the relay never materializes one of these.
#[derive(Debug, Default)]
pub struct CallSession {
    local_id: Option<PeerId>,
    remote_id: Option<PeerId>,
    phase: CallPhase,
    pending_invite: Option<HandshakePayload>,
    answer_consumed: bool,
}

impl CallSession {
    /// Fresh session in [`CallPhase::Idle`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> CallPhase {
        self.phase
    }

    /// Identity assigned to us by the relay, once delivered.
    #[must_use]
    pub const fn local_id(&self) -> Option<&PeerId> {
        self.local_id.as_ref()
    }

    /// The other party of the current call attempt, if any.
    #[must_use]
    pub const fn remote_id(&self) -> Option<&PeerId> {
        self.remote_id.as_ref()
    }

    /// Apply one event and return the effects to execute.
    ///
    /// [`CallPhase::Ended`] is terminal: every later event is ignored, so a
    /// late transport error after a hang-up cannot destroy anything twice.
    pub fn apply(&mut self, event: CallEvent) -> Vec<Effect> {
        if self.phase == CallPhase::Ended {
            debug!("call already ended, ignoring {:?}", event);
            return Vec::new();
        }
        match event {
            CallEvent::IdentityAssigned(id) => {
                self.local_id = Some(id);
                Vec::new()
            }
            CallEvent::PlaceCall(to) => self.on_place_call(to),
            CallEvent::InviteReceived { from, payload } => self.on_invite(from, payload),
            CallEvent::AcceptCall => self.on_accept(),
            CallEvent::AnswerReceived(payload) => match self.phase {
                // An answer is consumed exactly once per call attempt; a
                // duplicate must not reach the transport a second time.
                CallPhase::Calling if !self.answer_consumed => {
                    self.answer_consumed = true;
                    vec![Effect::FeedTransport(payload)]
                }
                phase => {
                    warn!("unexpected or duplicate answer while {:?}, ignoring", phase);
                    Vec::new()
                }
            },
            CallEvent::HandshakeReady(payload) => self.on_handshake_ready(payload),
            CallEvent::TransportConnected => match self.phase {
                CallPhase::Calling | CallPhase::Ringing => {
                    self.phase = CallPhase::Connected;
                    vec![Effect::StartGestureSampling, Effect::NotifyConnected]
                }
                phase => {
                    warn!("transport connected while {:?}, ignoring", phase);
                    Vec::new()
                }
            },
            CallEvent::HangUp => match self.phase {
                CallPhase::Idle => Vec::new(),
                _ => self.end(EndReason::HungUp),
            },
            CallEvent::CallEndedNotice => match self.phase {
                // The relay broadcasts the notice to everyone; idle
                // endpoints are not in a call and drop it.
                CallPhase::Idle => Vec::new(),
                _ => self.end(EndReason::RemoteEnded),
            },
            CallEvent::TransportFailed(reason) => match self.phase {
                CallPhase::Idle => Vec::new(),
                _ => self.end(EndReason::Failed(reason)),
            },
            CallEvent::TransportClosed => match self.phase {
                CallPhase::Idle => Vec::new(),
                _ => self.end(EndReason::ConnectionClosed),
            },
        }
    }

    fn on_place_call(&mut self, to: PeerId) -> Vec<Effect> {
        match self.phase {
            CallPhase::Idle => {
                if self.local_id.is_none() {
                    // The relay delivers our identity before anything else,
                    // so a missing identity means the socket is not up yet.
                    warn!("cannot place a call before identity assignment");
                    return Vec::new();
                }
                self.phase = CallPhase::Calling;
                self.remote_id = Some(to);
                vec![Effect::CreateTransport {
                    initiator: true,
                    remote_payload: None,
                }]
            }
            phase => {
                warn!("cannot place a call while {:?}", phase);
                Vec::new()
            }
        }
    }

    fn on_invite(&mut self, from: PeerId, payload: HandshakePayload) -> Vec<Effect> {
        match self.phase {
            CallPhase::Idle => {
                // The payload is retained but no transport is constructed
                // until the user accepts.
                self.phase = CallPhase::Ringing;
                self.remote_id = Some(from.clone());
                self.pending_invite = Some(payload);
                vec![Effect::NotifyIncoming { from }]
            }
            // Glare: both sides invited each other. The lexicographically
            // lower identity keeps the caller role; the higher one abandons
            // its attempt and rings instead.
            CallPhase::Calling if self.remote_id.as_ref() == Some(&from) => {
                let keeps_caller_role = self.local_id.as_ref().is_some_and(|local| local < &from);
                if keeps_caller_role {
                    debug!("simultaneous call from {}, keeping caller role", from);
                    Vec::new()
                } else {
                    self.phase = CallPhase::Ringing;
                    self.pending_invite = Some(payload);
                    vec![Effect::DestroyTransport, Effect::NotifyIncoming { from }]
                }
            }
            phase => {
                // Busy policy: an invitation never overwrites an active
                // attempt; the caller's message is dropped.
                warn!("rejecting invitation from {} while {:?}", from, phase);
                Vec::new()
            }
        }
    }

    fn on_accept(&mut self) -> Vec<Effect> {
        // take() consumes the invitation; a second accept finds nothing.
        match (self.phase, self.pending_invite.take()) {
            (CallPhase::Ringing, Some(payload)) => vec![Effect::CreateTransport {
                initiator: false,
                remote_payload: Some(payload),
            }],
            (phase, _) => {
                warn!("no pending invitation to accept while {:?}", phase);
                Vec::new()
            }
        }
    }

    fn on_handshake_ready(&mut self, payload: HandshakePayload) -> Vec<Effect> {
        match (self.phase, self.remote_id.clone()) {
            (CallPhase::Calling, Some(to)) => vec![Effect::SendInvite { to, payload }],
            // Still `Ringing` between accept and connect; the payload the
            // accepting transport produced goes back as the answer. Before
            // accept the invitation is still pending and nothing may answer:
            // a stale payload from an abandoned caller transport would
            // otherwise leak out here.
            (CallPhase::Ringing, Some(to)) if self.pending_invite.is_none() => {
                vec![Effect::SendAnswer { to, payload }]
            }
            (phase, _) => {
                debug!("discarding handshake payload produced while {:?}", phase);
                Vec::new()
            }
        }
    }

    fn end(&mut self, reason: EndReason) -> Vec<Effect> {
        self.phase = CallPhase::Ended;
        self.pending_invite = None;
        vec![
            Effect::StopGestureSampling,
            Effect::DestroyTransport,
            Effect::NotifyEnded(reason),
        ]
    }
}
