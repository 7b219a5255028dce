/*!
Helper crate that declares the wire types shared between the gesture-call
client library and the signaling relay server.

Two independent channels are covered: the signaling socket between each
client and the relay ([`SignalMessage`]), and the peer-to-peer data channel
that carries gesture labels once a call is connected ([`ChannelMessage`]).
*/

#![warn(missing_docs)]

use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod gesture;
pub mod signaling;

pub use gesture::ChannelMessage;
pub use signaling::SignalMessage;

/// Opaque identity the relay assigns to each connected endpoint.
/// Lives for the duration of the socket connection and is the addressing
/// key for call setup.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize, Hash)]
pub struct PeerId(String);

impl PeerId {
    /// Wrap a `String` into a `PeerId`.
    #[must_use]
    pub const fn new(inner: String) -> Self {
        Self(inner)
    }

    /// Return a reference to the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Acquire the underlying type.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl FromStr for PeerId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

impl Display for PeerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handshake payload produced by the peer-connection transport
/// (addressing, media and security parameters). Neither the relay nor the
/// call state machine ever look inside it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandshakePayload(String);

impl HandshakePayload {
    /// Wrap a `String` into a `HandshakePayload`.
    #[must_use]
    pub const fn new(inner: String) -> Self {
        Self(inner)
    }

    /// Return a reference to the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Acquire the underlying type.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for HandshakePayload {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
