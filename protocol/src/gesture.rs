/*!
Messages riding on the peer-to-peer data channel once a call is connected.
*/

use serde::{Deserialize, Serialize};

/// A data-channel message, UTF-8 JSON on the wire. Tagged by `kind` so that
/// frames of an unknown kind fail to deserialize and can be dropped by the
/// receiver without affecting the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChannelMessage {
    /// A gesture classification result observed on the sender's side.
    Gesture {
        /// Classification label, e.g. `"Fist"` or the `"No Hand"` sentinel.
        label: String,
    },
}
