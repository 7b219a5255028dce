/*!
Signaling relay for gesture-call.

Keeps a registry of connected endpoints keyed by relay-assigned identity and
forwards call invitations and answers between exactly the two endpoints
involved in a call. Signaling is best-effort: messages addressed to an
unknown identity are dropped without an error back to the sender.
*/

pub mod relay;
pub mod router;
