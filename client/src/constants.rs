//! Tunables shared with embedders.

/// Gesture sampling cadence while a call is connected, for the embedder's
/// timer. The state machine tells the embedder when to start and stop the
/// timer via effects.
pub const GESTURE_SAMPLE_INTERVAL_MS: u64 = 100;

/// Number of joints in one estimated hand landmark set.
pub const HAND_LANDMARK_COUNT: usize = 21;
