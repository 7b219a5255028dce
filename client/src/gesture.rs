//! Gesture classification and the send-on-change relay policy.
//!
//! The classifier is a handful of fingertip-versus-knuckle comparisons over
//! the 21-point hand landmark set produced by the external pose estimator.
//! Landmark coordinates follow image convention: y grows downwards, so a
//! curled fingertip sits "below" its knuckle with the larger y.

use std::fmt::{Display, Formatter};

use gesture_call_protocol::ChannelMessage;

use crate::constants::HAND_LANDMARK_COUNT;

/// One estimated hand joint position, `[x, y, z]` in frame coordinates.
pub type Landmark = [f32; 3];

// (fingertip, middle knuckle) landmark index pairs
const INDEX_FINGER: (usize, usize) = (8, 6);
const MIDDLE_FINGER: (usize, usize) = (12, 10);
const RING_FINGER: (usize, usize) = (16, 14);
const PINKY_FINGER: (usize, usize) = (20, 18);
const THUMB_TIP: usize = 4;
const THUMB_DIP: usize = 3;

/// Closed classification vocabulary plus the no-hand sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureLabel {
    /// All four fingertips curled below their knuckles.
    Fist,
    /// A visible hand that is neither a fist nor a thumbs-up.
    OpenPalm,
    /// Thumb raised, index and middle fingers curled.
    ThumbsUp,
    /// No hand detected in the frame.
    NoHand,
}

impl GestureLabel {
    /// The wire representation of this label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fist => "Fist",
            Self::OpenPalm => "Open Palm",
            Self::ThumbsUp => "Thumbs Up",
            Self::NoHand => "No Hand",
        }
    }
}

impl Display for GestureLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify one landmark set. An empty or truncated set means no hand was
/// detected.
#[must_use]
pub fn classify(landmarks: &[Landmark]) -> GestureLabel {
    if landmarks.len() < HAND_LANDMARK_COUNT {
        return GestureLabel::NoHand;
    }

    let curled =
        |(tip, knuckle): (usize, usize)| landmarks[tip][1] > landmarks[knuckle][1];

    if curled(INDEX_FINGER) && curled(MIDDLE_FINGER) && curled(RING_FINGER) && curled(PINKY_FINGER)
    {
        return GestureLabel::Fist;
    }

    let thumb_raised = landmarks[THUMB_TIP][1] < landmarks[THUMB_DIP][1];
    if thumb_raised && curled(INDEX_FINGER) && curled(MIDDLE_FINGER) {
        return GestureLabel::ThumbsUp;
    }

    GestureLabel::OpenPalm
}

/// Remembers the last transmitted label so that an unchanged label is
/// coalesced instead of re-sent on every sampling tick.
#[derive(Debug, Default)]
pub struct GestureTracker {
    last_sent: Option<GestureLabel>,
}

impl GestureTracker {
    /// Tracker with no transmission history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record this tick's label and return the message to transmit, if the
    /// label differs from the last transmitted one.
    pub fn on_sample(&mut self, label: GestureLabel) -> Option<ChannelMessage> {
        if self.last_sent == Some(label) {
            return None;
        }
        self.last_sent = Some(label);
        Some(ChannelMessage::Gesture {
            label: label.as_str().to_owned(),
        })
    }

    /// Forget the transmission history, e.g. when a new call starts.
    pub fn reset(&mut self) {
        self.last_sent = None;
    }
}
