// Transient feedback text ("OPEN → reset", ...). Cosmetic, never authoritative state.
// A notification reverts on its own once its display window has passed.

use serde::{Deserialize, Serialize};

use crate::focus::Instruction;
use crate::types::*;

/// A short-lived feedback message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub text: String,
    pub issued_at: Timestamp,
    pub duration_us: u64,
}

impl Notification {
    pub fn expires_at(&self) -> Timestamp {
        Timestamp::from_micros(self.issued_at.as_micros().saturating_add(self.duration_us))
    }

    pub fn is_active(&self, now: Timestamp) -> bool {
        now >= self.issued_at && now < self.expires_at()
    }
}

/// Produces and expires feedback messages for applied instructions.
#[derive(Debug, Clone)]
pub struct Notifier {
    duration_ms: u64,
    current: Option<Notification>,
}

impl Notifier {
    pub fn new(duration_ms: u64) -> Self {
        Notifier {
            duration_ms,
            current: None,
        }
    }

    /// Replace the current message with feedback for `gesture`.
    pub fn notify(&mut self, gesture: &ConfirmedGesture, instruction: &Instruction) -> Notification {
        let notification = Notification {
            text: feedback_text(gesture.label, instruction),
            issued_at: gesture.timestamp,
            duration_us: self.duration_ms.saturating_mul(1000),
        };
        self.current = Some(notification.clone());
        notification
    }

    /// The message still on screen at `now`, if any.
    pub fn active(&self, now: Timestamp) -> Option<&Notification> {
        self.current.as_ref().filter(|n| n.is_active(now))
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_MS)
    }
}

fn feedback_text(label: GestureLabel, instruction: &Instruction) -> String {
    match (label, instruction) {
        (GestureLabel::Open, Instruction::Visibility(_)) => "OPEN → mirror mode".to_string(),
        (GestureLabel::Fist, Instruction::Visibility(_)) => "FIST → show UI".to_string(),
        (GestureLabel::Open, _) => "OPEN → reset".to_string(),
        (GestureLabel::Fist, _) => "FIST → calendar focus".to_string(),
        (GestureLabel::ThumbsUp, _) => "THUMBS UP → weather focus".to_string(),
        (GestureLabel::TwoFingers, Instruction::Focus(focus)) => {
            let panel = focus.current_focus.map(|p| p.as_str()).unwrap_or("none");
            format!("TWO FINGERS → {} focus", panel)
        }
        (label, _) => label.as_str().to_uppercase(),
    }
}
