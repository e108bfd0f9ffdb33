// Temporal confirmation and cooldown.
// Per-frame labels in, sparse confirmed gestures out. Time comes from the caller, never frame counts.

use tracing::{debug, trace};

use crate::error::EngineError;
use crate::types::*;

/// Confirmation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationConfig {
    /// Consecutive matching frames needed to emit.
    pub frames_confirm: u32,
    /// Frames are ignored for this long after an emission.
    pub cooldown_ms: u64,
    /// Same label emitted twice within this window is suppressed, even outside cooldown.
    pub dedup_window_ms: Option<u64>,
}

impl ConfirmationConfig {
    pub fn from_pipeline(config: &PipelineConfig) -> Self {
        ConfirmationConfig {
            frames_confirm: config.frames_confirm,
            cooldown_ms: config.cooldown_ms,
            dedup_window_ms: config.effective_dedup_window_ms(),
        }
    }
}

/// Where the engine is between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmPhase {
    #[default]
    Idle,
    Accumulating { label: GestureLabel, count: u32 },
    Cooldown { until: Timestamp },
}

/// Hysteresis + cooldown state machine. One instance per pipeline.
#[derive(Debug, Clone)]
pub struct ConfirmationEngine {
    config: ConfirmationConfig,
    phase: ConfirmPhase,
    last_emitted: Option<ConfirmedGesture>,
}

impl ConfirmationEngine {
    pub fn new(config: ConfirmationConfig) -> Result<Self, EngineError> {
        if config.frames_confirm < 1 {
            return Err(EngineError::InvalidConfig(
                "frames_confirm must be at least 1".to_string(),
            ));
        }
        Ok(ConfirmationEngine {
            config,
            phase: ConfirmPhase::Idle,
            last_emitted: None,
        })
    }

    pub fn phase(&self) -> ConfirmPhase {
        self.phase
    }

    /// Feed one frame's label. Returns a gesture when this frame completes a confirmation.
    pub fn observe(&mut self, label: GestureLabel, now: Timestamp) -> Option<ConfirmedGesture> {
        if let ConfirmPhase::Cooldown { until } = self.phase {
            if now < until {
                return None;
            }
            self.phase = ConfirmPhase::Idle;
        }

        if label.is_none() {
            self.decay();
            return None;
        }

        let count = match self.phase {
            ConfirmPhase::Accumulating {
                label: pending,
                count,
            } if pending == label => count.saturating_add(1),
            _ => 1,
        };

        if count < self.config.frames_confirm {
            self.phase = ConfirmPhase::Accumulating { label, count };
            trace!(label = label.as_str(), count, "Accumulating");
            return None;
        }

        self.phase = ConfirmPhase::Idle;

        if self.is_duplicate(label, now) {
            debug!(
                label = label.as_str(),
                at_ms = now.as_millis(),
                "Duplicate gesture suppressed"
            );
            return None;
        }

        let event = ConfirmedGesture {
            label,
            timestamp: now,
        };
        self.last_emitted = Some(event);
        if self.config.cooldown_ms > 0 {
            self.phase = ConfirmPhase::Cooldown {
                until: now.plus_millis(self.config.cooldown_ms),
            };
        }
        debug!(
            label = label.as_str(),
            at_ms = now.as_millis(),
            "Gesture confirmed"
        );
        Some(event)
    }

    /// Back to the initial state: no accumulation, no cooldown, no dedup history.
    pub fn reset(&mut self) {
        self.phase = ConfirmPhase::Idle;
        self.last_emitted = None;
    }

    // A `none` frame takes one off the count rather than clearing it.
    fn decay(&mut self) {
        if let ConfirmPhase::Accumulating { label, count } = self.phase {
            let count = count.saturating_sub(1);
            self.phase = if count == 0 {
                ConfirmPhase::Idle
            } else {
                ConfirmPhase::Accumulating { label, count }
            };
        }
    }

    fn is_duplicate(&self, label: GestureLabel, now: Timestamp) -> bool {
        match (self.config.dedup_window_ms, self.last_emitted) {
            (Some(window), Some(last)) => {
                last.label == label && now.millis_since(last.timestamp) < window
            }
            _ => false,
        }
    }
}
