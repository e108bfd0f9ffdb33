// Per-frame chain: classifier -> confirmation -> orchestrator -> notifier -> snapshot.
// One owned instance per gesture consumer; no globals, no event bus.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::classifier::LandmarkClassifier;
use crate::confirm::{ConfirmationConfig, ConfirmationEngine};
use crate::error::EngineError;
use crate::focus::{Instruction, Orchestrator};
use crate::notify::{Notification, Notifier};
use crate::snapshot::{SnapshotPublisher, SnapshotReader};
use crate::types::*;

/// Whether frames are being consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineStatus {
    Active,
    /// Turned off by the host (camera stopped).
    Disabled,
    /// Detector or camera could not start. Gestures stay off until re-enabled.
    Unavailable { reason: String },
}

/// Result of one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameOutcome {
    pub label: GestureLabel,
    pub event: Option<ConfirmedGesture>,
    pub instruction: Option<Instruction>,
    pub notification: Option<Notification>,
}

impl FrameOutcome {
    fn idle(label: GestureLabel) -> Self {
        FrameOutcome {
            label,
            event: None,
            instruction: None,
            notification: None,
        }
    }
}

/// A complete gesture pipeline for one consumer.
#[derive(Debug)]
pub struct GesturePipeline {
    classifier: LandmarkClassifier,
    confirmation: ConfirmationEngine,
    orchestrator: Orchestrator,
    notifier: Notifier,
    publisher: SnapshotPublisher,
    status: PipelineStatus,
}

impl GesturePipeline {
    /// Validates the config before anything is built.
    pub fn new(config: PipelineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let confirmation = ConfirmationEngine::new(ConfirmationConfig::from_pipeline(&config))?;
        let orchestrator = Orchestrator::from_config(&config)?;
        let publisher = SnapshotPublisher::new(orchestrator.instruction());

        info!(
            profile = ?config.gesture_profile,
            frames_confirm = config.frames_confirm,
            cooldown_ms = config.cooldown_ms,
            "Gesture pipeline created"
        );

        Ok(GesturePipeline {
            classifier: LandmarkClassifier::from_config(&config),
            notifier: Notifier::new(config.notification_ms),
            confirmation,
            orchestrator,
            publisher,
            status: PipelineStatus::Active,
        })
    }

    pub fn from_json(config_json: &str) -> Result<Self, EngineError> {
        Self::new(PipelineConfig::from_json(config_json)?)
    }

    pub fn status(&self) -> &PipelineStatus {
        &self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == PipelineStatus::Active
    }

    /// Process one camera frame. `sample` is `None` when no hand was detected.
    pub fn process_frame(&mut self, sample: Option<&HandSample>, now: Timestamp) -> FrameOutcome {
        if !self.is_active() {
            return FrameOutcome::idle(GestureLabel::None);
        }

        let label = self.classifier.classify(sample);
        let Some(event) = self.confirmation.observe(label, now) else {
            return FrameOutcome::idle(label);
        };

        let Some(instruction) = self.orchestrator.apply(&event) else {
            return FrameOutcome {
                event: Some(event),
                ..FrameOutcome::idle(label)
            };
        };

        self.publisher.publish(instruction.clone());
        let notification = self.notifier.notify(&event, &instruction);

        FrameOutcome {
            label,
            event: Some(event),
            instruction: Some(instruction),
            notification: Some(notification),
        }
    }

    /// Most recently published instruction.
    pub fn snapshot(&self) -> Instruction {
        (*self.publisher.latest()).clone()
    }

    /// Read handle for a render loop on another thread.
    pub fn reader(&self) -> SnapshotReader {
        self.publisher.reader()
    }

    /// Feedback text still on screen at `now`.
    pub fn notification_at(&self, now: Timestamp) -> Option<&Notification> {
        self.notifier.active(now)
    }

    /// Resume after `disable` / `mark_unavailable`. Accumulation starts clean.
    pub fn enable(&mut self) {
        if self.is_active() {
            return;
        }
        self.confirmation.reset();
        self.status = PipelineStatus::Active;
        info!("Gesture pipeline enabled");
    }

    /// Camera teardown. Partial accumulation is dropped; the last applied focus stays.
    pub fn disable(&mut self) {
        self.confirmation.reset();
        self.status = PipelineStatus::Disabled;
        info!("Gesture pipeline disabled");
    }

    /// Degraded mode when the detector can't run. Same as `disable`, with a reason.
    pub fn mark_unavailable(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(reason = %reason, "Gesture detector unavailable; gestures disabled");
        self.confirmation.reset();
        self.status = PipelineStatus::Unavailable { reason };
    }

    /// Everything back to initial state, focus included. Status is unchanged.
    pub fn reset(&mut self) {
        self.confirmation.reset();
        self.orchestrator.reset();
        self.notifier.clear();
        self.publisher.publish(self.orchestrator.instruction());
    }
}
