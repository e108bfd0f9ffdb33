// Strong typing over strings. Newtypes for timestamps, closed enums for labels and panels.
// Everything that crosses the JS boundary derives serde.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::EngineError;

/// Timestamp in microseconds. Newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_micros(us: u64) -> Self {
        Timestamp(us)
    }

    pub fn from_millis(ms: u64) -> Self {
        Timestamp(ms.saturating_mul(1000))
    }

    /// Fractional milliseconds as delivered by `performance.now()` / `Date.now()`.
    /// Negative and non-finite inputs collapse to zero.
    pub fn from_millis_f64(ms: f64) -> Self {
        if ms.is_finite() && ms > 0.0 {
            Timestamp((ms * 1000.0).round() as u64)
        } else {
            Timestamp(0)
        }
    }

    pub fn as_micros(&self) -> u64 {
        self.0
    }

    pub fn as_millis(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// This timestamp shifted forward by `ms` milliseconds, saturating.
    pub fn plus_millis(&self, ms: u64) -> Self {
        Timestamp(self.0.saturating_add(ms.saturating_mul(1000)))
    }

    /// Milliseconds elapsed since `earlier`, zero if `earlier` is in the future.
    pub fn millis_since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0) / 1000
    }
}

// Landmark indices (MediaPipe hand convention).
pub const WRIST: usize = 0;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// Number of landmarks in a well-formed hand sample.
pub const LANDMARK_COUNT: usize = 21;

/// Normalized image coordinate. Not clamped: detectors report points slightly
/// outside the frame when the hand is cut off at the edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Landmark { x, y }
    }

    pub fn distance(&self, other: &Landmark) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Which hand the detector believes it saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Detector label, any case ("Left", "right", "LEFT"). Anything else is unknown.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.to_ascii_lowercase();
        if label.contains("left") {
            Some(Handedness::Left)
        } else if label.contains("right") {
            Some(Handedness::Right)
        } else {
            None
        }
    }
}

impl<'de> Deserialize<'de> for Handedness {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Handedness::from_label(&label).ok_or_else(|| {
            serde::de::Error::unknown_variant(&label, &["left", "right"])
        })
    }
}

// Unrecognized labels become unknown handedness rather than a parse failure.
fn deserialize_handedness<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Handedness>, D::Error> {
    let label = Option::<String>::deserialize(deserializer)?;
    Ok(label.as_deref().and_then(Handedness::from_label))
}

/// One detected hand in one frame. Transient: produced per frame, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HandSample {
    pub landmarks: Vec<Landmark>,
    #[serde(default, deserialize_with = "deserialize_handedness")]
    pub handedness: Option<Handedness>,
}

impl HandSample {
    pub fn new(landmarks: Vec<Landmark>, handedness: Option<Handedness>) -> Self {
        HandSample {
            landmarks,
            handedness,
        }
    }

    /// Exactly 21 landmarks, all finite.
    pub fn is_well_formed(&self) -> bool {
        self.landmarks.len() == LANDMARK_COUNT && self.landmarks.iter().all(Landmark::is_finite)
    }
}

/// Per-frame frame payload from JS. `hand: null` means no hand this frame.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FrameInput {
    #[serde(default)]
    pub hand: Option<HandSample>,
}

/// Discrete per-frame classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GestureLabel {
    Open,
    Fist,
    ThumbsUp,
    TwoFingers,
    #[default]
    None,
}

impl GestureLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Fist => "fist",
            Self::ThumbsUp => "thumbs_up",
            Self::TwoFingers => "two_fingers",
            Self::None => "none",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// A label that survived temporal confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedGesture {
    pub label: GestureLabel,
    pub timestamp: Timestamp,
}

/// Named UI regions that can be focused or dimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelId {
    Calendar,
    Weather,
    Av,
    Notes,
}

impl PanelId {
    pub const ALL: [PanelId; 4] = [
        PanelId::Calendar,
        PanelId::Weather,
        PanelId::Av,
        PanelId::Notes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calendar => "calendar",
            Self::Weather => "weather",
            Self::Av => "av",
            Self::Notes => "notes",
        }
    }
}

/// Which gesture vocabulary and which orchestrator a pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GestureProfile {
    /// open / fist / thumbs_up / two_fingers driving panel focus.
    #[default]
    FourGesture,
    /// open / fist driving UI visibility (mirror mode).
    TwoGesture,
}

/// Pipeline configuration passed from JS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Consecutive matching frames needed to confirm a gesture.
    #[serde(default = "default_frames_confirm", alias = "framesConfirm")]
    pub frames_confirm: u32,
    /// Minimum spacing between confirmed gestures (milliseconds).
    #[serde(default = "default_cooldown_ms", alias = "cooldownMs")]
    pub cooldown_ms: u64,
    #[serde(default, alias = "gestureProfile")]
    pub gesture_profile: GestureProfile,
    /// Cycle order for `two_fingers`.
    #[serde(default = "default_panel_order", alias = "panelOrder")]
    pub panel_order: Vec<PanelId>,
    /// Same-label suppression window. `None` picks the profile default.
    #[serde(default, alias = "dedupWindowMs")]
    pub dedup_window_ms: Option<u64>,
    /// Finger extension margin as a fraction of the wrist→middle-MCP distance.
    /// Raise to 0.07–0.08 if the classifier is too eager.
    #[serde(default = "default_extension_margin", alias = "extensionMargin")]
    pub extension_margin: f32,
    /// Lifetime of the transient feedback text (milliseconds).
    #[serde(default = "default_notification_ms", alias = "notificationMs")]
    pub notification_ms: u64,
}

fn default_frames_confirm() -> u32 {
    3
}

fn default_cooldown_ms() -> u64 {
    1000
}

fn default_panel_order() -> Vec<PanelId> {
    vec![PanelId::Av, PanelId::Notes, PanelId::Calendar, PanelId::Weather]
}

fn default_extension_margin() -> f32 {
    0.06
}

fn default_notification_ms() -> u64 {
    DEFAULT_NOTIFICATION_MS
}

/// Display window for the transient feedback text.
pub const DEFAULT_NOTIFICATION_MS: u64 = 1800;

/// Same-label suppression used by the four-gesture consumer.
pub const DEFAULT_DEDUP_WINDOW_MS: u64 = 800;

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            frames_confirm: default_frames_confirm(),
            cooldown_ms: default_cooldown_ms(),
            gesture_profile: GestureProfile::default(),
            panel_order: default_panel_order(),
            dedup_window_ms: None,
            extension_margin: default_extension_margin(),
            notification_ms: default_notification_ms(),
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: PipelineConfig = serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.frames_confirm < 1 {
            return Err(EngineError::InvalidConfig(
                "frames_confirm must be at least 1".to_string(),
            ));
        }
        if self.panel_order.is_empty() {
            return Err(EngineError::InvalidConfig(
                "panel_order must name at least one panel".to_string(),
            ));
        }
        for (i, panel) in self.panel_order.iter().enumerate() {
            if self.panel_order[..i].contains(panel) {
                return Err(EngineError::InvalidConfig(format!(
                    "panel_order lists {} more than once",
                    panel.as_str()
                )));
            }
        }
        if !self.extension_margin.is_finite() || self.extension_margin <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "extension_margin must be a positive number, got {}",
                self.extension_margin
            )));
        }
        Ok(())
    }

    /// Dedup window after applying the profile default.
    pub fn effective_dedup_window_ms(&self) -> Option<u64> {
        match (self.dedup_window_ms, self.gesture_profile) {
            (Some(ms), _) => Some(ms),
            (None, GestureProfile::FourGesture) => Some(DEFAULT_DEDUP_WINDOW_MS),
            (None, GestureProfile::TwoGesture) => None,
        }
    }
}
