// gesture_engine: hand-landmark gesture control for the ambient mirror.
// Classifier -> confirmation/cooldown -> focus orchestration. JS owns the camera, the
// detector and the DOM; everything that decides what a gesture means lives here.

mod classifier;
mod confirm;
mod error;
mod focus;
mod notify;
mod pipeline;
mod snapshot;
mod types;

use wasm_bindgen::prelude::*;

pub use classifier::{FingerStates, LandmarkClassifier};
pub use confirm::{ConfirmPhase, ConfirmationConfig, ConfirmationEngine};
pub use error::EngineError;
pub use focus::{
    FocusInstruction, FocusOrchestrator, Instruction, Orchestrator, VisibilityInstruction,
    VisibilityOrchestrator,
};
pub use notify::{Notification, Notifier};
pub use pipeline::{FrameOutcome, GesturePipeline, PipelineStatus};
pub use snapshot::{SnapshotPublisher, SnapshotReader};
pub use types::*;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_js(err: EngineError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Gesture pipeline exposed to JavaScript.
/// One call per camera frame; results come back as JSON.
///
/// # Example JSON Config
/// ```json
/// {
///   "frames_confirm": 3,
///   "cooldown_ms": 1000,
///   "gesture_profile": "four_gesture",
///   "panel_order": ["av", "notes", "calendar", "weather"]
/// }
/// ```
#[wasm_bindgen]
pub struct WasmGesturePipeline {
    inner: GesturePipeline,
}

#[wasm_bindgen]
impl WasmGesturePipeline {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmGesturePipeline, JsValue> {
        let inner = GesturePipeline::from_json(config_json).map_err(to_js)?;
        Ok(WasmGesturePipeline { inner })
    }

    /// Process one frame.
    ///
    /// # Arguments
    /// * `frame_json` - `{"hand": {"landmarks": [...], "handedness": "left"} }` or `{"hand": null}`
    /// * `now_ms` - Frame timestamp in milliseconds
    ///
    /// # Returns
    /// JSON `FrameOutcome`
    pub fn process_frame(&mut self, frame_json: &str, now_ms: f64) -> Result<String, JsValue> {
        self.process_frame_at(frame_json, Timestamp::from_millis_f64(now_ms))
            .map_err(to_js)
    }

    /// Same as `process_frame`, stamped with `Date.now()`.
    pub fn process_frame_now(&mut self, frame_json: &str) -> Result<String, JsValue> {
        self.process_frame(frame_json, js_sys::Date::now())
    }

    /// Latest instruction as JSON. Safe to poll from the render loop.
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.snapshot())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Feedback text to show at `now_ms`, if one is still live.
    pub fn notification_text(&self, now_ms: f64) -> Option<String> {
        self.inner
            .notification_at(Timestamp::from_millis_f64(now_ms))
            .map(|n| n.text.clone())
    }

    pub fn enable(&mut self) {
        self.inner.enable();
    }

    pub fn disable(&mut self) {
        self.inner.disable();
    }

    /// Call when the camera or hand model fails to start.
    pub fn mark_unavailable(&mut self, reason: &str) {
        self.inner.mark_unavailable(reason);
    }

    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }
}

impl WasmGesturePipeline {
    fn process_frame_at(&mut self, frame_json: &str, now: Timestamp) -> Result<String, EngineError> {
        let frame: FrameInput = serde_json::from_str(frame_json)
            .map_err(|e| EngineError::InvalidFrame(e.to_string()))?;
        let outcome = self.inner.process_frame(frame.hand.as_ref(), now);
        Ok(serde_json::to_string(&outcome)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn landmarks_json(points: &[Landmark]) -> String {
        serde_json::to_string(points).unwrap()
    }

    #[test]
    fn pipeline_creation_works() {
        let config = r#"{"frames_confirm":3,"cooldown_ms":1000,"gesture_profile":"four_gesture"}"#;
        let pipeline = WasmGesturePipeline::new(config);
        assert!(pipeline.is_ok());
    }

    #[test]
    fn frames_round_trip_through_json() {
        let mut pipeline = WasmGesturePipeline {
            inner: GesturePipeline::new(PipelineConfig::default()).unwrap(),
        };
        let fist = classifier::test_hands::fist();
        let frame = format!(
            r#"{{"hand":{{"landmarks":{},"handedness":"right"}}}}"#,
            landmarks_json(&fist.landmarks)
        );

        let mut last = String::new();
        for t in [0u64, 33, 66] {
            last = pipeline
                .process_frame_at(&frame, Timestamp::from_millis(t))
                .unwrap();
        }
        let outcome: FrameOutcome = serde_json::from_str(&last).unwrap();
        assert_eq!(outcome.label, GestureLabel::Fist);
        assert_eq!(outcome.event.map(|e| e.label), Some(GestureLabel::Fist));

        let none = pipeline
            .process_frame_at(r#"{"hand":null}"#, Timestamp::from_millis(100))
            .unwrap();
        let outcome: FrameOutcome = serde_json::from_str(&none).unwrap();
        assert_eq!(outcome.label, GestureLabel::None);
        assert!(outcome.event.is_none());

        let snapshot: Instruction = serde_json::from_str(&pipeline.snapshot_json().unwrap()).unwrap();
        assert_eq!(
            snapshot,
            Instruction::Focus(FocusInstruction::focused(PanelId::Calendar))
        );
        assert_eq!(
            pipeline.notification_text(1000.0).as_deref(),
            Some("FIST → calendar focus")
        );
    }

    #[test]
    fn detector_handedness_labels_are_accepted() {
        // Thumbs-up drawn for a right hand: the label decides the thumb direction.
        let thumbs = classifier::test_hands::thumbs_up();
        for (label, expected) in [
            ("Right", GestureLabel::ThumbsUp),
            ("Left", GestureLabel::Fist),
            ("Unknown", GestureLabel::ThumbsUp),
        ] {
            let mut pipeline = WasmGesturePipeline {
                inner: GesturePipeline::new(PipelineConfig::default()).unwrap(),
            };
            let frame = format!(
                r#"{{"hand":{{"landmarks":{},"handedness":"{}"}}}}"#,
                landmarks_json(&thumbs.landmarks),
                label
            );
            let json = pipeline
                .process_frame_at(&frame, Timestamp::from_millis(0))
                .unwrap();
            let outcome: FrameOutcome = serde_json::from_str(&json).unwrap();
            assert_eq!(outcome.label, expected, "handedness {:?}", label);
        }
    }

    #[test]
    fn unparseable_frame_is_an_error() {
        let mut pipeline = WasmGesturePipeline {
            inner: GesturePipeline::new(PipelineConfig::default()).unwrap(),
        };
        let result = pipeline.process_frame_at("{not json", Timestamp::from_millis(0));
        assert!(matches!(result, Err(EngineError::InvalidFrame(_))));
    }
}
