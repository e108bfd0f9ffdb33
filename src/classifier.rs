// Landmark classifier: 21 normalized hand points -> one gesture label per frame.
// Pure and stateless. Malformed samples fail closed to `none`.

use tracing::debug;

use crate::types::*;

/// (tip, pip) pairs for the four long fingers: index, middle, ring, pinky.
const LONG_FINGERS: [(usize, usize); 4] = [
    (INDEX_TIP, INDEX_PIP),
    (MIDDLE_TIP, MIDDLE_PIP),
    (RING_TIP, RING_PIP),
    (PINKY_TIP, PINKY_PIP),
];

/// Floor for the wrist→middle-MCP scale so tiny or occluded hands don't blow up the ratio.
const MIN_SCALE: f32 = 1e-4;

/// Which digits read as extended in a single sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FingerStates {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerStates {
    /// Extended count among index, middle, ring, pinky.
    pub fn long_fingers_extended(&self) -> usize {
        [self.index, self.middle, self.ring, self.pinky]
            .iter()
            .filter(|e| **e)
            .count()
    }

    /// Extended count including the thumb.
    pub fn total_extended(&self) -> usize {
        self.long_fingers_extended() + usize::from(self.thumb)
    }
}

/// Classifies hand samples according to a gesture profile.
#[derive(Debug, Clone)]
pub struct LandmarkClassifier {
    profile: GestureProfile,
    extension_margin: f32,
}

impl LandmarkClassifier {
    pub fn new(profile: GestureProfile, extension_margin: f32) -> Self {
        LandmarkClassifier {
            profile,
            extension_margin,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.gesture_profile, config.extension_margin)
    }

    /// Classify one frame. `None` (no hand this frame) is always `GestureLabel::None`.
    pub fn classify(&self, sample: Option<&HandSample>) -> GestureLabel {
        let Some(sample) = sample else {
            return GestureLabel::None;
        };
        if !sample.is_well_formed() {
            debug!(
                landmarks = sample.landmarks.len(),
                "Malformed hand sample, classifying as none"
            );
            return GestureLabel::None;
        }

        let fingers = self.finger_states(sample);
        match self.profile {
            GestureProfile::FourGesture => classify_four(&fingers),
            GestureProfile::TwoGesture => classify_two(&fingers),
        }
    }

    /// Extension state of every digit. Expects a well-formed sample.
    pub fn finger_states(&self, sample: &HandSample) -> FingerStates {
        let lm = &sample.landmarks;
        let wrist = lm[WRIST];
        let scale = wrist.distance(&lm[MIDDLE_MCP]).max(MIN_SCALE);
        let extended =
            |tip: usize, pip: usize| self.is_extended(&lm[tip], &lm[pip], &wrist, scale);

        let thumb = match self.profile {
            GestureProfile::FourGesture => {
                thumb_extended_lateral(&lm[THUMB_TIP], &lm[THUMB_IP], sample.handedness)
            }
            GestureProfile::TwoGesture => extended(THUMB_TIP, THUMB_MCP),
        };
        let [index, middle, ring, pinky] = LONG_FINGERS.map(|(tip, pip)| extended(tip, pip));

        FingerStates {
            thumb,
            index,
            middle,
            ring,
            pinky,
        }
    }

    fn is_extended(&self, tip: &Landmark, pip: &Landmark, wrist: &Landmark, scale: f32) -> bool {
        tip.distance(wrist) - pip.distance(wrist) > self.extension_margin * scale
    }
}

/// Unknown handedness uses the right-hand convention.
fn thumb_extended_lateral(tip: &Landmark, ip: &Landmark, handedness: Option<Handedness>) -> bool {
    match handedness {
        Some(Handedness::Left) => tip.x < ip.x,
        Some(Handedness::Right) | None => tip.x > ip.x,
    }
}

// First match wins.
fn classify_four(f: &FingerStates) -> GestureLabel {
    let n = f.long_fingers_extended();
    if n == 4 && f.thumb {
        GestureLabel::Open
    } else if n == 0 && !f.thumb {
        GestureLabel::Fist
    } else if n == 0 && f.thumb {
        GestureLabel::ThumbsUp
    } else if n == 2 && f.index && f.middle {
        GestureLabel::TwoFingers
    } else {
        GestureLabel::None
    }
}

fn classify_two(f: &FingerStates) -> GestureLabel {
    match f.total_extended() {
        n if n >= 4 => GestureLabel::Open,
        n if n <= 1 => GestureLabel::Fist,
        _ => GestureLabel::None,
    }
}


#[cfg(test)]
mod tests {
    use super::test_hands::*;
    use super::*;
    use proptest::prelude::*;

    fn four() -> LandmarkClassifier {
        LandmarkClassifier::new(GestureProfile::FourGesture, 0.06)
    }

    fn two() -> LandmarkClassifier {
        LandmarkClassifier::new(GestureProfile::TwoGesture, 0.06)
    }

    #[test]
    fn no_hand_is_none() {
        assert_eq!(four().classify(None), GestureLabel::None);
        assert_eq!(two().classify(None), GestureLabel::None);
    }

    #[test]
    fn four_gesture_vocabulary() {
        let c = four();
        assert_eq!(c.classify(Some(&open_hand())), GestureLabel::Open);
        assert_eq!(c.classify(Some(&fist())), GestureLabel::Fist);
        assert_eq!(c.classify(Some(&thumbs_up())), GestureLabel::ThumbsUp);
        assert_eq!(c.classify(Some(&two_fingers())), GestureLabel::TwoFingers);
    }

    #[test]
    fn unmatched_pose_is_none() {
        let c = four();
        // Index + ring: two fingers but not the index/middle pair.
        let sample = hand([true, false, true, false], false, Some(Handedness::Right));
        assert_eq!(c.classify(Some(&sample)), GestureLabel::None);
        // Three fingers.
        let sample = hand([true, true, true, false], false, Some(Handedness::Right));
        assert_eq!(c.classify(Some(&sample)), GestureLabel::None);
        // Four fingers without thumb.
        let sample = hand([true; 4], false, Some(Handedness::Right));
        assert_eq!(c.classify(Some(&sample)), GestureLabel::None);
    }

    #[test]
    fn thumb_direction_follows_handedness() {
        let c = four();
        let left = hand([false; 4], true, Some(Handedness::Left));
        assert_eq!(c.classify(Some(&left)), GestureLabel::ThumbsUp);

        // The same landmarks read with the opposite label flip the thumb.
        let mut as_right = left.clone();
        as_right.handedness = Some(Handedness::Right);
        assert_eq!(c.classify(Some(&as_right)), GestureLabel::Fist);
    }

    #[test]
    fn unknown_handedness_uses_right_hand_rule() {
        let c = four();
        let unknown = hand([false; 4], true, None);
        assert_eq!(c.classify(Some(&unknown)), GestureLabel::ThumbsUp);
        let states = c.finger_states(&unknown);
        assert!(states.thumb);
    }

    #[test]
    fn open_wins_over_lower_rules() {
        // Index and middle are extended, but the open rule is checked first.
        let c = four();
        let states = c.finger_states(&open_hand());
        assert!(states.index && states.middle);
        assert_eq!(c.classify(Some(&open_hand())), GestureLabel::Open);
    }

    #[test]
    fn two_gesture_profile_counts_thumb() {
        let c = two();
        assert_eq!(c.classify(Some(&open_hand())), GestureLabel::Open);
        assert_eq!(c.classify(Some(&fist())), GestureLabel::Fist);
        // Thumb alone is still at most one finger.
        assert_eq!(c.classify(Some(&thumbs_up())), GestureLabel::Fist);
        // Two long fingers is ambiguous.
        assert_eq!(c.classify(Some(&two_fingers())), GestureLabel::None);
        // Four long fingers without thumb is open.
        let sample = hand([true; 4], false, Some(Handedness::Right));
        assert_eq!(c.classify(Some(&sample)), GestureLabel::Open);
        // Never emits four-gesture-only labels.
        let sample = hand([true, true, false, false], true, Some(Handedness::Right));
        assert_eq!(c.classify(Some(&sample)), GestureLabel::None);
    }

    #[test]
    fn truncated_sample_fails_closed() {
        let mut sample = open_hand();
        sample.landmarks.truncate(20);
        assert_eq!(four().classify(Some(&sample)), GestureLabel::None);
        assert_eq!(two().classify(Some(&sample)), GestureLabel::None);
    }

    #[test]
    fn non_finite_sample_fails_closed() {
        let mut sample = open_hand();
        sample.landmarks[INDEX_TIP].y = f32::NAN;
        assert_eq!(four().classify(Some(&sample)), GestureLabel::None);
        sample.landmarks[INDEX_TIP].y = f32::INFINITY;
        assert_eq!(four().classify(Some(&sample)), GestureLabel::None);
    }

    #[test]
    fn degenerate_scale_does_not_panic() {
        // Every point on the wrist: scale floors at MIN_SCALE, nothing is extended.
        let sample = HandSample::new(vec![Landmark::new(0.5, 0.5); LANDMARK_COUNT], None);
        assert_eq!(four().classify(Some(&sample)), GestureLabel::Fist);
    }

    #[test]
    fn larger_margin_is_stricter() {
        // Extended fingers here clear the wrist by ~0.1 against a scale of 0.2.
        let strict = LandmarkClassifier::new(GestureProfile::FourGesture, 0.6);
        let states = strict.finger_states(&open_hand());
        assert_eq!(states.long_fingers_extended(), 0);
    }

    fn landmark_strategy() -> impl Strategy<Value = Landmark> {
        (0.0f32..=1.0f32, 0.0f32..=1.0f32).prop_map(|(x, y)| Landmark::new(x, y))
    }

    fn sample_strategy() -> impl Strategy<Value = HandSample> {
        (
            prop::collection::vec(landmark_strategy(), LANDMARK_COUNT),
            prop_oneof![
                Just(None),
                Just(Some(Handedness::Left)),
                Just(Some(Handedness::Right))
            ],
        )
            .prop_map(|(landmarks, handedness)| HandSample::new(landmarks, handedness))
    }

    proptest! {
        /// Same landmarks, same label.
        #[test]
        fn classification_is_deterministic(sample in sample_strategy()) {
            for c in [four(), two()] {
                let first = c.classify(Some(&sample));
                let second = c.classify(Some(&sample));
                prop_assert_eq!(first, second);
            }
        }

        /// Any landmark count other than 21 is `none`.
        #[test]
        fn wrong_length_is_none(
            landmarks in prop::collection::vec(landmark_strategy(), 0..40usize)
        ) {
            prop_assume!(landmarks.len() != LANDMARK_COUNT);
            let sample = HandSample::new(landmarks, None);
            prop_assert_eq!(four().classify(Some(&sample)), GestureLabel::None);
            prop_assert_eq!(two().classify(Some(&sample)), GestureLabel::None);
        }

        /// The two-gesture profile only ever produces open, fist or none.
        #[test]
        fn two_gesture_vocabulary_is_closed(sample in sample_strategy()) {
            let label = two().classify(Some(&sample));
            prop_assert!(matches!(
                label,
                GestureLabel::Open | GestureLabel::Fist | GestureLabel::None
            ));
        }
    }
}
