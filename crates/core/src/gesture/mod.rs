use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    config::GestureConfig,
    smoothing::{ExponentialSmoother, ExponentialSmoother2D},
    GestureTreeError, Result,
};

/// Number of landmarks reported for a single hand.
pub const LANDMARK_COUNT: usize = 21;

/// Hand landmark indices (MediaPipe hand landmark model convention).
pub mod landmarks {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_MCP: usize = 5;
    pub const INDEX_FINGER_PIP: usize = 6;
    pub const INDEX_FINGER_DIP: usize = 7;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const MIDDLE_FINGER_MCP: usize = 9;
    pub const MIDDLE_FINGER_PIP: usize = 10;
    pub const MIDDLE_FINGER_DIP: usize = 11;
    pub const MIDDLE_FINGER_TIP: usize = 12;
    pub const RING_FINGER_MCP: usize = 13;
    pub const RING_FINGER_PIP: usize = 14;
    pub const RING_FINGER_DIP: usize = 15;
    pub const RING_FINGER_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;

    /// Bone connections used to draw the hand preview.
    pub const SKELETON: [(usize, usize); 21] = [
        (WRIST, THUMB_CMC),
        (THUMB_CMC, THUMB_MCP),
        (THUMB_MCP, THUMB_IP),
        (THUMB_IP, THUMB_TIP),
        (WRIST, INDEX_FINGER_MCP),
        (INDEX_FINGER_MCP, INDEX_FINGER_PIP),
        (INDEX_FINGER_PIP, INDEX_FINGER_DIP),
        (INDEX_FINGER_DIP, INDEX_FINGER_TIP),
        (INDEX_FINGER_MCP, MIDDLE_FINGER_MCP),
        (MIDDLE_FINGER_MCP, MIDDLE_FINGER_PIP),
        (MIDDLE_FINGER_PIP, MIDDLE_FINGER_DIP),
        (MIDDLE_FINGER_DIP, MIDDLE_FINGER_TIP),
        (MIDDLE_FINGER_MCP, RING_FINGER_MCP),
        (RING_FINGER_MCP, RING_FINGER_PIP),
        (RING_FINGER_PIP, RING_FINGER_DIP),
        (RING_FINGER_DIP, RING_FINGER_TIP),
        (RING_FINGER_MCP, PINKY_MCP),
        (WRIST, PINKY_MCP),
        (PINKY_MCP, PINKY_PIP),
        (PINKY_PIP, PINKY_DIP),
        (PINKY_DIP, PINKY_TIP),
    ];
}

/// A single hand landmark. `x` and `y` are normalised to the camera image,
/// `z` is depth relative to the wrist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Position in the image plane, ignoring depth.
    pub fn planar(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// All landmarks reported for one detected hand in one camera image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl LandmarkFrame {
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { landmarks }
    }

    /// Builds a frame from a detector list, rejecting lists of the wrong length.
    pub fn from_slice(points: &[Landmark]) -> Result<Self> {
        let landmarks: [Landmark; LANDMARK_COUNT] = points.try_into().map_err(|_| {
            GestureTreeError::MalformedFrame(format!(
                "expected {LANDMARK_COUNT} landmarks, got {}",
                points.len()
            ))
        })?;
        Ok(Self { landmarks })
    }

    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.landmarks
    }

    pub fn landmark(&self, index: usize) -> Landmark {
        self.landmarks[index]
    }

    /// Planar distance between the index fingertip and the thumb tip.
    pub fn pinch_distance(&self) -> f32 {
        let index = self.landmarks[landmarks::INDEX_FINGER_TIP].planar();
        let thumb = self.landmarks[landmarks::THUMB_TIP].planar();
        index.distance(thumb)
    }

    /// Base of the middle finger mapped to a centred range with y pointing up.
    pub fn pointer_target(&self) -> Vec2 {
        remap_to_pointer(self.landmarks[landmarks::MIDDLE_FINGER_MCP])
    }
}

/// Maps a normalised image point to roughly `[-1, 1]` on both axes, flipping
/// y so that raising the hand moves the pointer up.
pub fn remap_to_pointer(point: Landmark) -> Vec2 {
    Vec2::new((point.x - 0.5) * 2.0, (point.y - 0.5) * -2.0)
}

/// Display mode selected by the pinch gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureMode {
    /// Particles gathered into the cone.
    #[default]
    Tree,
    /// Particles scattered through the sphere.
    Chaos,
}

impl GestureMode {
    pub fn is_chaos(self) -> bool {
        matches!(self, Self::Chaos)
    }

    /// Progress value the animation eases toward while this mode is active.
    pub fn target_progress(self) -> f32 {
        match self {
            Self::Tree => 0.0,
            Self::Chaos => 1.0,
        }
    }
}

impl From<bool> for GestureMode {
    fn from(chaos: bool) -> Self {
        if chaos {
            Self::Chaos
        } else {
            Self::Tree
        }
    }
}

/// Two-threshold latch. Rises above `rise`, falls below `fall`, and holds
/// its state for values in between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HysteresisLatch {
    rise: f32,
    fall: f32,
    engaged: bool,
}

impl HysteresisLatch {
    pub fn new(rise: f32, fall: f32) -> Self {
        debug_assert!(fall < rise, "hysteresis thresholds must leave a dead zone");
        Self {
            rise,
            fall,
            engaged: false,
        }
    }

    pub fn update(&mut self, value: f32) -> bool {
        if value > self.rise {
            self.engaged = true;
        } else if value < self.fall {
            self.engaged = false;
        }
        self.engaged
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }
}

/// The values the render loop reads from the adapter at the start of a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GestureSnapshot {
    pub mode: GestureMode,
    pub pointer: Vec2,
}

/// Turns raw landmark frames into a latched display mode and a smoothed pointer.
#[derive(Debug, Clone)]
pub struct GestureAdapter {
    distance: ExponentialSmoother,
    latch: HysteresisLatch,
    pointer: ExponentialSmoother2D,
    frames_with_hand: u64,
}

impl GestureAdapter {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            distance: ExponentialSmoother::new(
                config.initial_pinch_distance,
                config.distance_smoothing,
            ),
            latch: HysteresisLatch::new(config.chaos_threshold, config.tree_threshold),
            pointer: ExponentialSmoother2D::new(Vec2::ZERO, config.pointer_smoothing),
            frames_with_hand: 0,
        }
    }

    /// Applies one detector result. Frames without a hand leave every value
    /// where it was.
    pub fn on_frame(&mut self, frame: Option<&LandmarkFrame>) -> GestureSnapshot {
        let Some(frame) = frame else {
            return self.snapshot();
        };

        let previous = self.mode();
        let raw = frame.pinch_distance();
        let smoothed = self.distance.update(raw);
        self.latch.update(smoothed);
        self.pointer.update(frame.pointer_target());
        self.frames_with_hand += 1;

        let mode = self.mode();
        if mode != previous {
            tracing::info!(?mode, smoothed_distance = smoothed, "gesture mode changed");
        }
        tracing::trace!(raw_distance = raw, smoothed_distance = smoothed, "hand frame");

        self.snapshot()
    }

    pub fn snapshot(&self) -> GestureSnapshot {
        GestureSnapshot {
            mode: self.mode(),
            pointer: self.pointer(),
        }
    }

    pub fn mode(&self) -> GestureMode {
        GestureMode::from(self.latch.is_engaged())
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer.value()
    }

    pub fn smoothed_distance(&self) -> f32 {
        self.distance.value()
    }

    /// Number of frames that contained a hand since the adapter was created.
    pub fn frames_with_hand(&self) -> u64 {
        self.frames_with_hand
    }
}

impl Default for GestureAdapter {
    fn default() -> Self {
        Self::new(&GestureConfig::default())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::smoothing::lerp;

    /// Hand with the thumb and index tips `pinch` apart and the middle finger
    /// base at `anchor`.
    pub(crate) fn hand(pinch: f32, anchor: (f32, f32)) -> LandmarkFrame {
        let mut points = [Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
        points[landmarks::THUMB_TIP] = Landmark::new(0.4, 0.5, 0.0);
        points[landmarks::INDEX_FINGER_TIP] = Landmark::new(0.4 + pinch, 0.5, 0.0);
        points[landmarks::MIDDLE_FINGER_MCP] = Landmark::new(anchor.0, anchor.1, 0.0);
        LandmarkFrame::new(points)
    }

    #[test]
    fn pinch_distance_ignores_depth() {
        let mut points = [Landmark::default(); LANDMARK_COUNT];
        points[landmarks::THUMB_TIP] = Landmark::new(0.2, 0.2, 0.9);
        points[landmarks::INDEX_FINGER_TIP] = Landmark::new(0.5, 0.6, -0.4);
        let frame = LandmarkFrame::new(points);
        assert!((frame.pinch_distance() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn pointer_remap_is_centred_and_flipped() {
        assert_eq!(remap_to_pointer(Landmark::new(0.5, 0.5, 0.0)), Vec2::ZERO);
        assert_eq!(
            remap_to_pointer(Landmark::new(1.0, 0.0, 0.0)),
            Vec2::new(1.0, 1.0)
        );
        assert_eq!(
            remap_to_pointer(Landmark::new(0.0, 1.0, 0.0)),
            Vec2::new(-1.0, -1.0)
        );
    }

    #[test]
    fn rejects_frames_with_wrong_landmark_count() {
        let err = LandmarkFrame::from_slice(&[Landmark::default(); 20]).unwrap_err();
        assert!(matches!(err, GestureTreeError::MalformedFrame(_)));
        assert!(LandmarkFrame::from_slice(&[Landmark::default(); LANDMARK_COUNT]).is_ok());
    }

    #[test]
    fn latch_holds_inside_dead_zone() {
        let mut latch = HysteresisLatch::new(0.25, 0.10);
        assert!(latch.update(0.3));
        for value in [0.24, 0.11, 0.2, 0.1, 0.25] {
            assert!(latch.update(value), "flipped false at {value}");
        }
        assert!(!latch.update(0.05));
        for value in [0.11, 0.24, 0.25, 0.1] {
            assert!(!latch.update(value), "flipped true at {value}");
        }
    }

    #[test]
    fn follows_reference_pinch_trajectory() {
        let mut adapter = GestureAdapter::default();
        let expected = [0.14_f32, 0.131, 0.1479, 0.16311, 0.151799];
        for (pinch, want) in [0.05_f32, 0.05, 0.30, 0.30, 0.05].iter().zip(expected) {
            let snapshot = adapter.on_frame(Some(&hand(*pinch, (0.5, 0.5))));
            assert!(
                (adapter.smoothed_distance() - want).abs() < 1e-5,
                "expected {want}, got {}",
                adapter.smoothed_distance()
            );
            assert_eq!(snapshot.mode, GestureMode::Tree);
        }
    }

    #[test]
    fn flips_when_smoothed_distance_crosses_thresholds() {
        let mut adapter = GestureAdapter::default();
        let mut reference = 0.15_f32;
        let mut reference_chaos = false;
        let mut flips = Vec::new();

        let sequence = std::iter::repeat(0.30_f32)
            .take(40)
            .chain(std::iter::repeat(0.05).take(60));
        for (step, pinch) in sequence.enumerate() {
            let frame = hand(pinch, (0.5, 0.5));
            reference = lerp(reference, frame.pinch_distance(), 0.1);
            if reference > 0.25 {
                reference_chaos = true;
            } else if reference < 0.10 {
                reference_chaos = false;
            }

            let before = adapter.mode();
            let snapshot = adapter.on_frame(Some(&frame));
            assert_eq!(snapshot.mode.is_chaos(), reference_chaos, "step {step}");
            if snapshot.mode != before {
                flips.push((step, snapshot.mode));
            }
        }

        assert_eq!(flips.len(), 2);
        assert_eq!(flips[0].1, GestureMode::Chaos);
        assert_eq!(flips[1].1, GestureMode::Tree);
    }

    #[test]
    fn frames_without_hand_freeze_state() {
        let mut adapter = GestureAdapter::default();
        for _ in 0..50 {
            adapter.on_frame(Some(&hand(0.4, (0.9, 0.1))));
        }
        let before = adapter.snapshot();
        let distance = adapter.smoothed_distance();
        for _ in 0..500 {
            assert_eq!(adapter.on_frame(None), before);
        }
        assert_eq!(adapter.smoothed_distance(), distance);
        assert_eq!(before.mode, GestureMode::Chaos);
    }

    #[test]
    fn session_without_hands_keeps_initial_state() {
        let mut adapter = GestureAdapter::default();
        for _ in 0..1_000 {
            let snapshot = adapter.on_frame(None);
            assert_eq!(snapshot.mode, GestureMode::Tree);
            assert_eq!(snapshot.pointer, Vec2::ZERO);
        }
        assert_eq!(adapter.frames_with_hand(), 0);
    }

    #[test]
    fn pointer_eases_toward_middle_finger_base() {
        let mut adapter = GestureAdapter::default();
        let snapshot = adapter.on_frame(Some(&hand(0.15, (1.0, 0.0))));
        assert!((snapshot.pointer.x - 0.05).abs() < 1e-6);
        assert!((snapshot.pointer.y - 0.05).abs() < 1e-6);

        for _ in 0..1_000 {
            adapter.on_frame(Some(&hand(0.15, (1.0, 0.0))));
        }
        let pointer = adapter.pointer();
        assert!(pointer.x <= 1.0 && (pointer.x - 1.0).abs() < 1e-4);
        assert!(pointer.y <= 1.0 && (pointer.y - 1.0).abs() < 1e-4);
    }
}
