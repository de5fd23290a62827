use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    animation::{AnimationDriver, ParticleTransform},
    camera::CameraRig,
    config::AppConfig,
    detector::DetectionResult,
    gesture::{GestureAdapter, GestureMode, GestureSnapshot, LandmarkFrame},
    layout::{ParticleColor, ParticleLayout},
    ornament::Ornament,
    timeline::PlaybackClock,
};

/// Everything that changes during one display session, owned in one place.
///
/// Detector results enter through [`Session::on_gesture_frame`] and display
/// refreshes through [`Session::on_render_frame`]. Both are expected to be
/// called from the same thread.
#[derive(Debug)]
pub struct Session {
    gesture: GestureAdapter,
    layout: ParticleLayout,
    driver: AnimationDriver,
    clock: PlaybackClock,
    last_hand: Option<LandmarkFrame>,
}

impl Session {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_rng(config, &mut rand::thread_rng())
    }

    /// Builds a session whose particle layout is drawn from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(config: &AppConfig, rng: &mut R) -> Self {
        let layout = ParticleLayout::generate(&config.layout, rng);
        let driver = AnimationDriver::new(&config.animation, &config.camera, layout.len());
        Self {
            gesture: GestureAdapter::new(&config.gesture),
            layout,
            driver,
            clock: PlaybackClock::default(),
            last_hand: None,
        }
    }

    /// Applies one detector result; `None` means no hand was visible.
    pub fn on_gesture_frame(&mut self, hand: Option<&LandmarkFrame>) -> GestureSnapshot {
        self.last_hand = hand.cloned();
        self.gesture.on_frame(hand)
    }

    /// Advances the animation by one display refresh `delta_seconds` long.
    pub fn on_render_frame(&mut self, delta_seconds: f32) {
        self.clock.advance(delta_seconds);
        let snapshot = self.gesture.snapshot();
        self.driver
            .advance(snapshot, self.clock.time_seconds, &self.layout);
    }

    pub fn snapshot(&self) -> GestureSnapshot {
        self.gesture.snapshot()
    }

    pub fn gesture(&self) -> &GestureAdapter {
        &self.gesture
    }

    pub fn layout(&self) -> &ParticleLayout {
        &self.layout
    }

    pub fn driver(&self) -> &AnimationDriver {
        &self.driver
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.clock.time_seconds
    }

    /// Borrowed view of the state the renderer needs for one frame.
    pub fn render_state(&self) -> RenderState<'_> {
        RenderState {
            transforms: self.driver.transforms(),
            colors: self.layout.colors(),
            field_rotation: self.driver.field_rotation(),
            ornament: self.driver.ornament(),
            camera: self.driver.camera(),
            hand: self.last_hand.as_ref(),
        }
    }

    pub fn summary(&self) -> SessionSummary {
        let snapshot = self.snapshot();
        SessionSummary {
            frames: self.driver.frames(),
            hand_frames: self.gesture.frames_with_hand(),
            elapsed_seconds: self.clock.time_seconds,
            mode: snapshot.mode,
            pointer: snapshot.pointer,
            smoothed_pinch_distance: self.gesture.smoothed_distance(),
            progress: self.driver.progress(),
            camera_position: self.driver.camera().position(),
        }
    }
}

/// What a renderer reads from a [`Session`] for one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderState<'a> {
    pub transforms: &'a [ParticleTransform],
    pub colors: &'a [ParticleColor],
    pub field_rotation: f32,
    pub ornament: &'a Ornament,
    pub camera: &'a CameraRig,
    /// Most recent detector hand, kept for the preview overlay.
    pub hand: Option<&'a LandmarkFrame>,
}

/// Serializable end-of-run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub frames: u64,
    pub hand_frames: u64,
    pub elapsed_seconds: f32,
    pub mode: GestureMode,
    pub pointer: Vec2,
    pub smoothed_pinch_distance: f32,
    pub progress: f32,
    pub camera_position: Vec3,
}

/// Drives `session` for `frames` render frames at a fixed `fps`, feeding
/// detector results whose timestamps fall before each frame.
///
/// Results without a timestamp are applied before the first frame.
pub fn run_headless<I>(session: &mut Session, results: I, frames: u32, fps: f32) -> SessionSummary
where
    I: IntoIterator<Item = DetectionResult>,
{
    let delta = 1.0 / fps.max(1.0);
    let mut pending = results.into_iter().peekable();

    for _ in 0..frames {
        let now = session.elapsed_seconds() + delta;
        while let Some(result) =
            pending.next_if(|result| result.timestamp.map_or(true, |t| t <= now))
        {
            session.on_gesture_frame(result.primary_hand());
        }
        session.on_render_frame(delta);
    }

    let summary = session.summary();
    tracing::info!(
        frames = summary.frames,
        hand_frames = summary.hand_frames,
        mode = ?summary.mode,
        progress = summary.progress,
        "headless run finished"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::gesture::tests::hand;
    use rand::{rngs::StdRng, SeedableRng};

    fn session() -> Session {
        let config = AppConfig {
            layout: LayoutConfig {
                particle_count: 200,
                ..LayoutConfig::default()
            },
            ..AppConfig::default()
        };
        Session::with_rng(&config, &mut StdRng::seed_from_u64(21))
    }

    fn timed(t: f32, frame: Option<LandmarkFrame>) -> DetectionResult {
        DetectionResult {
            timestamp: Some(t),
            hands: frame.into_iter().collect(),
        }
    }

    #[test]
    fn default_session_uses_full_particle_count() {
        let session = Session::new(&AppConfig::default());
        assert_eq!(session.layout().len(), 2000);
        assert_eq!(session.render_state().transforms.len(), 2000);
    }

    #[test]
    fn no_hands_keeps_tree_and_neutral_pointer() {
        let mut session = session();
        for _ in 0..300 {
            session.on_gesture_frame(None);
            session.on_render_frame(1.0 / 60.0);
            assert_eq!(session.snapshot().mode, GestureMode::Tree);
            assert_eq!(session.snapshot().pointer, Vec2::ZERO);
        }
        assert_eq!(session.driver().progress(), 0.0);
        let state = session.render_state();
        for (transform, target) in state.transforms.iter().zip(session.layout().target_positions()) {
            assert_eq!(transform.position, *target);
        }
    }

    #[test]
    fn render_frames_read_latest_gesture_state() {
        let mut session = session();
        for _ in 0..40 {
            session.on_gesture_frame(Some(&hand(0.4, (0.5, 0.5))));
        }
        assert_eq!(session.snapshot().mode, GestureMode::Chaos);

        session.on_render_frame(1.0 / 60.0);
        assert!((session.driver().progress() - 0.04).abs() < 1e-6);
    }

    #[test]
    fn elapsed_time_is_sum_of_deltas() {
        let mut session = session();
        for _ in 0..120 {
            session.on_render_frame(0.5);
        }
        assert!((session.elapsed_seconds() - 60.0).abs() < 1e-3);
        assert_eq!(session.driver().frames(), 120);
    }

    #[test]
    fn preview_keeps_last_seen_hand() {
        let mut session = session();
        session.on_gesture_frame(Some(&hand(0.2, (0.3, 0.3))));
        assert!(session.render_state().hand.is_some());
        session.on_gesture_frame(None);
        assert!(session.render_state().hand.is_none());
    }

    #[test]
    fn headless_run_interleaves_by_timestamp() {
        let mut session = session();
        let results: Vec<_> = (0..120)
            .map(|i| timed(i as f32 / 30.0, Some(hand(0.45, (0.75, 0.25)))))
            .collect();

        let summary = run_headless(&mut session, results, 240, 60.0);
        assert_eq!(summary.frames, 240);
        assert_eq!(summary.hand_frames, 120);
        assert_eq!(summary.mode, GestureMode::Chaos);
        assert!(summary.progress > 0.9);
        assert!(summary.pointer.x > 0.0 && summary.pointer.y > 0.0);
    }

    #[test]
    fn headless_run_defers_future_results() {
        let mut session = session();
        let results = vec![timed(10.0, Some(hand(0.45, (0.5, 0.5))))];
        let summary = run_headless(&mut session, results, 60, 60.0);
        assert_eq!(summary.hand_frames, 0);
        assert_eq!(summary.mode, GestureMode::Tree);
    }
}
