use std::time::Duration;

use gesture_tree_core::{
    DetectorHandle, FrameTimer, GestureTreeError, Renderer, Result, SceneDescriptor, Session,
};
use minifb::{Key, Window, WindowOptions};

pub const WIN_W: usize = 960;
pub const WIN_H: usize = 600;
const TITLE: &str = "Gesture Tree";
const FRAME_LIMIT: Duration = Duration::from_millis(16);

/// Runs the display until the window is closed or Escape is pressed.
///
/// Detector results are drained before every frame. Without a detector the
/// tree keeps animating but never leaves its initial state.
pub fn run(mut session: Session, detector: Option<DetectorHandle>) -> Result<()> {
    let mut window = Window::new(
        TITLE,
        WIN_W,
        WIN_H,
        WindowOptions {
            resize: false,
            ..WindowOptions::default()
        },
    )
    .map_err(|err| GestureTreeError::msg(format!("failed to open window: {err}")))?;
    window.limit_update_rate(Some(FRAME_LIMIT));

    let mut renderer = Renderer::new(WIN_W, WIN_H, SceneDescriptor::default());
    let mut timer = FrameTimer::start();
    let mut detector_live = detector.is_some();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        if let Some(handle) = &detector {
            for result in handle.drain() {
                session.on_gesture_frame(result.primary_hand());
            }
            if detector_live && !handle.is_running() {
                tracing::warn!("detector stopped, display is no longer interactive");
                detector_live = false;
            }
        }

        session.on_render_frame(timer.tick());
        let pixels = renderer.draw(&session.render_state());
        window
            .update_with_buffer(pixels, WIN_W, WIN_H)
            .map_err(|err| GestureTreeError::msg(format!("failed to present frame: {err}")))?;
    }

    let summary = session.summary();
    tracing::info!(
        frames = summary.frames,
        hand_frames = summary.hand_frames,
        elapsed = summary.elapsed_seconds,
        "window closed"
    );

    if let Some(handle) = detector {
        handle.close();
    }
    Ok(())
}
