//! Core library for the gesture-controlled particle tree.
//!
//! A hand-landmark detector feeds [`gesture`] frames into a [`Session`], which
//! owns the particle layout, the tree/chaos blend and the camera. Each module
//! owns one subsystem (gesture interpretation, layout generation, animation,
//! rendering, the detector bridge) so the windowed app and the headless runner
//! share everything except the surface they draw to.

pub mod animation;
pub mod camera;
pub mod config;
pub mod detector;
pub mod error;
pub mod gesture;
pub mod layout;
pub mod ornament;
pub mod render;
pub mod scene;
pub mod session;
pub mod smoothing;
pub mod timeline;

pub use animation::{AnimationDriver, ParticleTransform};
pub use camera::CameraRig;
pub use config::{
    AnimationConfig, AppConfig, CameraConfig, DetectorConfig, GestureConfig, LayoutConfig,
};
pub use detector::{
    read_all, spawn_detector, DetectionResult, DetectorCommand, DetectorHandle, LandmarkDetector,
    ReplayDetector, SubprocessDetector,
};
pub use error::{GestureTreeError, Result};
pub use gesture::{GestureAdapter, GestureMode, GestureSnapshot, Landmark, LandmarkFrame};
pub use layout::{ParticleColor, ParticleLayout};
pub use ornament::{Ornament, StarGeometry};
pub use render::Renderer;
pub use scene::SceneDescriptor;
pub use session::{run_headless, RenderState, Session, SessionSummary};
pub use timeline::{FrameTimer, PlaybackClock};
