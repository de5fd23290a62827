use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, Sender, TryIter},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crate::{gesture::LandmarkFrame, Result};

mod replay;
mod subprocess;
mod wire;

pub use replay::{read_all, ReplayDetector};
pub use subprocess::{DetectorCommand, SubprocessDetector};
pub use wire::{encode_line, parse_line};

/// How long [`DetectorHandle::close`] waits for the detector thread to stop.
const CLOSE_GRACE: Duration = Duration::from_millis(500);

/// Hands found in one processed camera image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionResult {
    /// Seconds since the detector started, when the source provides it.
    pub timestamp: Option<f32>,
    pub hands: Vec<LandmarkFrame>,
}

impl DetectionResult {
    /// The hand that drives the display. Only the first hand is ever used.
    pub fn primary_hand(&self) -> Option<&LandmarkFrame> {
        self.hands.first()
    }
}

/// Source of hand-landmark results, one per processed camera image.
pub trait LandmarkDetector: Send + 'static {
    /// Blocks until the next image has been processed. `Ok(None)` means the
    /// source has ended.
    fn next_result(&mut self) -> Result<Option<DetectionResult>>;

    /// Releases the underlying resource.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Builds a detector with `open` on a dedicated thread and forwards its
/// results over a channel.
///
/// Returns as soon as the thread is running; slow startup such as a model
/// load or camera open never blocks the caller. If `open` fails the error is
/// logged and the handle simply never yields results.
pub fn spawn_detector<F, D>(open: F) -> Result<DetectorHandle>
where
    F: FnOnce() -> Result<D> + Send + 'static,
    D: LandmarkDetector,
{
    let (tx, rx) = mpsc::channel();
    let stop = Arc::new(AtomicBool::new(false));
    let thread = thread::Builder::new()
        .name("landmark-detector".to_string())
        .spawn({
            let stop = stop.clone();
            move || match open() {
                Ok(detector) => pump(detector, tx, stop),
                Err(err) => {
                    tracing::error!(%err, "hand tracking unavailable, running without interaction")
                }
            }
        })?;

    Ok(DetectorHandle {
        rx,
        stop,
        thread: Some(thread),
    })
}

fn pump<D: LandmarkDetector>(mut detector: D, tx: Sender<DetectionResult>, stop: Arc<AtomicBool>) {
    while !stop.load(Ordering::Relaxed) {
        match detector.next_result() {
            Ok(Some(result)) => {
                if tx.send(result).is_err() {
                    break;
                }
            }
            Ok(None) => {
                tracing::info!("detector stream ended");
                break;
            }
            Err(err) => {
                tracing::error!(%err, "detector failed, gesture tracking stopped");
                break;
            }
        }
    }

    if let Err(err) = detector.close() {
        tracing::warn!(%err, "failed to close detector");
    }
}

/// Owning handle for a detector thread.
pub struct DetectorHandle {
    rx: Receiver<DetectionResult>,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl DetectorHandle {
    /// Results that arrived since the last call, oldest first. Never blocks.
    pub fn drain(&self) -> TryIter<'_, DetectionResult> {
        self.rx.try_iter()
    }

    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .map(|thread| !thread.is_finished())
            .unwrap_or(false)
    }

    /// Asks the detector thread to stop and waits briefly for it to release
    /// the detector.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        self.stop.store(true, Ordering::Relaxed);

        let deadline = Instant::now() + CLOSE_GRACE;
        while !thread.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }

        if thread.is_finished() {
            if thread.join().is_err() {
                tracing::warn!("detector thread panicked");
            }
        } else {
            tracing::warn!("detector did not stop in time, detaching it");
        }
    }
}

impl Drop for DetectorHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for DetectorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorHandle")
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GestureTreeError;
    use std::io::Cursor;
    use std::sync::atomic::AtomicUsize;

    struct Scripted {
        remaining: usize,
        closed: Arc<AtomicUsize>,
    }

    impl LandmarkDetector for Scripted {
        fn next_result(&mut self) -> Result<Option<DetectionResult>> {
            if self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            Ok(Some(DetectionResult {
                timestamp: Some(self.remaining as f32),
                hands: Vec::new(),
            }))
        }

        fn close(&mut self) -> Result<()> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn wait_for_exit(handle: &DetectorHandle) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while handle.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn forwards_results_in_order_and_closes_detector() {
        let closed = Arc::new(AtomicUsize::new(0));
        let scripted = Scripted {
            remaining: 3,
            closed: closed.clone(),
        };
        let handle = spawn_detector(move || Ok(scripted)).unwrap();

        wait_for_exit(&handle);
        let stamps: Vec<_> = handle.drain().map(|r| r.timestamp).collect();
        assert_eq!(stamps, vec![Some(2.0), Some(1.0), Some(0.0)]);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
        handle.close();
    }

    #[test]
    fn replay_runs_on_detector_thread() {
        let replay = ReplayDetector::new(Cursor::new("{\"hands\":[]}\n{\"hands\":[]}\n"), false);
        let handle = spawn_detector(move || Ok(replay)).unwrap();
        wait_for_exit(&handle);
        assert_eq!(handle.drain().count(), 2);
        assert!(!handle.is_running());
    }

    #[test]
    fn failed_open_ends_thread_without_results() {
        let handle = spawn_detector(|| {
            Err::<Scripted, _>(GestureTreeError::DetectorUnavailable("no camera".to_string()))
        })
        .unwrap();
        wait_for_exit(&handle);
        assert_eq!(handle.drain().count(), 0);
        assert!(!handle.is_running());
    }

    #[cfg(unix)]
    #[test]
    fn slow_detector_startup_does_not_block_caller() {
        let command = DetectorCommand {
            program: std::path::PathBuf::from("sh"),
            args: vec!["-c".to_string(), "sleep 2; echo READY".to_string()],
        };
        let config = crate::config::DetectorConfig::default();

        let start = Instant::now();
        let handle = spawn_detector(move || SubprocessDetector::spawn(&command, &config)).unwrap();
        assert!(start.elapsed() < Duration::from_millis(500));
        assert!(handle.is_running());
        assert_eq!(handle.drain().count(), 0);
        handle.close();
    }

    #[test]
    fn primary_hand_is_first_hand() {
        assert!(DetectionResult::default().primary_hand().is_none());
    }
}
