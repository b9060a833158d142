//! The capture pipeline — one worker thread from camera frames to
//! debounced gesture events.
//!
//! The worker exclusively owns its camera and estimator for its whole
//! lifetime; both are dropped inside the thread on every exit path, so
//! [`CaptureHandle::stop`] returning means the devices are released.
//! Traffic out of the worker is strictly one-way: accepted gesture events
//! on the app channel, rendered frames on a separate display channel.
//! The worker never waits on the consumer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use hand_model::{classify_hands, FlipConvention, HandFrame};
use thiserror::Error;

use crate::gesture::{AppEvent, DebounceGate};

// ════════════════════════════════════════════════════════════════════════════
// Frame + collaborator traits
// ════════════════════════════════════════════════════════════════════════════

/// One camera frame, tightly packed RGB.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub rgb: Vec<u8>,
}

impl Frame {
    /// A flat-colored frame, handy for sim mode and tests.
    pub fn solid(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&rgb);
        }
        Frame {
            width,
            height,
            rgb: data,
        }
    }
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("camera: {0}")]
    Camera(String),

    #[error("estimator: {0}")]
    Estimator(String),
}

/// A camera device.  `Ok(None)` signals a clean end of stream.
pub trait CameraSource: Send + 'static {
    fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError>;
}

/// A hand-pose estimator: zero or more detected hands per frame.
pub trait HandPoseEstimator: Send + 'static {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<HandFrame>, CaptureError>;
}

// ════════════════════════════════════════════════════════════════════════════
// CaptureConfig / CaptureHandle
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct CaptureConfig {
    pub flip: FlipConvention,
    pub cooldown: Duration,
    /// Consecutive read/detect failures tolerated before the worker gives
    /// up and reports `SourceClosed`.
    pub max_failures: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        CaptureConfig {
            flip: FlipConvention::Mirrored,
            cooldown: crate::gesture::DEFAULT_COOLDOWN,
            max_failures: 5,
        }
    }
}

/// Handle to a running capture worker.
pub struct CaptureHandle {
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
    frames: Receiver<Frame>,
}

impl CaptureHandle {
    /// The display-frame stream (operator feedback only).
    pub fn frames(&self) -> &Receiver<Frame> {
        &self.frames
    }

    /// The most recent pending display frame, discarding older ones.
    pub fn latest_frame(&self) -> Option<Frame> {
        let mut latest = None;
        while let Ok(f) = self.frames.try_recv() {
            latest = Some(f);
        }
        latest
    }

    /// Ask the worker to stop and wait for it.  The loop checks the flag
    /// once per frame iteration; when this returns, the camera and
    /// estimator have been dropped.
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// spawn
// ════════════════════════════════════════════════════════════════════════════

/// Start the capture worker.  Accepted gesture events (and the terminal
/// `SourceClosed`) go out on `tx`; display frames on the returned
/// handle's frame channel.
pub fn spawn<C, E>(
    camera: C,
    estimator: E,
    config: CaptureConfig,
    tx: Sender<AppEvent>,
) -> CaptureHandle
where
    C: CameraSource,
    E: HandPoseEstimator,
{
    let stop = Arc::new(AtomicBool::new(false));
    let (frame_tx, frame_rx) = mpsc::channel();
    let worker_stop = Arc::clone(&stop);
    let join = thread::spawn(move || {
        capture_loop(camera, estimator, config, worker_stop, tx, frame_tx);
    });
    CaptureHandle {
        stop,
        join: Some(join),
        frames: frame_rx,
    }
}

fn capture_loop<C, E>(
    mut camera: C,
    mut estimator: E,
    config: CaptureConfig,
    stop: Arc<AtomicBool>,
    tx: Sender<AppEvent>,
    frame_tx: Sender<Frame>,
) where
    C: CameraSource,
    E: HandPoseEstimator,
{
    let mut gate = DebounceGate::new(config.cooldown);
    let mut failures = 0u32;

    while !stop.load(Ordering::Relaxed) {
        let frame = match camera.next_frame() {
            Ok(Some(frame)) => {
                failures = 0;
                frame
            }
            Ok(None) => {
                log::info!("camera reached end of stream");
                let _ = tx.send(AppEvent::SourceClosed {
                    reason: "end of stream".to_string(),
                });
                return;
            }
            Err(e) => {
                failures += 1;
                log::warn!("frame read failed ({}/{}): {}", failures, config.max_failures, e);
                if failures >= config.max_failures {
                    let _ = tx.send(AppEvent::SourceClosed {
                        reason: e.to_string(),
                    });
                    return;
                }
                continue;
            }
        };

        let hands = match estimator.detect(&frame) {
            Ok(hands) => hands,
            Err(e) => {
                failures += 1;
                log::warn!("detection failed ({}/{}): {}", failures, config.max_failures, e);
                if failures >= config.max_failures {
                    let _ = tx.send(AppEvent::SourceClosed {
                        reason: e.to_string(),
                    });
                    return;
                }
                continue;
            }
        };

        let symbol = classify_hands(&hands, config.flip);
        if let Some(evt) = gate.offer(symbol, Instant::now()) {
            log::debug!("accepted {:?}", evt.symbol);
            if tx.send(AppEvent::Gesture(evt)).is_err() {
                // Consumer gone; nothing left to do.
                return;
            }
        }

        // Display is feedback only: a closed viewer must not stall capture.
        let _ = frame_tx.send(frame);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SyntheticCamera — scripted frames for sim mode and tests
// ════════════════════════════════════════════════════════════════════════════

/// Plays back a fixed frame list, optionally pacing them, then reports
/// end of stream.
pub struct SyntheticCamera {
    frames: std::collections::VecDeque<Frame>,
    frame_delay: Duration,
}

impl SyntheticCamera {
    pub fn new(frames: Vec<Frame>, frame_delay: Duration) -> Self {
        SyntheticCamera {
            frames: frames.into(),
            frame_delay,
        }
    }
}

impl CameraSource for SyntheticCamera {
    fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        if !self.frame_delay.is_zero() {
            thread::sleep(self.frame_delay);
        }
        Ok(self.frames.pop_front())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_model::landmark::{index, Landmark, LANDMARK_COUNT};
    use hand_model::{GestureSymbol, HandSide};
    use std::collections::VecDeque;

    /// A mirrored-view right hand raising `n` of the four vertical digits
    /// (thumb curled), so it classifies as Select(n) / Submit-less shapes.
    fn hand_raising(n: usize) -> HandFrame {
        let mut points = [Some(Landmark { x: 0.5, y: 0.5, z: 0.0 }); LANDMARK_COUNT];
        points[index::THUMB_IP] = Some(Landmark { x: 0.40, y: 0.5, z: 0.0 });
        points[index::THUMB_TIP] = Some(Landmark { x: 0.45, y: 0.5, z: 0.0 });
        let tips = [
            (index::INDEX_TIP, index::INDEX_PIP),
            (index::MIDDLE_TIP, index::MIDDLE_PIP),
            (index::RING_TIP, index::RING_PIP),
            (index::PINKY_TIP, index::PINKY_PIP),
        ];
        for (slot, (tip, pip)) in tips.iter().enumerate() {
            points[*pip] = Some(Landmark { x: 0.5, y: 0.5, z: 0.0 });
            let y = if slot < n { 0.3 } else { 0.7 };
            points[*tip] = Some(Landmark { x: 0.5, y, z: 0.0 });
        }
        HandFrame::from_partial(points, HandSide::Right, 0.9)
    }

    /// Open palm: four digits plus an outward thumb.
    fn open_palm() -> HandFrame {
        let mut points = [Some(Landmark { x: 0.5, y: 0.5, z: 0.0 }); LANDMARK_COUNT];
        points[index::THUMB_IP] = Some(Landmark { x: 0.40, y: 0.5, z: 0.0 });
        points[index::THUMB_TIP] = Some(Landmark { x: 0.30, y: 0.5, z: 0.0 });
        let tips = [
            (index::INDEX_TIP, index::INDEX_PIP),
            (index::MIDDLE_TIP, index::MIDDLE_PIP),
            (index::RING_TIP, index::RING_PIP),
            (index::PINKY_TIP, index::PINKY_PIP),
        ];
        for (tip, pip) in tips {
            points[pip] = Some(Landmark { x: 0.5, y: 0.5, z: 0.0 });
            points[tip] = Some(Landmark { x: 0.5, y: 0.3, z: 0.0 });
        }
        HandFrame::from_partial(points, HandSide::Right, 0.9)
    }

    /// Estimator scripted with one hand list per frame.
    struct ScriptedEstimator {
        script: VecDeque<Vec<HandFrame>>,
    }

    impl HandPoseEstimator for ScriptedEstimator {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<HandFrame>, CaptureError> {
            Ok(self.script.pop_front().unwrap_or_default())
        }
    }

    fn dummy_frames(n: usize) -> Vec<Frame> {
        (0..n).map(|_| Frame::solid(4, 4, [0, 0, 0])).collect()
    }

    fn config(cooldown_ms: u64) -> CaptureConfig {
        CaptureConfig {
            flip: FlipConvention::Mirrored,
            cooldown: Duration::from_millis(cooldown_ms),
            max_failures: 3,
        }
    }

    #[test]
    fn pipeline_emits_events_in_acceptance_order() {
        let (tx, rx) = mpsc::channel();
        let script: VecDeque<Vec<HandFrame>> = vec![
            vec![hand_raising(2)],
            vec![],
            vec![open_palm()],
        ]
        .into();
        let handle = spawn(
            SyntheticCamera::new(dummy_frames(3), Duration::from_millis(30)),
            ScriptedEstimator { script },
            config(10),
            tx,
        );

        match rx.recv_timeout(Duration::from_secs(2)).unwrap() {
            AppEvent::Gesture(evt) => assert_eq!(evt.symbol, GestureSymbol::Select(2)),
            other => panic!("unexpected {:?}", other),
        }
        match rx.recv_timeout(Duration::from_secs(2)).unwrap() {
            AppEvent::Gesture(evt) => assert_eq!(evt.symbol, GestureSymbol::Submit),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(2)).unwrap(),
            AppEvent::SourceClosed { .. }
        ));
        handle.stop();
    }

    #[test]
    fn held_gesture_is_debounced_to_one_event() {
        let (tx, rx) = mpsc::channel();
        let script: VecDeque<Vec<HandFrame>> =
            (0..10).map(|_| vec![hand_raising(1)]).collect();
        let handle = spawn(
            SyntheticCamera::new(dummy_frames(10), Duration::from_millis(1)),
            ScriptedEstimator { script },
            config(10_000), // window far longer than the whole script
            tx,
        );

        let mut gestures = 0;
        loop {
            match rx.recv_timeout(Duration::from_secs(2)).unwrap() {
                AppEvent::Gesture(_) => gestures += 1,
                AppEvent::SourceClosed { .. } => break,
                other => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(gestures, 1);
        handle.stop();
    }

    #[test]
    fn display_frames_flow_on_their_own_channel() {
        let (tx, rx) = mpsc::channel();
        let handle = spawn(
            SyntheticCamera::new(dummy_frames(4), Duration::ZERO),
            ScriptedEstimator {
                script: VecDeque::new(),
            },
            config(10),
            tx,
        );
        // Wait for the worker to finish its script.
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(2)).unwrap(),
            AppEvent::SourceClosed { .. }
        ));
        let mut frames = 0;
        while handle.frames().try_recv().is_ok() {
            frames += 1;
        }
        assert_eq!(frames, 4);
        handle.stop();
    }

    /// Camera that counts reads and signals release on drop.
    struct EndlessCamera {
        released: Arc<AtomicBool>,
    }

    impl CameraSource for EndlessCamera {
        fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
            thread::sleep(Duration::from_millis(1));
            Ok(Some(Frame::solid(2, 2, [0, 0, 0])))
        }
    }

    impl Drop for EndlessCamera {
        fn drop(&mut self) {
            self.released.store(true, Ordering::Relaxed);
        }
    }

    #[test]
    fn stop_joins_and_releases_the_camera() {
        let released = Arc::new(AtomicBool::new(false));
        let (tx, _rx) = mpsc::channel();
        let handle = spawn(
            EndlessCamera {
                released: Arc::clone(&released),
            },
            ScriptedEstimator {
                script: VecDeque::new(),
            },
            config(10),
            tx,
        );
        thread::sleep(Duration::from_millis(10));
        handle.stop();
        assert!(released.load(Ordering::Relaxed));
    }

    struct BrokenCamera;

    impl CameraSource for BrokenCamera {
        fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
            Err(CaptureError::Camera("device unplugged".to_string()))
        }
    }

    #[test]
    fn persistent_read_failure_surfaces_and_stops() {
        let (tx, rx) = mpsc::channel();
        let handle = spawn(
            BrokenCamera,
            ScriptedEstimator {
                script: VecDeque::new(),
            },
            config(10),
            tx,
        );
        match rx.recv_timeout(Duration::from_secs(2)).unwrap() {
            AppEvent::SourceClosed { reason } => assert!(reason.contains("unplugged")),
            other => panic!("unexpected {:?}", other),
        }
        // The worker exited on its own; the channel is now disconnected.
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        handle.stop();
    }
}
