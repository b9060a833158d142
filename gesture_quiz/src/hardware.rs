//! Hardware mode (feature = "camera"): webcam frames via `nokhwa`, hand
//! landmarks via a MediaPipe hand-landmarker Python subprocess.
//!
//! The subprocess protocol is line-oriented: the child prints `READY`
//! once, then for every frame we write a 12-byte little-endian header
//! (width, height, channels) followed by raw RGB bytes to its stdin and
//! read back one JSON line:
//!
//! ```json
//! {"hands":[{"handedness":"Right","score":0.97,"landmarks":[{"x":..},..]}]}
//! ```

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use hand_model::{HandFrame, HandSide, Landmark, LANDMARK_COUNT};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use serde::Deserialize;

use crate::capture::{CameraSource, CaptureError, Frame, HandPoseEstimator};

// ════════════════════════════════════════════════════════════════════════════
// WebcamSource
// ════════════════════════════════════════════════════════════════════════════

/// A webcam behind the `nokhwa` capture API.
///
/// Frames are mirrored horizontally by default (selfie view), matching
/// `FlipConvention::Mirrored` in the extraction layer.
pub struct WebcamSource {
    camera: Camera,
    mirror: bool,
}

impl WebcamSource {
    pub fn open(index: u32) -> Result<Self, CaptureError> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);
        let mut camera = Camera::new(CameraIndex::Index(index), requested)
            .map_err(|e| CaptureError::Camera(e.to_string()))?;
        camera
            .open_stream()
            .map_err(|e| CaptureError::Camera(e.to_string()))?;
        log::info!("opened camera {}", index);
        Ok(WebcamSource {
            camera,
            mirror: true,
        })
    }

    pub fn set_mirror(&mut self, mirror: bool) {
        self.mirror = mirror;
    }
}

impl CameraSource for WebcamSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        let buffer = self
            .camera
            .frame()
            .map_err(|e| CaptureError::Camera(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureError::Camera(e.to_string()))?;
        let mut frame = Frame {
            width: decoded.width() as usize,
            height: decoded.height() as usize,
            rgb: decoded.into_raw(),
        };
        if self.mirror {
            mirror_horizontal(&mut frame);
        }
        Ok(Some(frame))
    }
}

/// Flip an RGB frame in place around its vertical axis.
fn mirror_horizontal(frame: &mut Frame) {
    let row_bytes = frame.width * 3;
    for row in frame.rgb.chunks_exact_mut(row_bytes) {
        let pixels = frame.width;
        for x in 0..pixels / 2 {
            let (a, b) = (x * 3, (pixels - 1 - x) * 3);
            for c in 0..3 {
                row.swap(a + c, b + c);
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MediapipeEstimator
// ════════════════════════════════════════════════════════════════════════════

#[derive(Deserialize)]
struct HandJson {
    handedness: HandSide,
    score: f32,
    landmarks: Vec<Landmark>,
}

#[derive(Deserialize)]
struct DetectionJson {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Hand-pose estimation through a MediaPipe Python subprocess.
///
/// Explicitly owned by the capture worker: created at session start,
/// killed when the worker drops it.
pub struct MediapipeEstimator {
    process: Child,
    stdout: BufReader<ChildStdout>,
    min_confidence: f32,
}

impl MediapipeEstimator {
    /// Spawn the detector script and wait for its `READY` line.
    pub fn spawn<P: AsRef<Path>>(script: P) -> Result<Self, CaptureError> {
        let script = script.as_ref();
        if !script.exists() {
            return Err(CaptureError::Estimator(format!(
                "detector script not found at {}",
                script.display()
            )));
        }

        log::info!("starting MediaPipe hand landmarker subprocess…");
        let mut process = Command::new("python3")
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| CaptureError::Estimator(format!("spawn failed: {}", e)))?;

        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| CaptureError::Estimator("child has no stdout".to_string()))?;
        let mut stdout = BufReader::new(stdout);

        let mut ready = String::new();
        stdout
            .read_line(&mut ready)
            .map_err(|e| CaptureError::Estimator(e.to_string()))?;
        if ready.trim() != "READY" {
            let _ = process.kill();
            return Err(CaptureError::Estimator(format!(
                "detector did not signal READY, got: {}",
                ready.trim()
            )));
        }
        log::info!("MediaPipe hand landmarker ready");

        Ok(MediapipeEstimator {
            process,
            stdout,
            min_confidence: 0.5,
        })
    }

    pub fn set_min_confidence(&mut self, min: f32) {
        self.min_confidence = min.clamp(0.0, 1.0);
    }

    /// Default location of the detector script.
    pub fn default_script() -> PathBuf {
        PathBuf::from("hand_detect.py")
    }
}

impl HandPoseEstimator for MediapipeEstimator {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<HandFrame>, CaptureError> {
        let stdin = self
            .process
            .stdin
            .as_mut()
            .ok_or_else(|| CaptureError::Estimator("child has no stdin".to_string()))?;

        let write = |e: std::io::Error| CaptureError::Estimator(format!("write: {}", e));
        stdin.write_all(&(frame.width as u32).to_le_bytes()).map_err(write)?;
        stdin.write_all(&(frame.height as u32).to_le_bytes()).map_err(write)?;
        stdin.write_all(&3u32.to_le_bytes()).map_err(write)?;
        stdin.write_all(&frame.rgb).map_err(write)?;
        stdin.flush().map_err(write)?;

        let mut line = String::new();
        self.stdout
            .read_line(&mut line)
            .map_err(|e| CaptureError::Estimator(format!("read: {}", e)))?;
        let detection: DetectionJson = serde_json::from_str(&line)
            .map_err(|e| CaptureError::Estimator(format!("decode: {}", e)))?;

        if let Some(error) = detection.error {
            log::warn!("detector error: {}", error);
            return Ok(Vec::new());
        }

        let mut hands = Vec::new();
        for hand in detection.hands {
            if hand.score < self.min_confidence {
                continue;
            }
            if hand.landmarks.len() != LANDMARK_COUNT {
                log::warn!(
                    "expected {} landmarks, got {}",
                    LANDMARK_COUNT,
                    hand.landmarks.len()
                );
                continue;
            }
            let mut points = [None; LANDMARK_COUNT];
            for (i, lm) in hand.landmarks.into_iter().enumerate() {
                points[i] = Some(lm);
            }
            hands.push(HandFrame::from_partial(points, hand.handedness, hand.score));
        }
        Ok(hands)
    }
}

impl Drop for MediapipeEstimator {
    fn drop(&mut self) {
        let _ = self.process.kill();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
