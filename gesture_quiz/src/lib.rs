//! # gesture_quiz
//!
//! Answer multiple-choice quizzes by holding up fingers in front of a
//! camera.  Camera frames go in, a hand-pose estimator finds landmarks,
//! the finger counter classifies each frame, a cooldown gate debounces
//! the noisy stream, and the surviving events drive a scored quiz
//! session.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Action |
//! |---|---|
//! | 1–4 fingers | Select option 1–4 for the current question, then advance |
//! | Open palm (5 fingers) | Submit the quiz |
//!
//! One accepted gesture per cooldown window (2 s by default); holding a
//! gesture does not repeat it.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: keyboard shortcuts drive all
//!   gestures, no hardware needed.
//! * `camera` — **Hardware mode**: webcam via `nokhwa` plus a MediaPipe
//!   hand-landmarker subprocess.
//!
//! ### Simulation keyboard shortcuts
//!
//! | Key | Gesture |
//! |---|---|
//! | `1`–`4` | Select option |
//! | `5` / `Space` | Submit |
//! | `N` / `P` | Next / previous question |
//! | `Q` / `Escape` | Quit |

pub mod gesture;
pub mod capture;
#[cfg(feature = "camera")]
pub mod hardware;
pub mod viewer;
pub mod app;
