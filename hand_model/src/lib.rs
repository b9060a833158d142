//! # hand_model
//!
//! Hand landmark model with finger-state extraction and finger-count
//! gesture classification.
//!
//! The crate is the pure, leaf layer of the gesture pipeline: everything
//! here is a function from per-frame landmark data to a discrete value.
//! No smoothing, no timing, no I/O — debouncing is the caller's job.
//!
//! ## Pipeline position
//!
//! ```text
//! camera frame → estimator → [HandFrame] → extend_fingers → FingerVector
//!                                        → classify       → GestureSymbol
//! ```
//!
//! ## Gesture vocabulary
//!
//! | Extended fingers | Symbol |
//! |---|---|
//! | 1–4 | `Select(n)` — pick option *n* (1 = option A) |
//! | 5 | `Submit` |
//! | 0 | `None` |

pub mod landmark;
pub mod fingers;
pub mod classify;

pub use landmark::{HandFrame, HandSide, Landmark, LANDMARK_COUNT};
pub use fingers::{extend_fingers, Finger, FingerVector, FlipConvention};
pub use classify::{classify, classify_hands, GestureSymbol};
