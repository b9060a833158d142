//! Finger-state extraction — from raw landmarks to a 5-bool extension vector.
//!
//! The rules are deliberately frame-local: the thumb compares horizontal
//! tip vs. interphalangeal positions, the other digits compare vertical
//! tip vs. PIP positions.  Per-frame flicker is expected here and handled
//! entirely by the debounce gate downstream.

use crate::landmark::{index, HandFrame, HandSide};

// ════════════════════════════════════════════════════════════════════════════
// Finger / FingerVector
// ════════════════════════════════════════════════════════════════════════════

/// The five digits, in vector order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];
}

/// One frame's extension state (true = extended) for one hand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerVector([bool; 5]);

impl FingerVector {
    pub fn new(states: [bool; 5]) -> Self {
        FingerVector(states)
    }

    /// Number of extended digits.
    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&e| e).count()
    }

    pub fn is_extended(&self, finger: Finger) -> bool {
        self.0[finger as usize]
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FlipConvention
// ════════════════════════════════════════════════════════════════════════════

/// Whether frames were horizontally mirrored before landmark estimation.
///
/// Selfie-style capture flips the frame so the image behaves like a
/// mirror; that inverts which horizontal side of the thumb IP joint
/// counts as "outward".  The vertical rules are unaffected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlipConvention {
    /// Frame was flipped before estimation (selfie view).
    #[default]
    Mirrored,
    /// Frame is as captured.
    Unmirrored,
}

/// True when "outward" for the thumb means decreasing x.
fn thumb_outward_is_neg_x(flip: FlipConvention, side: HandSide) -> bool {
    match (flip, side) {
        (FlipConvention::Mirrored, HandSide::Right) => true,
        (FlipConvention::Mirrored, HandSide::Left) => false,
        (FlipConvention::Unmirrored, HandSide::Right) => false,
        (FlipConvention::Unmirrored, HandSide::Left) => true,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// extend_fingers
// ════════════════════════════════════════════════════════════════════════════

/// Per-digit (tip, reference-joint) landmark pairs for the vertical rule.
const TIP_PIP: [(usize, usize); 4] = [
    (index::INDEX_TIP, index::INDEX_PIP),
    (index::MIDDLE_TIP, index::MIDDLE_PIP),
    (index::RING_TIP, index::RING_PIP),
    (index::PINKY_TIP, index::PINKY_PIP),
];

/// Extract the extension vector for one hand.
///
/// * Thumb: extended iff the tip's x is on the outward side of the IP
///   joint's x, where "outward" depends on `flip` and the detected
///   handedness.
/// * Index/middle/ring/pinky: extended iff tip.y < pip.y (tip above the
///   PIP joint; y grows downward).
///
/// A digit whose tip or reference joint is missing from the frame is
/// reported as not extended.
pub fn extend_fingers(hand: &HandFrame, flip: FlipConvention) -> FingerVector {
    let thumb = match (hand.point(index::THUMB_TIP), hand.point(index::THUMB_IP)) {
        (Some(tip), Some(ip)) => {
            if thumb_outward_is_neg_x(flip, hand.side()) {
                tip.x < ip.x
            } else {
                tip.x > ip.x
            }
        }
        _ => false,
    };

    let mut states = [thumb, false, false, false, false];
    for (slot, (tip_idx, pip_idx)) in TIP_PIP.iter().enumerate() {
        if let (Some(tip), Some(pip)) = (hand.point(*tip_idx), hand.point(*pip_idx)) {
            states[slot + 1] = tip.y < pip.y;
        }
    }

    FingerVector(states)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
