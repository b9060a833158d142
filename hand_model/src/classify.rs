//! Gesture classification — from an extension vector to a discrete symbol.

use crate::fingers::{extend_fingers, FingerVector, FlipConvention};
use crate::landmark::HandFrame;

// ════════════════════════════════════════════════════════════════════════════
// GestureSymbol
// ════════════════════════════════════════════════════════════════════════════

/// The discrete classification of one frame's finger pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureSymbol {
    /// No recognizable gesture this frame.
    None,
    /// Pick option `n` (1-based; one finger selects option A).
    Select(u8),
    /// Open palm — submit the quiz.
    Submit,
}

impl GestureSymbol {
    /// The selected option as a 0-based index, for `Select` symbols.
    pub fn option_index(&self) -> Option<usize> {
        match self {
            GestureSymbol::Select(n) => (*n as usize).checked_sub(1),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, GestureSymbol::None)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// classify
// ════════════════════════════════════════════════════════════════════════════

/// Map an extension vector to a gesture symbol by extended-digit count:
/// five → `Submit`, one to four → `Select(n)`, anything else → `None`.
pub fn classify(v: FingerVector) -> GestureSymbol {
    match v.count() {
        5 => GestureSymbol::Submit,
        n @ 1..=4 => GestureSymbol::Select(n as u8),
        _ => GestureSymbol::None,
    }
}

/// Classify a multi-hand frame: the first hand yielding a qualifying
/// (non-`None`) symbol wins; the rest are ignored.
pub fn classify_hands(hands: &[HandFrame], flip: FlipConvention) -> GestureSymbol {
    hands
        .iter()
        .map(|h| classify(extend_fingers(h, flip)))
        .find(|g| !g.is_none())
        .unwrap_or(GestureSymbol::None)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{index, HandSide, Landmark, LANDMARK_COUNT};

    #[test]
    fn all_32_patterns_classify_by_count() {
        for bits in 0u8..32 {
            let states = [
                bits & 1 != 0,
                bits & 2 != 0,
                bits & 4 != 0,
                bits & 8 != 0,
                bits & 16 != 0,
            ];
            let v = FingerVector::new(states);
            let expected = match v.count() {
                0 => GestureSymbol::None,
                5 => GestureSymbol::Submit,
                n => GestureSymbol::Select(n as u8),
            };
            assert_eq!(classify(v), expected, "pattern {:05b}", bits);
        }
    }

    #[test]
    fn select_maps_to_zero_based_option() {
        for n in 1..=4u8 {
            assert_eq!(
                GestureSymbol::Select(n).option_index(),
                Some(n as usize - 1)
            );
        }
        assert_eq!(GestureSymbol::Submit.option_index(), None);
        assert_eq!(GestureSymbol::None.option_index(), None);
    }

    /// A mirrored-view right hand with `raised` digits up.
    fn hand(raised: usize) -> HandFrame {
        let mut points = [Some(Landmark { x: 0.5, y: 0.5, z: 0.0 }); LANDMARK_COUNT];
        points[index::THUMB_IP] = Some(Landmark { x: 0.40, y: 0.5, z: 0.0 });
        points[index::THUMB_TIP] = Some(Landmark { x: 0.45, y: 0.5, z: 0.0 }); // curled
        let tips = [
            (index::INDEX_TIP, index::INDEX_PIP),
            (index::MIDDLE_TIP, index::MIDDLE_PIP),
            (index::RING_TIP, index::RING_PIP),
            (index::PINKY_TIP, index::PINKY_PIP),
        ];
        for (slot, (tip, pip)) in tips.iter().enumerate() {
            points[*pip] = Some(Landmark { x: 0.5, y: 0.5, z: 0.0 });
            let y = if slot < raised { 0.3 } else { 0.7 };
            points[*tip] = Some(Landmark { x: 0.5, y, z: 0.0 });
        }
        HandFrame::from_partial(points, HandSide::Right, 0.9)
    }

    #[test]
    fn first_qualifying_hand_wins() {
        let hands = vec![hand(0), hand(2), hand(4)];
        assert_eq!(
            classify_hands(&hands, FlipConvention::Mirrored),
            GestureSymbol::Select(2)
        );
    }

    #[test]
    fn no_hands_is_none() {
        assert_eq!(
            classify_hands(&[], FlipConvention::Mirrored),
            GestureSymbol::None
        );
    }

    #[test]
    fn all_idle_hands_is_none() {
        let hands = vec![hand(0), hand(0)];
        assert_eq!(
            classify_hands(&hands, FlipConvention::Mirrored),
            GestureSymbol::None
        );
    }
}
