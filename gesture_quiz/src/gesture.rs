//! Gesture events, the debounce/cooldown gate, and event sources.
//!
//! The public interface is [`AppEvent`] delivered over an `mpsc` channel.
//! Consumers don't need to know whether events came from a real camera
//! pipeline or the keyboard simulator.

use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use hand_model::GestureSymbol;

// ════════════════════════════════════════════════════════════════════════════
// GestureEvent / AppEvent
// ════════════════════════════════════════════════════════════════════════════

/// A gesture symbol together with the wall-clock time the gate accepted it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureEvent {
    pub symbol: GestureSymbol,
    pub at: Instant,
}

/// Explicit navigation, independent of the gesture vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavEvent {
    Prev,
    Next,
}

/// Everything a producer can send to the app loop.
#[derive(Clone, Debug, PartialEq)]
pub enum AppEvent {
    Gesture(GestureEvent),
    Nav(NavEvent),
    /// The frame source stopped for good (end of stream or a persistent
    /// read failure).  Terminal for that producer.
    SourceClosed { reason: String },
    /// Quit the application.
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// DebounceGate
// ════════════════════════════════════════════════════════════════════════════

/// Minimum time between two accepted gesture events.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(2);

/// Turns the noisy per-frame symbol stream into discrete, rate-limited
/// events.
///
/// Acceptance is edge-triggered: the first qualifying symbol is emitted
/// immediately, then every qualifying symbol — matching or not — is
/// suppressed until the cooldown window has passed.  `None` never emits
/// and never touches the window.
#[derive(Clone, Debug)]
pub struct DebounceGate {
    cooldown: Duration,
    last_accepted: Option<Instant>,
}

impl Default for DebounceGate {
    fn default() -> Self {
        DebounceGate::new(DEFAULT_COOLDOWN)
    }
}

impl DebounceGate {
    pub fn new(cooldown: Duration) -> Self {
        DebounceGate {
            cooldown,
            last_accepted: None,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Offer one classified symbol observed at time `at`.
    pub fn offer(&mut self, symbol: GestureSymbol, at: Instant) -> Option<GestureEvent> {
        if symbol.is_none() {
            return None;
        }
        match self.last_accepted {
            Some(last) if at.duration_since(last) <= self.cooldown => None,
            _ => {
                self.last_accepted = Some(at);
                Some(GestureEvent { symbol, at })
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureSource trait + spawn helper
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can feed [`AppEvent`]s into a channel.
pub trait GestureSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<AppEvent>);
}

/// Spawn a gesture source on its own thread.  Several sources may share
/// one sender; each source's own events stay in order.
pub fn spawn_gesture_source<G: GestureSource>(source: G, tx: Sender<AppEvent>) {
    thread::spawn(move || Box::new(source).run(tx));
}

// ════════════════════════════════════════════════════════════════════════════
// SimGestureSource — keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimInput {
    Key(SimKey),
}

/// Simulated key codes (mapped from minifb keys by the viewer).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    Select(u8), // 1–4
    Submit,     // 5 or Space
    Prev,       // P
    Next,       // N
    Quit,       // Q / Escape
}

/// Gesture source driven by [`SimInput`] events from the viewer window.
///
/// Simulated select/submit keys pass through the same debounce gate as
/// real gestures, so the cooldown contract holds in both modes.
/// Navigation and quit bypass the gate.
pub struct SimGestureSource {
    pub rx: Receiver<SimInput>,
    pub gate: DebounceGate,
}

impl GestureSource for SimGestureSource {
    fn run(mut self: Box<Self>, tx: Sender<AppEvent>) {
        for input in self.rx.iter() {
            let SimInput::Key(key) = input;
            let event = match key {
                SimKey::Select(n) => {
                    match self.gate.offer(GestureSymbol::Select(n), Instant::now()) {
                        Some(evt) => AppEvent::Gesture(evt),
                        None => continue,
                    }
                }
                SimKey::Submit => match self.gate.offer(GestureSymbol::Submit, Instant::now()) {
                    Some(evt) => AppEvent::Gesture(evt),
                    None => continue,
                },
                SimKey::Prev => AppEvent::Nav(NavEvent::Prev),
                SimKey::Next => AppEvent::Nav(NavEvent::Next),
                SimKey::Quit => {
                    let _ = tx.send(AppEvent::Quit);
                    return;
                }
            };
            if tx.send(event).is_err() {
                return;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
