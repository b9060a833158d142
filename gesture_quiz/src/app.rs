//! Top-level application loop.
//!
//! [`App`] owns the quiz session and the result store, consumes
//! [`AppEvent`]s from the producers, and drives the viewer each frame.
//! Event handling is non-blocking (`try_recv` drain per tick) so the
//! capture worker is never stalled waiting on UI work.

use std::io::{self, Write};
use std::sync::mpsc::{self, TryRecvError};
use std::time::Duration;

use hand_model::FlipConvention;
use quiz_core::{GestureOutcome, QuizResult, QuizSession, QuizStore, SessionError};

use crate::capture::Frame;
use crate::gesture::{
    spawn_gesture_source, AppEvent, DebounceGate, NavEvent, SimGestureSource, SimInput,
    DEFAULT_COOLDOWN,
};
use crate::viewer::Viewer;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
pub struct AppConfig {
    pub quiz_id: u32,
    pub student_id: u32,
    /// Minimum time between accepted gestures.
    pub cooldown: Duration,
    /// Camera-flip convention for the thumb rule.
    pub flip: FlipConvention,
    /// Which webcam to open in hardware mode.
    pub camera_index: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            quiz_id: 1,
            student_id: 1,
            cooldown: DEFAULT_COOLDOWN,
            flip: FlipConvention::Mirrored,
            camera_index: 0,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Step — what one handled event asks of the run loop
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Continue,
    /// Submission was requested with unanswered questions; the operator
    /// confirms or cancels.
    NeedsConfirm { answered: usize, total: usize },
    /// The session finished and the result was stored.
    Finished(QuizResult),
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// App
// ════════════════════════════════════════════════════════════════════════════

pub struct App<S: QuizStore> {
    session: QuizSession,
    store: S,
    pub status: String,
}

impl<S: QuizStore> App<S> {
    pub fn new(store: S, cfg: &AppConfig) -> anyhow::Result<Self> {
        let quiz = store.quiz(cfg.quiz_id)?;
        let title = quiz.title.clone();
        let session = QuizSession::new(quiz, cfg.student_id)?;
        let app = App {
            session,
            store,
            status: format!("Quiz: {} - show fingers to answer", title),
        };
        app.announce_question();
        Ok(app)
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Print the current question and its options to the console.
    fn announce_question(&self) {
        let idx = self.session.current_index();
        let question = &self.session.quiz().questions[idx];
        println!("\nQuestion {}: {}", idx + 1, question.text);
        for (i, option) in question.options.iter().enumerate() {
            let mark = if self.session.selection() == Some(i) {
                " (selected)"
            } else {
                ""
            };
            println!("  {}. {}{}", i + 1, option, mark);
        }
    }

    // ── process one AppEvent ──────────────────────────────────────────────

    pub fn handle_event(&mut self, event: AppEvent) -> Step {
        match event {
            AppEvent::Gesture(evt) => match self.session.on_symbol(evt.symbol) {
                Ok(GestureOutcome::Selected {
                    question,
                    option,
                    advanced,
                }) => {
                    self.status = format!("Q{} answered: option {}", question + 1, option + 1);
                    if advanced {
                        self.announce_question();
                    } else {
                        self.status.push_str(" - all answered, open palm to submit");
                        println!("All questions answered — show an open palm to submit.");
                    }
                    Step::Continue
                }
                Ok(GestureOutcome::Submitted(result)) => self.finish(result),
                Ok(GestureOutcome::Ignored) => Step::Continue,
                Err(SessionError::Incomplete { answered, total }) => {
                    Step::NeedsConfirm { answered, total }
                }
                Err(SessionError::AlreadySubmitted) => {
                    self.status = "already submitted".to_string();
                    Step::Continue
                }
                Err(e) => {
                    log::warn!("gesture rejected: {}", e);
                    self.status = e.to_string();
                    Step::Continue
                }
            },

            AppEvent::Nav(nav) => {
                let moved = match nav {
                    NavEvent::Prev => self.session.prev_question(),
                    NavEvent::Next => self.session.next_question(),
                };
                match moved {
                    Ok(()) => {
                        self.status = format!("question {}", self.session.current_index() + 1);
                        self.announce_question();
                    }
                    Err(SessionError::AlreadySubmitted) => {
                        self.status = "already submitted".to_string();
                    }
                    Err(_) => {
                        // Out of range: stay put.
                        self.status = "no more questions that way".to_string();
                    }
                }
                Step::Continue
            }

            AppEvent::SourceClosed { reason } => {
                log::error!("frame source closed: {}", reason);
                self.status = format!("camera stopped: {}", reason);
                Step::Quit
            }

            AppEvent::Quit => Step::Quit,
        }
    }

    /// Force submission after the operator confirmed an incomplete quiz.
    pub fn confirm_submit(&mut self) -> Step {
        match self.session.submit_confirmed() {
            Ok(result) => self.finish(result),
            Err(e) => {
                self.status = e.to_string();
                Step::Continue
            }
        }
    }

    fn finish(&mut self, result: QuizResult) -> Step {
        if let Err(e) = self.store.append_result(&result) {
            log::error!("failed to store result: {}", e);
        }
        self.status = format!("FINAL SCORE {}/{}", result.score, result.total);
        println!(
            "\nQuiz complete! Final score: {}/{}",
            result.score, result.total
        );
        Step::Finished(result)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Creates the viewer, the gesture sources (keyboard simulation always;
/// the webcam pipeline with `--features camera`), and drives the
/// event/render loop at ~60 fps.
pub fn run<S: QuizStore>(store: S, cfg: AppConfig) -> anyhow::Result<()> {
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    let (tx, rx) = mpsc::channel::<AppEvent>();

    spawn_gesture_source(
        SimGestureSource {
            rx: sim_rx,
            gate: DebounceGate::new(cfg.cooldown),
        },
        tx.clone(),
    );

    #[cfg(feature = "camera")]
    let capture = {
        use crate::capture::CaptureConfig;
        use crate::hardware::{MediapipeEstimator, WebcamSource};

        let camera = WebcamSource::open(cfg.camera_index)?;
        let estimator = MediapipeEstimator::spawn(MediapipeEstimator::default_script())?;
        Some(crate::capture::spawn(
            camera,
            estimator,
            CaptureConfig {
                flip: cfg.flip,
                cooldown: cfg.cooldown,
                max_failures: 5,
            },
            tx.clone(),
        ))
    };
    #[cfg(not(feature = "camera"))]
    let capture: Option<crate::capture::CaptureHandle> = None;

    // The producers hold the only remaining senders.
    drop(tx);

    let mut vis = Viewer::new(sim_tx).map_err(anyhow::Error::msg)?;
    let mut app = App::new(store, &cfg)?;
    let mut latest_frame: Option<Frame> = None;

    'outer: while vis.is_open() {
        if !vis.poll_input() {
            break;
        }

        // Drain pending events without blocking the producers.
        loop {
            match rx.try_recv() {
                Ok(event) => match app.handle_event(event) {
                    Step::Continue | Step::Finished(_) => {}
                    Step::NeedsConfirm { answered, total } => {
                        if confirm_incomplete(answered, total) {
                            app.confirm_submit();
                        } else {
                            app.status = "submission cancelled".to_string();
                        }
                    }
                    Step::Quit => break 'outer,
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break 'outer,
            }
        }

        if let Some(handle) = &capture {
            if let Some(frame) = handle.latest_frame() {
                latest_frame = Some(frame);
            }
        }

        vis.render(latest_frame.as_ref(), app.session(), &app.status);
    }

    if let Some(handle) = capture {
        handle.stop();
    }
    Ok(())
}

/// Ask the operator whether to submit with unanswered questions.
fn confirm_incomplete(answered: usize, total: usize) -> bool {
    print!(
        "\nOnly {} of {} questions answered. Submit anyway? [y/N] ",
        answered, total
    );
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    matches!(buf.trim(), "y" | "Y" | "yes")
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::GestureEvent;
    use hand_model::GestureSymbol;
    use quiz_core::{MemoryStore, Quiz, SessionState};
    use std::time::Instant;

    fn make_app() -> App<MemoryStore> {
        let store = MemoryStore::with_quiz(Quiz::sample()).unwrap();
        App::new(store, &AppConfig::default()).unwrap()
    }

    fn gesture(symbol: GestureSymbol) -> AppEvent {
        AppEvent::Gesture(GestureEvent {
            symbol,
            at: Instant::now(),
        })
    }

    #[test]
    fn select_advances_to_next_question() {
        let mut app = make_app();
        let step = app.handle_event(gesture(GestureSymbol::Select(1)));
        assert_eq!(step, Step::Continue);
        assert_eq!(app.session().current_index(), 1);
        assert_eq!(app.session().selection_for(0), Some(0));
    }

    #[test]
    fn incomplete_submit_needs_confirmation() {
        let mut app = make_app();
        app.handle_event(gesture(GestureSymbol::Select(1)));
        let step = app.handle_event(gesture(GestureSymbol::Submit));
        assert_eq!(
            step,
            Step::NeedsConfirm {
                answered: 1,
                total: 3,
            }
        );
        // Nothing was finalized.
        assert_eq!(app.session().state(), SessionState::Browsing);
    }

    #[test]
    fn confirmed_submit_scores_and_stores() {
        let mut app = make_app();
        app.handle_event(gesture(GestureSymbol::Select(1))); // q1 correct
        app.handle_event(gesture(GestureSymbol::Submit));
        let step = app.confirm_submit();
        match step {
            Step::Finished(result) => {
                assert_eq!(result.score, 1);
                assert_eq!(result.total, 3);
            }
            other => panic!("expected Finished, got {:?}", other),
        }
        assert_eq!(app.store().results_for(1).len(), 1);
    }

    #[test]
    fn complete_run_finishes_without_confirmation() {
        let mut app = make_app();
        app.handle_event(gesture(GestureSymbol::Select(1))); // correct
        app.handle_event(gesture(GestureSymbol::Select(2))); // correct
        app.handle_event(gesture(GestureSymbol::Select(4))); // wrong
        let step = app.handle_event(gesture(GestureSymbol::Submit));
        match step {
            Step::Finished(result) => assert_eq!(result.score, 2),
            other => panic!("expected Finished, got {:?}", other),
        }
    }

    #[test]
    fn events_after_submission_are_rejected_without_change() {
        let mut app = make_app();
        app.confirm_submit();
        let before = app.store().results_for(1).len();
        assert_eq!(
            app.handle_event(gesture(GestureSymbol::Select(2))),
            Step::Continue
        );
        assert_eq!(app.handle_event(AppEvent::Nav(NavEvent::Next)), Step::Continue);
        assert_eq!(app.status, "already submitted");
        assert_eq!(app.store().results_for(1).len(), before);
        assert_eq!(app.session().answered_count(), 0);
    }

    #[test]
    fn nav_past_either_end_stays_put() {
        let mut app = make_app();
        app.handle_event(AppEvent::Nav(NavEvent::Prev));
        assert_eq!(app.session().current_index(), 0);
        app.handle_event(AppEvent::Nav(NavEvent::Next));
        app.handle_event(AppEvent::Nav(NavEvent::Next));
        app.handle_event(AppEvent::Nav(NavEvent::Next));
        assert_eq!(app.session().current_index(), 2);
    }

    #[test]
    fn source_closed_quits() {
        let mut app = make_app();
        let step = app.handle_event(AppEvent::SourceClosed {
            reason: "device unplugged".to_string(),
        });
        assert_eq!(step, Step::Quit);
        assert!(app.status.contains("device unplugged"));
    }

    #[test]
    fn quit_event_quits() {
        let mut app = make_app();
        assert_eq!(app.handle_event(AppEvent::Quit), Step::Quit);
    }

    #[test]
    fn none_gesture_changes_nothing() {
        let mut app = make_app();
        let step = app.handle_event(gesture(GestureSymbol::None));
        assert_eq!(step, Step::Continue);
        assert_eq!(app.session().answered_count(), 0);
        assert_eq!(app.session().current_index(), 0);
    }
}
