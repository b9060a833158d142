//! The quiz session controller.
//!
//! A [`QuizSession`] is created when a student starts a quiz, mutated by
//! gesture symbols and explicit navigation, and finalized exactly once
//! into a [`QuizResult`].  All gesture noise has been removed upstream by
//! the debounce gate; this layer only sees discrete, accepted symbols.

use std::collections::BTreeMap;

use hand_model::GestureSymbol;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::quiz::{Quiz, QuizError};

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("quiz has no questions")]
    EmptyQuiz,

    #[error(transparent)]
    InvalidQuiz(#[from] QuizError),

    #[error("question index {idx} out of range (quiz has {len} questions)")]
    IndexOutOfRange { idx: usize, len: usize },

    #[error("option index {option} out of range (question has {options} options)")]
    OptionOutOfRange { option: usize, options: usize },

    /// Recoverable: fewer questions answered than exist.  The caller
    /// decides whether to proceed via [`QuizSession::submit_confirmed`].
    #[error("only {answered} of {total} questions answered")]
    Incomplete { answered: usize, total: usize },

    #[error("session already submitted")]
    AlreadySubmitted,
}

// ════════════════════════════════════════════════════════════════════════════
// QuizResult
// ════════════════════════════════════════════════════════════════════════════

/// The finalized outcome of one submission.  Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub student_id: u32,
    pub quiz_id: u32,
    pub score: usize,
    pub total: usize,
}

// ════════════════════════════════════════════════════════════════════════════
// Session state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Navigating and answering.
    Browsing,
    /// The last question was answered; waiting for an open palm.
    SubmissionReady,
    /// Terminal: a result has been produced.
    Submitted,
}

/// What a single accepted gesture did to the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Option `option` stored for question `question`; `advanced` tells
    /// whether the session moved on to the next question.
    Selected {
        question: usize,
        option: usize,
        advanced: bool,
    },
    /// Open palm completed the quiz.
    Submitted(QuizResult),
    /// The symbol was `None`.
    Ignored,
}

// ════════════════════════════════════════════════════════════════════════════
// QuizSession
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct QuizSession {
    quiz: Quiz,
    student_id: u32,
    current: usize,
    /// question index → selected option index.  Partial by design.
    selections: BTreeMap<usize, usize>,
    state: SessionState,
    result: Option<QuizResult>,
}

impl QuizSession {
    /// Start a session.  A quiz with zero questions is rejected here —
    /// there is nothing to answer and nothing meaningful to score.
    pub fn new(quiz: Quiz, student_id: u32) -> Result<Self, SessionError> {
        if quiz.is_empty() {
            return Err(SessionError::EmptyQuiz);
        }
        quiz.validate()?;
        Ok(QuizSession {
            quiz,
            student_id,
            current: 0,
            selections: BTreeMap::new(),
            state: SessionState::Browsing,
            result: None,
        })
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The stored selection for the current question, if any.
    pub fn selection(&self) -> Option<usize> {
        self.selections.get(&self.current).copied()
    }

    pub fn selection_for(&self, idx: usize) -> Option<usize> {
        self.selections.get(&idx).copied()
    }

    pub fn answered_count(&self) -> usize {
        self.selections.len()
    }

    /// The result, once submitted.
    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    // ── navigation ────────────────────────────────────────────────────────

    /// Jump to question `idx`.  Out of range leaves the current index
    /// unchanged and reports the usage error.
    pub fn display(&mut self, idx: usize) -> Result<(), SessionError> {
        self.reject_if_submitted()?;
        if idx >= self.quiz.len() {
            return Err(SessionError::IndexOutOfRange {
                idx,
                len: self.quiz.len(),
            });
        }
        self.current = idx;
        Ok(())
    }

    pub fn next_question(&mut self) -> Result<(), SessionError> {
        let idx = self.current + 1;
        self.display(idx)
    }

    pub fn prev_question(&mut self) -> Result<(), SessionError> {
        self.reject_if_submitted()?;
        let idx = self
            .current
            .checked_sub(1)
            .ok_or(SessionError::IndexOutOfRange {
                idx: usize::MAX,
                len: self.quiz.len(),
            })?;
        self.display(idx)
    }

    // ── answering ─────────────────────────────────────────────────────────

    /// Store `option` (0-based) for the current question, then advance to
    /// the next question if one exists, else flag the session as ready to
    /// submit.
    pub fn select_option(&mut self, option: usize) -> Result<GestureOutcome, SessionError> {
        self.reject_if_submitted()?;
        let question = self.current;
        let options = self.quiz.questions[question].options.len();
        if option >= options {
            return Err(SessionError::OptionOutOfRange { option, options });
        }

        self.selections.insert(question, option);
        log::debug!("question {} → option {}", question, option);

        let advanced = if question + 1 < self.quiz.len() {
            self.current = question + 1;
            true
        } else {
            self.state = SessionState::SubmissionReady;
            false
        };
        Ok(GestureOutcome::Selected {
            question,
            option,
            advanced,
        })
    }

    /// Apply one accepted gesture symbol.
    ///
    /// `Select(k)` stores option `k − 1` for the current question; an
    /// open palm triggers submission immediately, surfacing
    /// [`SessionError::Incomplete`] when questions remain unanswered.
    pub fn on_symbol(&mut self, symbol: GestureSymbol) -> Result<GestureOutcome, SessionError> {
        self.reject_if_submitted()?;
        match symbol {
            GestureSymbol::Select(n) if n >= 1 => self.select_option(n as usize - 1),
            // Select(0) is not a recognizable combination; drop it like None.
            GestureSymbol::Select(_) | GestureSymbol::None => Ok(GestureOutcome::Ignored),
            GestureSymbol::Submit => self.submit().map(GestureOutcome::Submitted),
        }
    }

    // ── submission ────────────────────────────────────────────────────────

    /// Finalize the session.  If not every question has a stored
    /// selection this returns [`SessionError::Incomplete`] without
    /// changing any state — the caller confirms via
    /// [`QuizSession::submit_confirmed`].
    pub fn submit(&mut self) -> Result<QuizResult, SessionError> {
        self.reject_if_submitted()?;
        let answered = self.selections.len();
        let total = self.quiz.len();
        if answered < total {
            return Err(SessionError::Incomplete { answered, total });
        }
        Ok(self.finalize())
    }

    /// Finalize even with unanswered questions (they score zero).
    pub fn submit_confirmed(&mut self) -> Result<QuizResult, SessionError> {
        self.reject_if_submitted()?;
        Ok(self.finalize())
    }

    fn finalize(&mut self) -> QuizResult {
        let score = self
            .quiz
            .questions
            .iter()
            .enumerate()
            .filter(|(i, q)| self.selections.get(i) == Some(&q.correct))
            .count();
        let result = QuizResult {
            student_id: self.student_id,
            quiz_id: self.quiz.id,
            score,
            total: self.quiz.len(),
        };
        log::info!(
            "quiz {} submitted by student {}: {}/{}",
            result.quiz_id,
            result.student_id,
            result.score,
            result.total
        );
        self.state = SessionState::Submitted;
        self.result = Some(result.clone());
        result
    }

    fn reject_if_submitted(&self) -> Result<(), SessionError> {
        if self.state == SessionState::Submitted {
            Err(SessionError::AlreadySubmitted)
        } else {
            Ok(())
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::Question;

    fn three_question_quiz() -> Quiz {
        Quiz::new(
            9,
            "test",
            vec![
                Question::new("q1", &["a", "b", "c", "d"], 0),
                Question::new("q2", &["a", "b", "c", "d"], 1),
                Question::new("q3", &["a", "b", "c", "d"], 2),
            ],
        )
    }

    fn session() -> QuizSession {
        QuizSession::new(three_question_quiz(), 42).unwrap()
    }

    #[test]
    fn empty_quiz_rejected_at_construction() {
        let err = QuizSession::new(Quiz::new(1, "empty", vec![]), 42).unwrap_err();
        assert_eq!(err, SessionError::EmptyQuiz);
    }

    #[test]
    fn invalid_quiz_rejected_at_construction() {
        let quiz = Quiz::new(1, "bad", vec![Question::new("q", &["a"], 3)]);
        assert!(matches!(
            QuizSession::new(quiz, 42),
            Err(SessionError::InvalidQuiz(_))
        ));
    }

    #[test]
    fn display_out_of_range_is_a_noop() {
        let mut s = session();
        s.display(1).unwrap();
        let err = s.display(3).unwrap_err();
        assert_eq!(err, SessionError::IndexOutOfRange { idx: 3, len: 3 });
        assert_eq!(s.current_index(), 1);
    }

    #[test]
    fn prev_below_zero_is_a_noop() {
        let mut s = session();
        assert!(s.prev_question().is_err());
        assert_eq!(s.current_index(), 0);
    }

    #[test]
    fn display_reflects_stored_selection() {
        let mut s = session();
        s.select_option(2).unwrap();
        assert_eq!(s.current_index(), 1);
        s.display(0).unwrap();
        assert_eq!(s.selection(), Some(2));
    }

    #[test]
    fn select_gesture_roundtrips_zero_based() {
        let mut s = session();
        s.on_symbol(GestureSymbol::Select(3)).unwrap();
        assert_eq!(s.selection_for(0), Some(2));
    }

    #[test]
    fn select_advances_until_last_question() {
        let mut s = session();
        assert_eq!(
            s.on_symbol(GestureSymbol::Select(1)).unwrap(),
            GestureOutcome::Selected {
                question: 0,
                option: 0,
                advanced: true,
            }
        );
        s.on_symbol(GestureSymbol::Select(1)).unwrap();
        let last = s.on_symbol(GestureSymbol::Select(1)).unwrap();
        assert_eq!(
            last,
            GestureOutcome::Selected {
                question: 2,
                option: 0,
                advanced: false,
            }
        );
        assert_eq!(s.state(), SessionState::SubmissionReady);
    }

    #[test]
    fn option_out_of_range_rejected() {
        let mut s = session();
        let err = s.select_option(4).unwrap_err();
        assert_eq!(
            err,
            SessionError::OptionOutOfRange {
                option: 4,
                options: 4,
            }
        );
        assert_eq!(s.selection(), None);
    }

    #[test]
    fn none_symbol_is_ignored() {
        let mut s = session();
        assert_eq!(
            s.on_symbol(GestureSymbol::None).unwrap(),
            GestureOutcome::Ignored
        );
        assert_eq!(s.answered_count(), 0);
    }

    #[test]
    fn incomplete_submit_is_recoverable() {
        let mut s = session();
        s.select_option(0).unwrap();
        let err = s.submit().unwrap_err();
        assert_eq!(
            err,
            SessionError::Incomplete {
                answered: 1,
                total: 3,
            }
        );
        // Nothing changed; the caller may confirm or keep answering.
        assert_eq!(s.state(), SessionState::Browsing);
        assert_eq!(s.answered_count(), 1);
    }

    #[test]
    fn partial_score_counts_only_correct_answers() {
        // Q1 correct, Q2 wrong, Q3 unanswered → 1/3.
        let mut s = session();
        s.select_option(0).unwrap(); // q1: correct (0)
        s.select_option(0).unwrap(); // q2: wrong (correct is 1)
        let result = s.submit_confirmed().unwrap();
        assert_eq!(result.score, 1);
        assert_eq!(result.total, 3);
        assert_eq!(result.student_id, 42);
        assert_eq!(result.quiz_id, 9);
    }

    #[test]
    fn full_correct_run_scores_everything() {
        let mut s = session();
        s.on_symbol(GestureSymbol::Select(1)).unwrap();
        s.on_symbol(GestureSymbol::Select(2)).unwrap();
        s.on_symbol(GestureSymbol::Select(3)).unwrap();
        let result = match s.on_symbol(GestureSymbol::Submit).unwrap() {
            GestureOutcome::Submitted(r) => r,
            other => panic!("expected submission, got {:?}", other),
        };
        assert_eq!(result.score, 3);
        assert_eq!(s.state(), SessionState::Submitted);
    }

    #[test]
    fn submitted_session_rejects_everything() {
        let mut s = session();
        let result = s.submit_confirmed().unwrap();
        assert_eq!(result.score, 0);

        assert_eq!(
            s.on_symbol(GestureSymbol::Select(1)),
            Err(SessionError::AlreadySubmitted)
        );
        assert_eq!(s.display(0), Err(SessionError::AlreadySubmitted));
        assert_eq!(s.submit(), Err(SessionError::AlreadySubmitted));
        assert_eq!(s.submit_confirmed(), Err(SessionError::AlreadySubmitted));

        // Score and selections untouched by the rejected calls.
        assert_eq!(s.result(), Some(&result));
        assert_eq!(s.answered_count(), 0);
    }

    #[test]
    fn selections_never_leave_the_question_set() {
        let mut s = session();
        for _ in 0..5 {
            let _ = s.on_symbol(GestureSymbol::Select(4));
        }
        for (&q, &opt) in s.selections.iter() {
            assert!(q < s.quiz.len());
            assert!(opt < s.quiz.questions[q].options.len());
        }
    }
}
