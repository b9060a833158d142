//! # quiz_core
//!
//! Multiple-choice quiz model and the gesture-driven session controller.
//!
//! A [`Quiz`] is an ordered list of questions, each with an ordered option
//! list and a correct-option index.  A [`QuizSession`] consumes gesture
//! symbols (and explicit navigation) to build up a partial selection map,
//! and finalizes into an immutable [`QuizResult`] on submission.
//!
//! Quizzes and results live behind the [`QuizStore`] boundary; the
//! in-tree implementations are an in-memory store for tests and demos and
//! a flat JSON-file store.

pub mod quiz;
pub mod session;
pub mod store;

pub use quiz::{Question, Quiz, QuizError};
pub use session::{GestureOutcome, QuizResult, QuizSession, SessionError, SessionState};
pub use store::{JsonStore, MemoryStore, QuizStore, StoreError};
