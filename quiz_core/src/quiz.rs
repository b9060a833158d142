//! Quiz data model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("question {question} has no options")]
    NoOptions { question: usize },

    #[error("question {question}: correct index {correct} out of range (have {options} options)")]
    CorrectOutOfRange {
        question: usize,
        correct: usize,
        options: usize,
    },
}

// ════════════════════════════════════════════════════════════════════════════
// Question / Quiz
// ════════════════════════════════════════════════════════════════════════════

/// One multiple-choice question.  Options are identified by their index.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub options: Vec<String>,
    /// 0-based index of the correct option.
    pub correct: usize,
}

impl Question {
    pub fn new(text: &str, options: &[&str], correct: usize) -> Self {
        Question {
            text: text.to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct,
        }
    }
}

/// An ordered sequence of questions.  Read-only input to the session
/// controller; ownership stays with the store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Quiz {
    pub id: u32,
    pub title: String,
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn new(id: u32, title: &str, questions: Vec<Question>) -> Self {
        Quiz {
            id,
            title: title.to_string(),
            questions,
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Check structural invariants: every question has at least one option
    /// and its correct index points inside the option list.
    pub fn validate(&self) -> Result<(), QuizError> {
        for (i, q) in self.questions.iter().enumerate() {
            if q.options.is_empty() {
                return Err(QuizError::NoOptions { question: i });
            }
            if q.correct >= q.options.len() {
                return Err(QuizError::CorrectOutOfRange {
                    question: i,
                    correct: q.correct,
                    options: q.options.len(),
                });
            }
        }
        Ok(())
    }

    /// A small built-in quiz, used when no quiz file is supplied.
    pub fn sample() -> Self {
        Quiz::new(
            1,
            "General knowledge",
            vec![
                Question::new(
                    "What is the capital of France?",
                    &["Paris", "Berlin", "Madrid", "Rome"],
                    0,
                ),
                Question::new(
                    "Which planet is known as the Red Planet?",
                    &["Earth", "Mars", "Jupiter", "Venus"],
                    1,
                ),
                Question::new(
                    "Who wrote 'Hamlet'?",
                    &["Shakespeare", "Dickens", "Austen", "Hemingway"],
                    0,
                ),
            ],
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
