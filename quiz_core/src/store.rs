//! Quiz/result store boundary.
//!
//! The session controller never touches storage directly; everything goes
//! through [`QuizStore`].  Two implementations ship in-tree: an in-memory
//! store for tests and demos and a flat JSON-file store.  Results are
//! append-only in both.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::quiz::{Quiz, QuizError};
use crate::session::QuizResult;

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no quiz with id {0}")]
    UnknownQuiz(u32),

    #[error(transparent)]
    InvalidQuiz(#[from] QuizError),

    #[error("store i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("store decode: {0}")]
    Decode(#[from] serde_json::Error),
}

// ════════════════════════════════════════════════════════════════════════════
// QuizStore trait
// ════════════════════════════════════════════════════════════════════════════

/// Read access to quizzes, append access to results.
pub trait QuizStore {
    fn quiz(&self, id: u32) -> Result<Quiz, StoreError>;

    /// `(id, title)` pairs of every stored quiz, in id order.
    fn list(&self) -> Vec<(u32, String)>;

    fn append_result(&mut self, result: &QuizResult) -> Result<(), StoreError>;

    fn results_for(&self, student_id: u32) -> Vec<QuizResult>;
}

// ════════════════════════════════════════════════════════════════════════════
// MemoryStore
// ════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct MemoryStore {
    quizzes: BTreeMap<u32, Quiz>,
    results: Vec<QuizResult>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn with_quiz(quiz: Quiz) -> Result<Self, StoreError> {
        let mut store = MemoryStore::new();
        store.add_quiz(quiz)?;
        Ok(store)
    }

    pub fn add_quiz(&mut self, quiz: Quiz) -> Result<(), StoreError> {
        quiz.validate()?;
        self.quizzes.insert(quiz.id, quiz);
        Ok(())
    }
}

impl QuizStore for MemoryStore {
    fn quiz(&self, id: u32) -> Result<Quiz, StoreError> {
        self.quizzes
            .get(&id)
            .cloned()
            .ok_or(StoreError::UnknownQuiz(id))
    }

    fn list(&self) -> Vec<(u32, String)> {
        self.quizzes
            .values()
            .map(|q| (q.id, q.title.clone()))
            .collect()
    }

    fn append_result(&mut self, result: &QuizResult) -> Result<(), StoreError> {
        self.results.push(result.clone());
        Ok(())
    }

    fn results_for(&self, student_id: u32) -> Vec<QuizResult> {
        self.results
            .iter()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// JsonStore
// ════════════════════════════════════════════════════════════════════════════

/// On-disk layout of a [`JsonStore`] file.
#[derive(Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    quizzes: Vec<Quiz>,
    #[serde(default)]
    results: Vec<QuizResult>,
}

/// A single JSON file holding quizzes and an append-only result list.
/// Small-scale by intent; the store boundary is what matters, not the
/// engine behind it.
pub struct JsonStore {
    path: PathBuf,
    data: StoreFile,
}

impl JsonStore {
    /// Open a store file, creating an empty one if the path is absent.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let data = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreFile::default(),
            Err(e) => return Err(e.into()),
        };
        for quiz in &data.quizzes {
            quiz.validate()?;
        }
        Ok(JsonStore { path, data })
    }

    pub fn add_quiz(&mut self, quiz: Quiz) -> Result<(), StoreError> {
        quiz.validate()?;
        self.data.quizzes.retain(|q| q.id != quiz.id);
        self.data.quizzes.push(quiz);
        self.data.quizzes.sort_by_key(|q| q.id);
        self.flush()
    }

    fn flush(&self) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl QuizStore for JsonStore {
    fn quiz(&self, id: u32) -> Result<Quiz, StoreError> {
        self.data
            .quizzes
            .iter()
            .find(|q| q.id == id)
            .cloned()
            .ok_or(StoreError::UnknownQuiz(id))
    }

    fn list(&self) -> Vec<(u32, String)> {
        self.data
            .quizzes
            .iter()
            .map(|q| (q.id, q.title.clone()))
            .collect()
    }

    fn append_result(&mut self, result: &QuizResult) -> Result<(), StoreError> {
        self.data.results.push(result.clone());
        self.flush()
    }

    fn results_for(&self, student_id: u32) -> Vec<QuizResult> {
        self.data
            .results
            .iter()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
