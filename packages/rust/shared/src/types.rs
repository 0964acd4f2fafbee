//! Core domain types for DocQA documents and QA results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DocQaError, Result};

/// Minimum normalized document length, in characters.
pub const MIN_DOCUMENT_CHARS: usize = 10;

/// Error message returned as data when an evaluated question index is unknown.
pub const INVALID_QUESTION_MESSAGE: &str = "Invalid question ID";

// ---------------------------------------------------------------------------
// DocId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for document identifiers (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(pub Uuid);

impl DocId {
    /// Generate a new time-sortable document identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for DocId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DocId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A loaded document: normalized text plus where it came from.
///
/// Immutable once created; chunks are derived from `text` on demand.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    id: DocId,
    file_name: String,
    text: String,
    loaded_at: DateTime<Utc>,
}

impl Document {
    /// Create a document from already-normalized text.
    ///
    /// Rejects text shorter than [`MIN_DOCUMENT_CHARS`] characters.
    pub fn new(file_name: impl Into<String>, text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let chars = text.chars().count();
        if chars < MIN_DOCUMENT_CHARS {
            return Err(DocQaError::validation(format!(
                "document contains insufficient text for processing ({chars} chars, need {MIN_DOCUMENT_CHARS})"
            )));
        }

        Ok(Self {
            id: DocId::new(),
            file_name: file_name.into(),
            text,
            loaded_at: Utc::now(),
        })
    }

    pub fn id(&self) -> DocId {
        self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Lightweight listing view.
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id,
            file_name: self.file_name.clone(),
            chars: self.text.chars().count(),
            loaded_at: self.loaded_at,
        }
    }
}

/// Listing entry for a stored document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocId,
    pub file_name: String,
    /// Normalized text length in characters.
    pub chars: usize,
    pub loaded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// A generated comprehension question and its 0-based position in the set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub index: usize,
    pub text: String,
}

impl Question {
    /// Number a generated question list in generation order.
    pub fn numbered(questions: Vec<String>) -> Vec<Question> {
        questions
            .into_iter()
            .enumerate()
            .map(|(index, text)| Question { index, text })
            .collect()
    }

    /// User-facing label (`Q1`, `Q2`, ...).
    pub fn label(&self) -> String {
        format!("Q{}", self.index + 1)
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Parsed answer to a free-form question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub support: String,
}

/// Parsed grading of a user's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// 0 when the generator gave no usable score, otherwise 1-5.
    pub score: u8,
    pub evaluation: String,
    pub ideal_answer: String,
}

/// A graded answer together with the question it answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatedAnswer {
    pub question: String,
    pub user_answer: String,
    pub evaluation: Evaluation,
}

/// The "unknown question index" record, reported as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidQuestion {
    pub error: String,
}

impl Default for InvalidQuestion {
    fn default() -> Self {
        Self {
            error: INVALID_QUESTION_MESSAGE.to_string(),
        }
    }
}

/// Result of evaluating an answer by question index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EvaluationOutcome {
    Evaluated(EvaluatedAnswer),
    InvalidQuestion(InvalidQuestion),
}

impl EvaluationOutcome {
    pub fn invalid_question() -> Self {
        Self::InvalidQuestion(InvalidQuestion::default())
    }

    pub fn evaluated(&self) -> Option<&EvaluatedAnswer> {
        match self {
            Self::Evaluated(evaluated) => Some(evaluated),
            Self::InvalidQuestion(_) => None,
        }
    }
}
