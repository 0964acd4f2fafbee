//! Shared types, error model, and configuration for DocQA.
//!
//! This crate is the foundation depended on by all other DocQA crates.
//! It provides:
//! - [`DocQaError`] — the unified error type
//! - Domain types ([`DocId`], [`Document`], [`Answer`], [`Evaluation`], [`EvaluationOutcome`])
//! - Configuration ([`AppConfig`], [`QaConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, OpenRouterConfig, QaConfig, config_dir, config_file_path, init_config,
    init_config_at, load_config, load_config_from, validate_api_key,
};
pub use error::{DocQaError, Result};
pub use types::{
    Answer, DocId, Document, DocumentSummary, EvaluatedAnswer, Evaluation, EvaluationOutcome,
    INVALID_QUESTION_MESSAGE, InvalidQuestion, MIN_DOCUMENT_CHARS, Question,
};
