//! Document question-answering engine for DocQA.
//!
//! This crate turns document text into context windows, renders prompts,
//! calls a [`TextGenerator`], and parses the free-text responses:
//! - [`chunker`] — fixed-size, non-overlapping windows
//! - [`relevance`] — pluggable context selection
//! - [`prompt`] — summary / answer / question / evaluation templates
//! - [`parser`] — no-fail parsing of labeled responses
//! - [`orchestrator`] — the four public operations
//! - [`store`] — in-memory document store

pub mod chunker;
pub mod generator;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod relevance;
pub mod store;

pub use chunker::{Chunk, DEFAULT_CHUNK_SIZE, split};
pub use generator::TextGenerator;
pub use orchestrator::{DEFAULT_QUESTION_COUNT, QaOrchestrator};
pub use relevance::{FirstChunk, RelevanceSelector};
pub use store::DocumentStore;
