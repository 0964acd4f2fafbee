//! Context selection: which chunk goes into the prompt for a given query.

use docqa_shared::{DocQaError, Result};

use crate::chunker::Chunk;

/// Strategy for picking the context chunk for a query.
///
/// Implementations must be pure and must succeed for any non-empty chunk
/// slice; an empty slice is rejected with `InvalidInput`.
pub trait RelevanceSelector: Send + Sync {
    /// Pick the chunk to use as context for `query`.
    fn select<'c, 'a>(&self, chunks: &'c [Chunk<'a>], query: &str) -> Result<&'c Chunk<'a>>;

    /// Human-readable strategy name for tracing.
    fn name(&self) -> &str;
}

/// Always uses the opening chunk, whatever the query.
///
/// Placeholder until a similarity-based strategy exists; documents whose
/// relevant passage sits past the first window get answers from the opening
/// text only.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstChunk;

impl RelevanceSelector for FirstChunk {
    fn select<'c, 'a>(&self, chunks: &'c [Chunk<'a>], _query: &str) -> Result<&'c Chunk<'a>> {
        chunks
            .first()
            .ok_or_else(|| DocQaError::invalid_input("no chunks to select context from"))
    }

    fn name(&self) -> &str {
        "first-chunk"
    }
}
