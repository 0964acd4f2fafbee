//! Process-memory document store.
//!
//! Documents are keyed by a time-sortable [`DocId`] and live until removed or
//! the process exits. There is no eviction and nothing is written to disk.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use docqa_shared::{DocId, Document, DocumentSummary, Result};

/// Thread-safe map of loaded documents.
#[derive(Debug, Default)]
pub struct DocumentStore {
    docs: RwLock<HashMap<DocId, Arc<Document>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store normalized text under a fresh id.
    pub fn insert(&self, file_name: &str, text: impl Into<String>) -> Result<Arc<Document>> {
        let doc = Arc::new(Document::new(file_name, text)?);
        self.docs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(doc.id(), Arc::clone(&doc));

        info!(id = %doc.id(), file_name, chars = doc.summary().chars, "document stored");
        Ok(doc)
    }

    pub fn get(&self, id: &DocId) -> Option<Arc<Document>> {
        let doc = self
            .docs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned();
        if doc.is_none() {
            debug!(%id, "document not found");
        }
        doc
    }

    pub fn remove(&self, id: &DocId) -> Option<Arc<Document>> {
        self.docs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    /// Stored documents, oldest first.
    pub fn list(&self) -> Vec<DocumentSummary> {
        let mut summaries: Vec<DocumentSummary> = self
            .docs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|doc| doc.summary())
            .collect();
        summaries.sort_by_key(|s| s.id);
        summaries
    }

    pub fn len(&self) -> usize {
        self.docs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
