//! In-memory provider

use std::collections::VecDeque;
use tracing::trace;

use crate::Result;
use crate::provider::{Document, DocumentProvider};

/// Hands out documents already held in memory
#[derive(Debug, Default)]
pub struct MemoryProvider {
    documents: VecDeque<Document>,
}

impl MemoryProvider {
    pub fn new(documents: impl IntoIterator<Item = Document>) -> Self {
        Self { documents: documents.into_iter().collect() }
    }

    pub fn push(&mut self, document: Document) {
        self.documents.push_back(document);
    }
}

#[async_trait::async_trait]
impl DocumentProvider for MemoryProvider {
    async fn next_document(&mut self) -> Result<Option<Document>> {
        let document = self.documents.pop_front();
        if let Some(document) = &document {
            trace!(source = %document.source.display(), "Next in-memory document");
        }
        Ok(document)
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.documents.len())
    }
}
