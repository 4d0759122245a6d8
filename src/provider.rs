//! Provider trait for document sources

use std::path::PathBuf;

use crate::Result;

/// One undecoded document and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub source: PathBuf,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(source: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        Self { source: source.into(), bytes: bytes.into() }
    }
}

/// Trait for batch import sources
///
/// Providers abstract over where documents come from (a list of files, memory,
/// a network share) and hand them out one at a time. The batch driver decodes each
/// document completely before asking for the next one.
#[async_trait::async_trait]
pub trait DocumentProvider: Send + 'static {
    /// Get the next document
    ///
    /// Returns:
    /// - `Ok(Some(document))` - Next document available
    /// - `Ok(None)` - No more documents (normal termination)
    /// - `Err(e)` - This document could not be fetched; later ones may still be
    async fn next_document(&mut self) -> Result<Option<Document>>;

    /// Documents still to come, when known
    fn remaining(&self) -> Option<usize> {
        None
    }
}
