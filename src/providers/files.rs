//! File provider reading TCX documents from disk

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::provider::{Document, DocumentProvider};
use crate::{ImportError, Result};

/// Hands out the contents of a list of files, in order
#[derive(Debug)]
pub struct FileProvider {
    pending: VecDeque<PathBuf>,
}

impl FileProvider {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let pending: VecDeque<PathBuf> = paths.into_iter().map(Into::into).collect();
        info!("File provider with {} documents", pending.len());
        Self { pending }
    }

    /// Every `*.tcx` file (case-insensitive extension) directly inside `dir`, sorted
    /// by name.
    pub async fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| ImportError::file_error(dir.to_path_buf(), e))?;

        let mut paths = Vec::new();
        while let Some(entry) =
            entries.next_entry().await.map_err(|e| ImportError::file_error(dir.to_path_buf(), e))?
        {
            let path = entry.path();
            let is_tcx = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("tcx"));
            if is_tcx {
                paths.push(path);
            }
        }

        paths.sort();
        debug!(dir = %dir.display(), found = paths.len(), "Scanned directory");
        Ok(Self::new(paths))
    }
}

#[async_trait::async_trait]
impl DocumentProvider for FileProvider {
    async fn next_document(&mut self) -> Result<Option<Document>> {
        let Some(path) = self.pending.pop_front() else {
            debug!("No more files");
            return Ok(None);
        };

        let bytes =
            tokio::fs::read(&path).await.map_err(|e| ImportError::file_error(path.clone(), e))?;
        debug!(path = %path.display(), bytes = bytes.len(), "Read document");

        Ok(Some(Document { source: path, bytes }))
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.pending.len())
    }
}
