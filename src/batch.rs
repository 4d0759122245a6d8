//! Batch import handle

use futures::Stream;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ImportOptions;
use crate::driver::{Driver, ImportEvent, ImportSummary};
use crate::provider::DocumentProvider;
use crate::providers::FileProvider;
use crate::store::{TourIdentity, TourStore};
use crate::{ImportError, Result};

/// A running batch import.
///
/// Dropping the handle cancels the import after the document currently being
/// decoded.
pub struct BatchImport {
    events: Option<mpsc::Receiver<ImportEvent>>,
    cancel: CancellationToken,
}

impl BatchImport {
    /// Start importing every document `provider` hands out.
    pub fn start<P>(
        provider: P,
        options: ImportOptions,
        store: Arc<dyn TourStore>,
        identity: Arc<dyn TourIdentity>,
    ) -> Self
    where
        P: DocumentProvider,
    {
        let channels = Driver::spawn(provider, options, store, identity);
        Self { events: Some(channels.events), cancel: channels.cancel }
    }

    /// Start importing every `.tcx` file in `dir`.
    pub async fn from_dir<P: AsRef<Path>>(
        dir: P,
        options: ImportOptions,
        store: Arc<dyn TourStore>,
        identity: Arc<dyn TourIdentity>,
    ) -> Result<Self> {
        let provider = FileProvider::from_dir(dir.as_ref()).await?;
        info!("Batch import of {}", dir.as_ref().display());
        Ok(Self::start(provider, options, store, identity))
    }

    /// Next progress event, `None` once the import task is gone.
    pub async fn next_event(&mut self) -> Option<ImportEvent> {
        self.events.as_mut()?.recv().await
    }

    /// Progress events as a stream. Can be taken once; the handle keeps control
    /// of cancellation.
    pub fn events(&mut self) -> impl Stream<Item = ImportEvent> + 'static {
        let receiver = self.events.take().unwrap_or_else(|| mpsc::channel(1).1);
        ReceiverStream::new(receiver)
    }

    /// Stop after the document currently being decoded.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Drain all events and return the final summary.
    pub async fn finish(mut self) -> Result<ImportSummary> {
        while let Some(event) = self.next_event().await {
            if let ImportEvent::Finished(summary) = event {
                return Ok(summary);
            }
        }
        Err(ImportError::Cancelled)
    }
}

impl Drop for BatchImport {
    fn drop(&mut self) {
        debug!("Dropping batch import");
        self.cancel.cancel();
    }
}
