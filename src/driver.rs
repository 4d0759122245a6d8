//! Driver spawns and manages the batch import task

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::config::ImportOptions;
use crate::provider::{Document, DocumentProvider};
use crate::store::{TourIdentity, TourStore};
use crate::tcx::TcxReader;
use crate::types::{ImportMessage, Tour};

/// Capacity of the event channel between the import task and its consumer
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Progress reported by a running batch import
#[derive(Debug, Clone)]
pub enum ImportEvent {
    /// A new tour was stored
    TourImported { source: PathBuf, identity: String, tour: Arc<Tour> },
    /// The store already knew this tour
    TourSkipped { source: PathBuf, identity: String },
    /// The document decoded cleanly but held no valid data
    DocumentEmpty { source: PathBuf },
    /// The document could not be read or is not well-formed XML
    DocumentFailed { source: Option<PathBuf>, error: String },
    /// A decoder message for one document
    Message { source: PathBuf, message: ImportMessage },
    /// Last event of every run
    Finished(ImportSummary),
}

/// Totals of one batch import run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub documents: usize,
    pub imported: usize,
    pub skipped: usize,
    pub empty: usize,
    pub failed: usize,
    pub cancelled: bool,
}

/// Result of spawning the import task
pub struct DriverChannels {
    /// Receiver for import progress
    pub events: mpsc::Receiver<ImportEvent>,
    /// Cancellation token; honoured between documents only
    pub cancel: CancellationToken,
}

/// Driver spawns and manages the batch import task
///
/// The task owns the provider and decodes one document at a time on the blocking
/// pool. A document that has started decoding always runs to completion.
pub struct Driver;

impl Driver {
    /// Spawn the import task for `provider`.
    pub fn spawn<P>(
        provider: P,
        options: ImportOptions,
        store: Arc<dyn TourStore>,
        identity: Arc<dyn TourIdentity>,
    ) -> DriverChannels
    where
        P: DocumentProvider,
    {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();

        tokio::spawn(async move {
            let task = ImportTask { options, store, identity, events: event_tx };
            task.run(provider, cancel_task).await;
        });

        DriverChannels { events: event_rx, cancel }
    }
}

struct ImportTask {
    options: ImportOptions,
    store: Arc<dyn TourStore>,
    identity: Arc<dyn TourIdentity>,
    events: mpsc::Sender<ImportEvent>,
}

impl ImportTask {
    async fn run<P: DocumentProvider>(self, mut provider: P, cancel: CancellationToken) {
        info!("Import task started");
        let mut summary = ImportSummary::default();
        let mut error_count = 0u32;
        const MAX_ERRORS: u32 = 10;

        loop {
            // Check for cancellation between documents
            if cancel.is_cancelled() {
                info!("Import cancelled");
                summary.cancelled = true;
                break;
            }

            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Import cancelled while waiting for next document");
                    summary.cancelled = true;
                    break;
                }
                result = provider.next_document() => result,
            };

            match result {
                Ok(Some(document)) => {
                    error_count = 0;
                    summary.documents += 1;
                    if !self.import_document(document, &mut summary).await {
                        debug!("Event receiver dropped, shutting down");
                        return;
                    }
                }
                Ok(None) => {
                    info!("Provider exhausted after {} documents", summary.documents);
                    break;
                }
                Err(e) => {
                    error_count += 1;
                    summary.failed += 1;
                    error!("Provider error ({}/{}): {}", error_count, MAX_ERRORS, e);

                    let retryable = e.is_retryable();
                    let event = ImportEvent::DocumentFailed { source: None, error: e.to_string() };
                    if !self.emit(event).await {
                        return;
                    }

                    if error_count >= MAX_ERRORS {
                        error!("Too many provider errors, stopping import");
                        break;
                    }

                    if retryable {
                        // Exponential backoff: 50ms, 100ms, 200ms, ...
                        let backoff =
                            std::time::Duration::from_millis(50 * (1 << error_count.min(5)));
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
        }

        info!(?summary, "Import task ended");
        let _ = self.events.send(ImportEvent::Finished(summary)).await;
    }

    async fn emit(&self, event: ImportEvent) -> bool {
        self.events.send(event).await.is_ok()
    }

    /// Decode one document and report its tours. Returns `false` once nobody listens.
    async fn import_document(&self, document: Document, summary: &mut ImportSummary) -> bool {
        let Document { source, bytes } = document;
        let options = self.options.clone();
        let label = source.clone();

        let decoded = tokio::task::spawn_blocking(move || {
            TcxReader::from_bytes_with_path(bytes, label).decode(options)
        })
        .await;

        let output = match decoded {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(source = %source.display(), "Document failed: {}", e);
                summary.failed += 1;
                let event = ImportEvent::DocumentFailed { source: Some(source), error: e.to_string() };
                return self.emit(event).await;
            }
            Err(join) => {
                error!(source = %source.display(), "Decode task failed: {}", join);
                summary.failed += 1;
                let event =
                    ImportEvent::DocumentFailed { source: Some(source), error: join.to_string() };
                return self.emit(event).await;
            }
        };

        for message in output.messages.iter().cloned() {
            if !self.emit(ImportEvent::Message { source: source.clone(), message }).await {
                return false;
            }
        }

        if !output.has_valid_data() {
            summary.empty += 1;
            return self.emit(ImportEvent::DocumentEmpty { source }).await;
        }

        for tour in output.tours {
            let identity = self.identity.identity(&tour);
            let event = if self.store.contains(&identity) {
                trace!(%identity, "Tour already known");
                summary.skipped += 1;
                ImportEvent::TourSkipped { source: source.clone(), identity }
            } else {
                let tour = Arc::new(tour);
                if self.store.insert(identity.clone(), Arc::clone(&tour)) {
                    summary.imported += 1;
                    debug!(%identity, samples = tour.samples.len(), "Tour imported");
                    ImportEvent::TourImported { source: source.clone(), identity, tour }
                } else {
                    summary.skipped += 1;
                    ImportEvent::TourSkipped { source: source.clone(), identity }
                }
            };

            if !self.emit(event).await {
                return false;
            }
        }

        true
    }
}
