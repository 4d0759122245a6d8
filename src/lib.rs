//! Streaming decoder and repair pipeline for Training Center (TCX) activity files.
//!
//! tcxtour reads Garmin Training Center documents in both schema versions and
//! reconstructs chronologically ordered tours from them, without building a
//! document tree.
//!
//! # Features
//!
//! - **One state machine, two grammars**: v1 (`History`/`Course`) and v2
//!   (`Activity`/`Course`) documents share all leaf handling
//! - **Repair**: duplicate timestamps, per-lap distance resets and the 2007-04-01
//!   device clock bug are fixed before a tour is emitted
//! - **Pause inference**: idle periods are recovered from time-only trackpoints and
//!   gaps between track segments
//! - **Batch import**: async, cancellable between documents, with duplicate
//!   detection through a pluggable store
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tcxtour::{ImportOptions, TcxImport};
//!
//! fn main() -> tcxtour::Result<()> {
//!     let output = TcxImport::decode_file("morning_ride.tcx", ImportOptions::default())?;
//!
//!     for tour in &output.tours {
//!         println!(
//!             "{} {:?}: {} samples, {} pauses",
//!             tour.start_time,
//!             tour.sport,
//!             tour.samples.len(),
//!             tour.pauses.len()
//!         );
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Example (batch import)
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tcxtour::{ImportEvent, ImportOptions, InMemoryStore, StartTimeIdentity, TcxImport};
//!
//! #[tokio::main]
//! async fn main() -> tcxtour::Result<()> {
//!     let store = Arc::new(InMemoryStore::new());
//!     let mut batch = TcxImport::directory(
//!         "exports/",
//!         ImportOptions::default(),
//!         store,
//!         Arc::new(StartTimeIdentity),
//!     )
//!     .await?;
//!
//!     while let Some(event) = batch.next_event().await {
//!         if let ImportEvent::Finished(summary) = event {
//!             println!("{} imported, {} skipped", summary.imported, summary.skipped);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod config;
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Decoding
pub mod decode;
pub mod tcx;

// Batch import
pub mod batch;
pub mod driver;
pub mod provider;
pub mod providers;
pub mod store;

// Core exports
pub use config::ImportOptions;
pub use error::*;
pub use types::*;

pub use decode::{DecodeOutput, EventSink, TcxDecoder};
pub use tcx::TcxReader;

pub use batch::BatchImport;
pub use driver::{ImportEvent, ImportSummary};
pub use provider::{Document, DocumentProvider};
pub use providers::{FileProvider, MemoryProvider};
pub use store::{InMemoryStore, StartTimeIdentity, TourIdentity, TourStore};

use std::path::Path;
use std::sync::Arc;

/// Unified entry point for TCX imports.
///
/// # Examples
///
/// ## Single document
/// ```rust
/// use tcxtour::{ImportOptions, TcxImport};
///
/// let xml = r#"<TrainingCenterDatabase xmlns="http://example.com/not-tcx"/>"#;
/// let output = TcxImport::decode_bytes(xml, ImportOptions::default()).unwrap();
/// assert!(!output.has_valid_data());
/// ```
pub struct TcxImport;

impl TcxImport {
    /// Decode one TCX file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not well-formed XML.
    /// Everything else (unknown schema, empty activities, bad timestamps) is
    /// reported in [`DecodeOutput::messages`].
    pub fn decode_file<P: AsRef<Path>>(path: P, options: ImportOptions) -> Result<DecodeOutput> {
        TcxReader::open(path)?.decode(options)
    }

    /// Decode one in-memory TCX document.
    pub fn decode_bytes(data: impl Into<Vec<u8>>, options: ImportOptions) -> Result<DecodeOutput> {
        TcxReader::from_bytes(data).decode(options)
    }

    /// Import every document of `provider` into `store`.
    pub fn batch<P: DocumentProvider>(
        provider: P,
        options: ImportOptions,
        store: Arc<dyn TourStore>,
        identity: Arc<dyn TourIdentity>,
    ) -> BatchImport {
        BatchImport::start(provider, options, store, identity)
    }

    /// Import every `.tcx` file of a directory into `store`.
    pub async fn directory<P: AsRef<Path>>(
        dir: P,
        options: ImportOptions,
        store: Arc<dyn TourStore>,
        identity: Arc<dyn TourIdentity>,
    ) -> Result<BatchImport> {
        BatchImport::from_dir(dir, options, store, identity).await
    }
}
