//! Streaming decode-and-repair of Training Center documents.
//!
//! ## Architecture
//!
//! ```text
//! tokenizer ──events──► TcxDecoder (EventSink)
//!                        ├─ ContextTracker   where are we, which grammar
//!                        ├─ LeafAccumulator  text of the open leaf
//!                        └─ TourAccumulator  laps, samples, pauses
//!                              └─ finalize_tour ──► Tour
//! ```
//!
//! The decoder never fails: malformed numbers become missing values, bad times are
//! logged and the previous time is reused, unknown documents simply yield no tours.
//! Problems worth telling a user about are collected as [`ImportMessage`]s in the
//! [`DecodeOutput`].
//!
//! [`ImportMessage`]: crate::types::ImportMessage

mod accumulator;
mod context;
mod decoder;
mod event;
mod finalize;
mod leaf;
mod pause;
mod sample_builder;
pub mod tags;
mod timestamp;

pub use accumulator::{LapAccumulator, TourAccumulator};
pub use context::{ContextTracker, DocumentState, Region, StartAction, TourKind};
pub use decoder::{DecodeOutput, TcxDecoder};
pub use event::{Attribute, EventSink, XmlEvent};
pub use finalize::{
    DISTANCE_RESET_THRESHOLD_M, FALLBACK_SLICE_MS, RepairReport, finalize_tour, repair_samples,
};
pub use leaf::{Extension, LeafAccumulator, LeafField};
pub use pause::{PauseInferencer, TRACK_GAP_THRESHOLD_MS};
pub use sample_builder::{SampleBuilder, parse_f32, parse_f64};
pub use timestamp::parse_timestamp;
