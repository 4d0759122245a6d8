//! Core types for decoded activity data.
//!
//! ## Architecture
//!
//! - [`Sample`] is one reconstructed instant; absent measurements are `None`
//! - [`PauseInterval`] is an inferred `[start, end)` idle range
//! - [`Tour`] is the immutable, repaired output of one activity or course
//! - [`SchemaVersion`] tags which of the two document grammars is in effect
//! - [`ImportMessage`] is one entry of the user-facing import log
//!
//! ## Usage Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use tcxtour::types::{PauseInterval, Sample};
//!
//! let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 8, 5, 0).unwrap();
//! let sample = Sample::at(t0);
//! assert!(sample.is_pause());
//!
//! let pause = PauseInterval::open(t0);
//! assert!(pause.contains(t0));
//! ```

mod message;
mod pause;
mod sample;
mod schema_version;
mod tour;

pub use message::{ImportMessage, MessageLevel};
pub use pause::PauseInterval;
pub use sample::{DEVICE_DEFAULT_EPOCH_MS, Sample, device_default_time, is_device_default_date};
pub use schema_version::{
    SchemaVersion, TRAINING_CENTER_DATABASE_V1, TRAINING_CENTER_DATABASE_V2,
};
pub use tour::{DeviceInfo, Tour};
