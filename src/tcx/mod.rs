//! TCX document loading and tokenizing.
//!
//! [`TcxReader`] holds one document in memory and drives any
//! [`EventSink`](crate::decode::EventSink) with its element and text events.

pub mod reader;

pub use reader::TcxReader;
