//! TCX document reader
//!
//! Loads a document into memory and tokenizes it with `quick-xml`, translating its
//! events into [`EventSink`] calls. Empty elements are expanded into a start/end
//! pair so sinks only ever see balanced elements.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use tcxtour::{ImportOptions, tcx::TcxReader};
//!
//! fn import() -> tcxtour::Result<()> {
//!     let reader = TcxReader::open("ride.tcx")?;
//!     let output = reader.decode(ImportOptions::default())?;
//!
//!     for tour in &output.tours {
//!         println!("{}: {} samples", tour.start_time, tour.samples.len());
//!     }
//!     for message in &output.messages {
//!         println!("{}", message);
//!     }
//!     Ok(())
//! }
//! ```

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::config::ImportOptions;
use crate::decode::{Attribute, DecodeOutput, EventSink, TcxDecoder};
use crate::{ImportError, Result};

/// One TCX document held in memory
#[derive(Debug, Clone)]
pub struct TcxReader {
    data: Vec<u8>,
    path: Option<PathBuf>,
}

impl TcxReader {
    /// Read a TCX file into memory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| ImportError::file_error(path.to_path_buf(), e))?;

        let mut data = Vec::new();
        file.read_to_end(&mut data).map_err(|e| ImportError::file_error(path.to_path_buf(), e))?;

        debug!(path = %path.display(), bytes = data.len(), "Loaded TCX file");
        Ok(Self::from_bytes_with_path(data, path.to_path_buf()))
    }

    /// Create a reader over in-memory bytes
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into(), path: None }
    }

    /// Create a reader over in-memory bytes labelled with the file they came from
    pub fn from_bytes_with_path(data: impl Into<Vec<u8>>, path: impl Into<PathBuf>) -> Self {
        Self { data: data.into(), path: Some(path.into()) }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Decode the whole document into tours.
    ///
    /// Only XML syntax and text-encoding problems are errors; everything the
    /// decoder can recover from is reported in [`DecodeOutput::messages`].
    pub fn decode(&self, options: ImportOptions) -> Result<DecodeOutput> {
        let mut decoder = TcxDecoder::new(options);
        if let Some(path) = &self.path {
            decoder = decoder.with_source(path.clone());
        }

        self.feed(&mut decoder)?;
        Ok(decoder.finish())
    }

    /// Tokenize the document into `sink`.
    pub fn feed<S: EventSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        let mut reader = Reader::from_reader(self.data.as_slice());
        reader.expand_empty_elements(true);

        let mut buf = Vec::new();
        let mut attributes = Vec::new();
        let mut events = 0usize;

        loop {
            let position = reader.buffer_position();
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| ImportError::xml_error(position, e.to_string()))?;

            match event {
                Event::Start(ref start) => {
                    let name = element_name(&reader, start)?;
                    collect_attributes(&reader, start, &mut attributes)?;
                    sink.start_element(&name, &attributes);
                }
                Event::End(ref end) => {
                    let qname = end.name();
                    let name = reader
                        .decoder()
                        .decode(qname.as_ref())
                        .map_err(|e| ImportError::encoding_error("element name", e.to_string()))?;
                    sink.end_element(&name);
                }
                Event::Text(ref text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| ImportError::xml_error(reader.buffer_position(), e.to_string()))?;
                    sink.characters(&text);
                }
                Event::CData(ref data) => {
                    let text = reader
                        .decoder()
                        .decode(data)
                        .map_err(|e| ImportError::encoding_error("CDATA section", e.to_string()))?;
                    sink.characters(&text);
                }
                Event::Eof => break,
                _ => {}
            }

            events += 1;
            buf.clear();
        }

        trace!(events, bytes = self.data.len(), "Document tokenized");
        Ok(())
    }
}

fn element_name(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<String> {
    reader
        .decoder()
        .decode(start.name().as_ref())
        .map(|name| name.into_owned())
        .map_err(|e| ImportError::encoding_error("element name", e.to_string()))
}

fn collect_attributes(
    reader: &Reader<&[u8]>,
    start: &BytesStart<'_>,
    out: &mut Vec<Attribute>,
) -> Result<()> {
    out.clear();
    for attribute in start.attributes() {
        let attribute = attribute
            .map_err(|e| ImportError::xml_error(reader.buffer_position(), e.to_string()))?;
        let name = reader
            .decoder()
            .decode(attribute.key.as_ref())
            .map_err(|e| ImportError::encoding_error("attribute name", e.to_string()))?;
        let value = attribute
            .unescape_value()
            .map_err(|e| ImportError::xml_error(reader.buffer_position(), e.to_string()))?;
        out.push(Attribute::new(name.into_owned(), value.into_owned()));
    }
    Ok(())
}
