//! # Trace Streams
//!
//! Sequential reader and writer for the fixed-format trace records that flow
//! through pipes. A record is a 240-byte header followed by `ns` samples of
//! 4 bytes each, and `ns` lives inside the header itself:
//!
//! ```text
//! +--------------------+---------------------------+
//! | header (240 bytes) | samples (ns * 4 bytes)    |
//! +--------------------+---------------------------+
//!            ns read from header offset 114
//! ```
//!
//! [`SuReader`] owns a single buffer and lends each record out as a slice, so
//! a pipeline touches every byte once without per-record allocation. End of
//! input is only clean on a record boundary: a stream that ends inside a
//! header or payload is reported as an error, never silently dropped.

use std::io::{ErrorKind, Read, Write};

use crate::error::{Error, Result};
use crate::fields::FieldAccessor;
use crate::headers::{HeaderCatalog, HEADER_LEN, SAMPLE_LEN};

/// A source of trace records, one at a time.
///
/// The returned slice borrows the source's internal buffer and stays valid
/// until the next call. `Ok(None)` means the stream ended cleanly between
/// records.
pub trait TraceSource {
    fn next_trace(&mut self) -> Result<Option<&[u8]>>;
}

/// A destination for complete trace records.
pub trait TraceSink {
    fn put_trace(&mut self, trace: &[u8]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
}

/// Reads traces from any byte stream.
pub struct SuReader<R> {
    input: R,
    buf: Vec<u8>,
    ns: FieldAccessor,
}

impl<R: Read> SuReader<R> {
    pub fn new(input: R, catalog: &HeaderCatalog) -> Result<Self> {
        let ns = catalog.require("ns")?;
        Ok(Self {
            input,
            buf: Vec::new(),
            ns,
        })
    }

    pub fn into_inner(self) -> R {
        self.input
    }

    /// Fills `buf` as far as the stream allows, retrying on interruption.
    /// Returns how many bytes were read; less than `buf.len()` means the
    /// stream ended.
    fn read_full(&mut self, offset: usize) -> Result<usize> {
        let mut filled = 0;
        while filled < self.buf.len() - offset {
            match self.input.read(&mut self.buf[offset + filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::io("reading trace stream", e)),
            }
        }
        Ok(filled)
    }

    fn truncated(at: &str, got: usize, want: usize) -> Error {
        Error::io(
            "reading trace stream",
            std::io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("stream ended inside a trace {at} ({got} of {want} bytes)"),
            ),
        )
    }
}

impl<R: Read> TraceSource for SuReader<R> {
    fn next_trace(&mut self) -> Result<Option<&[u8]>> {
        self.buf.clear();
        self.buf.resize(HEADER_LEN, 0);
        let got = self.read_full(0)?;
        if got == 0 {
            return Ok(None);
        }
        if got < HEADER_LEN {
            return Err(Self::truncated("header", got, HEADER_LEN));
        }

        let ns = self.ns.read(&self.buf).as_int() as usize;
        let payload = ns * SAMPLE_LEN;
        self.buf.resize(HEADER_LEN + payload, 0);
        let got = self.read_full(HEADER_LEN)?;
        if got < payload {
            return Err(Self::truncated("payload", got, payload));
        }
        Ok(Some(&self.buf))
    }
}

/// Writes traces to any byte stream.
pub struct SuWriter<W> {
    output: W,
}

impl<W: Write> SuWriter<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }

    pub fn into_inner(self) -> W {
        self.output
    }
}

impl<W: Write> TraceSink for SuWriter<W> {
    fn put_trace(&mut self, trace: &[u8]) -> Result<()> {
        self.output
            .write_all(trace)
            .map_err(|e| Error::io("writing trace stream", e))
    }

    fn flush(&mut self) -> Result<()> {
        self.output
            .flush()
            .map_err(|e| Error::io("writing trace stream", e))
    }
}
