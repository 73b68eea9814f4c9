//! Row persistence for evflat.
//!
//! The producer hands every finished [`Row`] to a [`RowSink`]. Two
//! backends are provided:
//! - [`JsonlSink`]: one JSON object per line, buffered (default)
//! - [`MemorySink`]: rows kept in a `Vec`, for tests and embedding

mod jsonl;
mod memory;

pub use jsonl::JsonlSink;
pub use memory::MemorySink;

use evflat_core::{Row, SinkError};

/// Destination for assembled rows.
pub trait RowSink {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Persist one row.
    fn write(&mut self, row: &Row) -> Result<(), SinkError>;

    /// Push buffered rows to durable storage.
    fn flush(&mut self) -> Result<(), SinkError>;
}

impl<S: RowSink + ?Sized> RowSink for &mut S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn write(&mut self, row: &Row) -> Result<(), SinkError> {
        (**self).write(row)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }
}

impl<S: RowSink + ?Sized> RowSink for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn write(&mut self, row: &Row) -> Result<(), SinkError> {
        (**self).write(row)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }
}
