//! In-memory row sink. Rows are kept in insertion order.

use crate::RowSink;
use evflat_core::{Row, SinkError};

#[derive(Debug, Default)]
pub struct MemorySink {
    rows: Vec<Row>,
    flushes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of times `flush` was called.
    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl RowSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn write(&mut self, row: &Row) -> Result<(), SinkError> {
        self.rows.push(row.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.flushes += 1;
        Ok(())
    }
}
