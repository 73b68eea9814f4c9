//! JSON-lines row sink: one serialized [`Row`] per line.
//!
//! Writes go through a `BufWriter`; the buffer is flushed every
//! `flush_every` rows (0 disables periodic flushing) and on [`RowSink::flush`].
//!
//! JSON has no NaN or infinity. Non-finite floats are written as `null`;
//! reading a row back gives NaN for object and trigger fields and `None`
//! for `pileup_density`. The sign of an infinity is lost.

use crate::RowSink;
use evflat_core::{Row, SinkError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

pub struct JsonlSink<W: Write> {
    label: String,
    writer: BufWriter<W>,
    flush_every: usize,
    since_flush: usize,
    rows_written: u64,
}

impl JsonlSink<File> {
    /// Create (or truncate) the file at `path`, creating parent directories.
    pub fn create(path: &Path, flush_every: usize) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SinkError::Open {
                path: path.display().to_string(),
                reason: format!("failed to create output directory: {e}"),
            })?;
        }

        let file = File::create(path).map_err(|e| SinkError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        info!(path = %path.display(), "Writing rows");
        Ok(Self::from_writer(path.display().to_string(), file, flush_every))
    }
}

impl<W: Write> JsonlSink<W> {
    /// Wrap any writer (e.g. stdout).
    pub fn from_writer(label: impl Into<String>, writer: W, flush_every: usize) -> Self {
        Self {
            label: label.into(),
            writer: BufWriter::new(writer),
            flush_every,
            since_flush: 0,
            rows_written: 0,
        }
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|e| SinkError::Flush(e.error().to_string()))
    }
}

impl<W: Write> RowSink for JsonlSink<W> {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn write(&mut self, row: &Row) -> Result<(), SinkError> {
        let write_err = |reason: String| SinkError::Write {
            event: row.event,
            reason,
        };

        serde_json::to_writer(&mut self.writer, row).map_err(|e| write_err(e.to_string()))?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| write_err(e.to_string()))?;

        self.rows_written += 1;
        self.since_flush += 1;
        if self.flush_every > 0 && self.since_flush >= self.flush_every {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer
            .flush()
            .map_err(|e| SinkError::Flush(e.to_string()))?;
        debug!(sink = %self.label, rows = self.rows_written, "Sink flushed");
        self.since_flush = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evflat_core::{Capped, FilterColumn, TriggerColumn};

    fn row(event: u64) -> Row {
        Row {
            run: 316000,
            lumi: 4,
            event,
            pileup_density: Some(18.25),
            triggers: vec![TriggerColumn {
                name: "isomu24".into(),
                fired: true,
                prescale: 1.0,
            }],
            filters: vec![FilterColumn {
                name: "good_vertices".into(),
                passed: true,
            }],
            vertices: Capped::empty(),
            tracks: Capped::empty(),
            genjets: Capped::empty(),
        }
    }

    #[test]
    fn writes_one_row_per_line() {
        let mut sink = JsonlSink::from_writer("buffer", Vec::new(), 0);
        sink.write(&row(1)).unwrap();
        sink.write(&row(2)).unwrap();
        assert_eq!(sink.rows_written(), 2);

        let bytes = sink.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let rows: Vec<Row> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].event, 2);
        assert_eq!(rows[0].pileup_density, Some(18.25));
        assert!(rows[0].trigger("isomu24").unwrap().fired);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("rows.jsonl");
        let mut sink = JsonlSink::create(&path, 1).unwrap();
        sink.write(&row(7)).unwrap();

        // flush_every = 1, so the row is already on disk
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("\"event\":7"));
    }

    #[test]
    fn non_finite_values_read_back_as_nan() {
        let mut nan_row = row(3);
        nan_row.pileup_density = Some(f64::INFINITY);
        nan_row.triggers[0].prescale = f64::NAN;

        let mut sink = JsonlSink::from_writer("buffer", Vec::new(), 0);
        sink.write(&nan_row).unwrap();
        let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        assert!(text.contains(r#""prescale":null"#));

        let back: Row = serde_json::from_str(text.trim_end()).unwrap();
        assert!(back.triggers[0].prescale.is_nan());
        assert_eq!(back.pileup_density, None);
        assert_eq!(back.event, 3);
    }
}
